//! Operation definitions
//!
//! A definition describes one operation the builder offers: its parameters,
//! defaults, placement category and the behaviour attached to it. Behaviour
//! lives on the definition itself, so rendering and placement never switch
//! on operation ids.

use std::fmt;
use std::sync::Arc;

use crate::modeller::QueryModeller;
use crate::placement::default_add_operation_handler;
use crate::types::{
    DEFAULT_ORDER_RANK, Operation, OperationCategory, OperationParamDef, ParamValue, VisualQuery,
};

/// Turns an instance plus the already rendered inner expression into the next fragment
pub type RenderFn = Arc<dyn Fn(&Operation, &OperationDef, &str) -> String + Send + Sync>;

/// Runs after a parameter edit and may rewrite the instance id
pub type ParamChangedFn = Arc<dyn Fn(usize, &Operation, &OperationDef) -> Operation + Send + Sync>;

/// Describes an instance in prose
pub type ExplainFn = Arc<dyn Fn(&Operation, &OperationDef) -> String + Send + Sync>;

/// Places a fresh instance of the definition into a query
pub type AddOperationFn =
    Arc<dyn Fn(&OperationDef, &VisualQuery, &dyn QueryModeller) -> VisualQuery + Send + Sync>;

#[derive(Clone)]
pub struct OperationDef {
    /// Language-level function or stage name, unique within a registry
    pub id: String,
    /// Display name
    pub name: String,
    pub params: Vec<OperationParamDef>,
    /// Values a freshly added instance starts with
    pub default_params: Vec<ParamValue>,
    pub category: OperationCategory,
    pub order_rank: Option<i32>,
    /// Groups interchangeable variants of the same concept
    pub alternatives_key: Option<String>,
    /// Variants reached only through handler rewrites
    pub hide_from_list: bool,
    pub renderer: RenderFn,
    pub param_changed_handler: Option<ParamChangedFn>,
    pub explain_handler: Option<ExplainFn>,
    pub add_operation_handler: AddOperationFn,
}

impl OperationDef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: OperationCategory,
        renderer: RenderFn,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            params: Vec::new(),
            default_params: Vec::new(),
            category,
            order_rank: None,
            alternatives_key: None,
            hide_from_list: false,
            renderer,
            param_changed_handler: None,
            explain_handler: None,
            add_operation_handler: Arc::new(default_add_operation_handler),
        }
    }

    pub fn with_params(mut self, params: Vec<OperationParamDef>) -> Self {
        self.params = params;
        self
    }

    pub fn with_default_params(mut self, default_params: Vec<ParamValue>) -> Self {
        self.default_params = default_params;
        self
    }

    pub fn with_order_rank(mut self, rank: i32) -> Self {
        self.order_rank = Some(rank);
        self
    }

    pub fn with_alternatives_key(mut self, key: &str) -> Self {
        self.alternatives_key = Some(key.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide_from_list = true;
        self
    }

    pub fn with_renderer(mut self, renderer: RenderFn) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_param_changed_handler(mut self, handler: ParamChangedFn) -> Self {
        self.param_changed_handler = Some(handler);
        self
    }

    pub fn with_explain_handler(mut self, handler: ExplainFn) -> Self {
        self.explain_handler = Some(handler);
        self
    }

    pub fn with_add_operation_handler(mut self, handler: AddOperationFn) -> Self {
        self.add_operation_handler = handler;
        self
    }

    /// Order rank with the default applied
    pub fn rank(&self) -> i32 {
        self.order_rank.unwrap_or(DEFAULT_ORDER_RANK)
    }

    /// Position of the first rest parameter, if any
    pub fn rest_param_index(&self) -> Option<usize> {
        self.params.iter().position(|param| param.rest_param)
    }

    /// A fresh instance carrying the default parameters
    pub fn new_operation(&self) -> Operation {
        Operation::new(self.id.clone(), self.default_params.clone())
    }

    pub fn render(&self, operation: &Operation, inner_expr: &str) -> String {
        (self.renderer)(operation, self, inner_expr)
    }

    /// Run the param-changed handler; instances without one come back unchanged
    pub fn on_param_changed(&self, index: usize, operation: &Operation) -> Operation {
        match &self.param_changed_handler {
            Some(handler) => handler(index, operation, self),
            None => operation.clone(),
        }
    }

    pub fn explain(&self, operation: &Operation) -> Option<String> {
        self.explain_handler
            .as_ref()
            .map(|handler| handler(operation, self))
    }

    pub fn add_to(&self, query: &VisualQuery, modeller: &dyn QueryModeller) -> VisualQuery {
        (self.add_operation_handler)(self, query, modeller)
    }
}

impl fmt::Debug for OperationDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("default_params", &self.default_params)
            .field("category", &self.category)
            .field("order_rank", &self.order_rank)
            .field("alternatives_key", &self.alternatives_key)
            .field("hide_from_list", &self.hide_from_list)
            .field("param_changed_handler", &self.param_changed_handler.is_some())
            .field("explain_handler", &self.explain_handler.is_some())
            .finish_non_exhaustive()
    }
}

/// Fields a factory caller can replace on every definition it produces
#[derive(Clone, Default)]
pub struct OperationDefOverrides {
    pub category: Option<OperationCategory>,
    pub order_rank: Option<i32>,
    pub renderer: Option<RenderFn>,
    pub param_changed_handler: Option<ParamChangedFn>,
    pub explain_handler: Option<ExplainFn>,
    pub add_operation_handler: Option<AddOperationFn>,
}

impl OperationDefOverrides {
    pub fn apply(&self, mut def: OperationDef) -> OperationDef {
        if let Some(category) = self.category {
            def.category = category;
        }
        if let Some(rank) = self.order_rank {
            def.order_rank = Some(rank);
        }
        if let Some(renderer) = &self.renderer {
            def.renderer = renderer.clone();
        }
        if let Some(handler) = &self.param_changed_handler {
            def.param_changed_handler = Some(handler.clone());
        }
        if let Some(handler) = &self.explain_handler {
            def.explain_handler = Some(handler.clone());
        }
        if let Some(handler) = &self.add_operation_handler {
            def.add_operation_handler = handler.clone();
        }
        def
    }
}
