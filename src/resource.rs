//! Resources and the operations they register.
//!
//! A resource groups related operations. Operations describe their own
//! parameters, so discovery never has to guess at a signature:
//!
//! ```ignore
//! #[resource]
//! impl Chats {
//!     /// Get the chat list of the current user.
//!     pub async fn get_chat_list(&self, #[default(1)] page: i64) -> Result<Vec<ChatTitleIdResponse>, ClientError> {
//!         // ...
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use thiserror::Error;

use crate::types::TypeDescriptor;
use crate::value::{Arguments, InvocationError, TypedValue};

/// Raised while introspecting a single operation.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot resolve type `{annotation}` of parameter `{parameter}`")]
    UnresolvedAnnotation { parameter: String, annotation: String },

    #[error("{0}")]
    Introspection(String),
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// `None` when the parameter carries no type annotation.
    pub ty: Option<TypeDescriptor>,
    pub has_default: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            has_default: false,
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            has_default: false,
        }
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// An invocable, asynchronously-completing unit of work.
#[async_trait]
pub trait Operation: Send + Sync {
    fn name(&self) -> &str;

    fn doc(&self) -> Option<String> {
        None
    }

    /// Declared parameters, excluding the receiver.
    fn parameters(&self) -> Result<Vec<Parameter>, DiscoveryError>;

    fn returns(&self) -> TypeDescriptor {
        TypeDescriptor::Unknown
    }

    async fn call(&self, args: Arguments) -> Result<TypedValue, InvocationError>;
}

/// A named grouping of related operations.
pub trait Resource: Send + Sync {
    fn operations(self: Arc<Self>) -> Vec<Arc<dyn Operation>>;
}

/// An object exposing named resources.
pub trait ResourceGraph {
    fn resources(&self) -> Vec<(String, Arc<dyn Resource>)>;
}

/// Operation backed by an async closure.
pub struct FnOperation<F> {
    name: String,
    doc: Option<String>,
    parameters: Vec<Parameter>,
    returns: TypeDescriptor,
    handler: F,
}

impl<F, Fut> FnOperation<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = Result<TypedValue, InvocationError>> + Send,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            doc: None,
            parameters: Vec::new(),
            returns: TypeDescriptor::Unknown,
            handler,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_returns(mut self, returns: TypeDescriptor) -> Self {
        self.returns = returns;
        self
    }
}

#[async_trait]
impl<F, Fut> Operation for FnOperation<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = Result<TypedValue, InvocationError>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> Option<String> {
        self.doc.clone()
    }

    fn parameters(&self) -> Result<Vec<Parameter>, DiscoveryError> {
        Ok(self.parameters.clone())
    }

    fn returns(&self) -> TypeDescriptor {
        self.returns.clone()
    }

    async fn call(&self, args: Arguments) -> Result<TypedValue, InvocationError> {
        (self.handler)(args).await
    }
}

/// A resource assembled from a list of operations.
#[derive(Default, Clone)]
pub struct OperationSet {
    operations: Vec<Arc<dyn Operation>>,
}

impl OperationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation(mut self, operation: impl Operation + 'static) -> Self {
        self.operations.push(Arc::new(operation));
        self
    }
}

impl Resource for OperationSet {
    fn operations(self: Arc<Self>) -> Vec<Arc<dyn Operation>> {
        self.operations.clone()
    }
}

/// A resource graph assembled by name.
#[derive(Default, Clone)]
pub struct Resources {
    resources: IndexMap<String, Arc<dyn Resource>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(mut self, name: impl Into<String>, resource: impl Resource + 'static) -> Self {
        self.resources.insert(name.into(), Arc::new(resource));
        self
    }
}

impl ResourceGraph for Resources {
    fn resources(&self) -> Vec<(String, Arc<dyn Resource>)> {
        self.resources
            .iter()
            .map(|(name, resource)| (name.clone(), Arc::clone(resource)))
            .collect()
    }
}
