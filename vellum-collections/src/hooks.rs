//! Collection operation hooks.
//!
//! Hooks run sequentially in registration order. A hook returning `Some`
//! replaces the running value for every later hook and for the operation
//! itself; `None` keeps it. An error stops the chain immediately.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use vellum_data::TotalDocs;

use crate::error::OperationError;
use crate::operations::CountArgs;

/// Operation a hook is running for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Count,
    CountVersions,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Count => "count",
            Operation::CountVersions => "countVersions",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct BeforeOperationArgs {
    pub operation: Operation,
    pub args: CountArgs,
}

#[derive(Debug, Clone)]
pub struct AfterOperationArgs {
    pub operation: Operation,
    pub args: CountArgs,
    pub result: TotalDocs,
}

#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a before-operation hook",
    label = "this type cannot be registered as a before-operation hook",
    note = "use an async closure `|args: BeforeOperationArgs| async move {{ Ok(None) }}` or implement `BeforeOperation`"
)]
pub trait BeforeOperation: Send + Sync + 'static {
    fn call(
        &self,
        args: BeforeOperationArgs,
    ) -> BoxFuture<'static, Result<Option<CountArgs>, OperationError>>;
}

impl<F, Fut> BeforeOperation for F
where
    F: Fn(BeforeOperationArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<CountArgs>, OperationError>> + Send + 'static,
{
    fn call(
        &self,
        args: BeforeOperationArgs,
    ) -> BoxFuture<'static, Result<Option<CountArgs>, OperationError>> {
        Box::pin(self(args))
    }
}

#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an after-operation hook",
    label = "this type cannot be registered as an after-operation hook",
    note = "use an async closure `|args: AfterOperationArgs| async move {{ Ok(None) }}` or implement `AfterOperation`"
)]
pub trait AfterOperation: Send + Sync + 'static {
    fn call(
        &self,
        args: AfterOperationArgs,
    ) -> BoxFuture<'static, Result<Option<TotalDocs>, OperationError>>;
}

impl<F, Fut> AfterOperation for F
where
    F: Fn(AfterOperationArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<TotalDocs>, OperationError>> + Send + 'static,
{
    fn call(
        &self,
        args: AfterOperationArgs,
    ) -> BoxFuture<'static, Result<Option<TotalDocs>, OperationError>> {
        Box::pin(self(args))
    }
}

pub type BeforeOperationHook = Arc<dyn BeforeOperation>;
pub type AfterOperationHook = Arc<dyn AfterOperation>;

/// Box an async closure as a [`BeforeOperationHook`].
pub fn before_operation<F, Fut>(f: F) -> BeforeOperationHook
where
    F: Fn(BeforeOperationArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<CountArgs>, OperationError>> + Send + 'static,
{
    Arc::new(f)
}

/// Box an async closure as an [`AfterOperationHook`].
pub fn after_operation<F, Fut>(f: F) -> AfterOperationHook
where
    F: Fn(AfterOperationArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<TotalDocs>, OperationError>> + Send + 'static,
{
    Arc::new(f)
}

/// Hooks registered on a collection.
#[derive(Clone, Default)]
pub struct CollectionHooks {
    pub before_operation: Vec<BeforeOperationHook>,
    pub after_operation: Vec<AfterOperationHook>,
}

impl fmt::Debug for CollectionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionHooks")
            .field("before_operation", &self.before_operation.len())
            .field("after_operation", &self.after_operation.len())
            .finish()
    }
}

/// Run the before-operation chain, replacing `args` in place.
///
/// On error `args` holds the last replacement made before the failing hook.
pub(crate) async fn run_before_operation(
    hooks: &[BeforeOperationHook],
    operation: Operation,
    args: &mut CountArgs,
) -> Result<(), OperationError> {
    for hook in hooks {
        let input = BeforeOperationArgs {
            operation,
            args: args.clone(),
        };
        if let Some(replacement) = hook.call(input).await? {
            *args = replacement;
        }
    }
    Ok(())
}

/// Run the after-operation chain, returning the final result.
pub(crate) async fn run_after_operation(
    hooks: &[AfterOperationHook],
    operation: Operation,
    args: &CountArgs,
    mut result: TotalDocs,
) -> Result<TotalDocs, OperationError> {
    for hook in hooks {
        let input = AfterOperationArgs {
            operation,
            args: args.clone(),
            result,
        };
        if let Some(replacement) = hook.call(input).await? {
            result = replacement;
        }
    }
    Ok(result)
}
