//! Collection-level access rules.
//!
//! A rule decides whether the identity on a request may perform an operation
//! and can narrow what it sees by returning a constraint filter:
//!
//! ```ignore
//! let own_versions = access::rule(|args: AccessArgs| async move {
//!     Ok(match args.ctx.identity() {
//!         Some(user) if user.has_role("admin") => AccessResult::Allowed,
//!         Some(user) => AccessResult::AllowedWithFilter(Where::field(
//!             "version.owner",
//!             Operator::Equals,
//!             user.sub(),
//!         )),
//!         None => AccessResult::Denied,
//!     })
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use vellum_core::RequestContext;
use vellum_data::Where;

use crate::error::OperationError;

/// Outcome of an access rule.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessResult {
    Denied,
    Allowed,
    /// Allowed, restricted to documents matching the filter.
    AllowedWithFilter(Where),
}

impl From<bool> for AccessResult {
    fn from(allowed: bool) -> Self {
        if allowed {
            AccessResult::Allowed
        } else {
            AccessResult::Denied
        }
    }
}

/// Input of an access rule.
#[derive(Debug, Clone)]
pub struct AccessArgs {
    pub ctx: RequestContext,
    /// When set, a denial resolves to an empty result instead of an error.
    pub disable_errors: bool,
}

/// An access rule attached to a collection capability.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an access rule",
    label = "this type cannot be used as an access rule",
    note = "use an async closure `|args: AccessArgs| async move {{ Ok(AccessResult::Allowed) }}` or implement `Access`"
)]
pub trait Access: Send + Sync + 'static {
    fn check(&self, args: AccessArgs) -> BoxFuture<'static, Result<AccessResult, OperationError>>;
}

impl<F, Fut> Access for F
where
    F: Fn(AccessArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<AccessResult, OperationError>> + Send + 'static,
{
    fn check(&self, args: AccessArgs) -> BoxFuture<'static, Result<AccessResult, OperationError>> {
        Box::pin(self(args))
    }
}

pub type AccessRule = Arc<dyn Access>;

/// Box an async closure as an [`AccessRule`].
pub fn rule<F, Fut>(f: F) -> AccessRule
where
    F: Fn(AccessArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<AccessResult, OperationError>> + Send + 'static,
{
    Arc::new(f)
}

/// Rule that allows everyone, authenticated or not.
pub fn public() -> AccessRule {
    rule(|_| async { Ok(AccessResult::Allowed) })
}

/// Evaluate `rule`, or the default rule (an identity must be present) when
/// the capability has none configured.
///
/// A denial is an error unless `args.disable_errors` is set, in which case
/// [`AccessResult::Denied`] is returned for the caller to short-circuit on.
pub async fn execute_access(
    rule: Option<&AccessRule>,
    args: AccessArgs,
) -> Result<AccessResult, OperationError> {
    let disable_errors = args.disable_errors;
    let result = match rule {
        Some(rule) => rule.check(args).await?,
        None => AccessResult::from(args.ctx.is_authenticated()),
    };

    if result == AccessResult::Denied && !disable_errors {
        return Err(OperationError::forbidden());
    }
    Ok(result)
}
