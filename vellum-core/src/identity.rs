/// Trait representing an authenticated actor (user, API key, service account).
///
/// Access rules inspect the identity carried by the [`RequestContext`](crate::RequestContext)
/// to decide whether an operation may proceed. The default access rule only
/// checks that an identity is present.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Identity`",
    label = "this type cannot be attached to a request context",
    note = "implement `Identity` for your user type before calling `RequestContext::with_identity`"
)]
pub trait Identity: Send + Sync + 'static {
    /// Unique subject identifier.
    fn sub(&self) -> &str;

    /// Roles associated with this identity.
    fn roles(&self) -> &[String] {
        &[]
    }

    /// Email associated with this identity, if available.
    fn email(&self) -> Option<&str> {
        None
    }

    /// Slug of the auth-enabled collection this identity belongs to, if any.
    fn collection(&self) -> Option<&str> {
        None
    }

    /// Convenience check used by role-based access rules.
    fn has_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| r == role)
    }
}

/// Sentinel identity with an empty subject and no roles.
///
/// Useful for system tasks that must run with an identity attached but
/// carry no user-specific permissions.
pub struct NoIdentity;

impl Identity for NoIdentity {
    fn sub(&self) -> &str {
        ""
    }
}
