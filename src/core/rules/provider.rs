//! Authentication provider seam
//!
//! The matcher never looks identity up itself; callers hand it something that
//! can produce the [`AuthContext`] for the current request.

use super::guard::AuthContext;

/// Supplies the caller identity for a request
pub trait AuthProvider {
    fn auth_context(&self) -> AuthContext;
}

impl AuthProvider for AuthContext {
    fn auth_context(&self) -> AuthContext {
        self.clone()
    }
}

impl<F> AuthProvider for F
where
    F: Fn() -> AuthContext,
{
    fn auth_context(&self) -> AuthContext {
        self()
    }
}
