//! Per-request caller identity and role gating.
//!
//! The authentication middleware stores a [`Principal`] in the request
//! extensions after a successful credential check. Handlers take an
//! [`AccessContext`] extractor and call [`AccessContext::authorize`] before
//! touching the service. Nothing here is global: a request without a
//! principal is anonymous, and anonymous callers are denied every gated
//! operation.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::error::{UserError, UserResult};
use crate::models::{Role, RoleSet};

/// Authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: RoleSet,
}

impl Principal {
    pub fn new(username: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            username: username.into(),
            roles,
        }
    }

    /// Whether this principal may create an account holding `requested`.
    ///
    /// ADMIN may grant any role; anyone else may only grant USER.
    pub fn may_grant(&self, requested: &RoleSet) -> bool {
        self.roles.contains(Role::Admin) || requested.iter().all(|role| role == Role::User)
    }
}

/// Role-gated operations exposed by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListUsers,
    Register,
    LookupUser,
}

impl Operation {
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Operation::ListUsers => &[Role::Admin],
            Operation::Register | Operation::LookupUser => &[Role::Admin, Role::User],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessContext {
    principal: Option<Principal>,
}

impl AccessContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn current_principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// True iff a principal is present and holds at least one of `allowed`.
    pub fn require_role(principal: Option<&Principal>, allowed: &[Role]) -> bool {
        principal.is_some_and(|p| p.roles.intersects(allowed))
    }

    /// Fails closed: no principal is [`UserError::Unauthenticated`], a principal
    /// without an allowed role is [`UserError::Forbidden`].
    pub fn authorize(&self, operation: Operation) -> UserResult<&Principal> {
        let principal = self.current_principal().ok_or(UserError::Unauthenticated)?;

        if !Self::require_role(Some(principal), operation.allowed_roles()) {
            tracing::info!(
                username = %principal.username,
                roles = %principal.roles,
                ?operation,
                "Access denied"
            );
            return Err(UserError::Forbidden);
        }

        Ok(principal)
    }
}

impl<S> FromRequestParts<S> for AccessContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            principal: parts.extensions.get::<Principal>().cloned(),
        })
    }
}
