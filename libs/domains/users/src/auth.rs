use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_helpers::BasicCredentials;
use std::sync::Arc;

use crate::error::UserError;
use crate::repository::UserRepository;
use crate::service::UserService;

/// HTTP Basic authentication middleware.
///
/// - no `Authorization` header, or a non-Basic scheme: the request continues
///   anonymously and gated handlers answer 401
/// - a malformed Basic header or credentials that don't match: 401 here
/// - a match: the resolved [`Principal`](crate::access::Principal) is inserted
///   into the request extensions for [`AccessContext`](crate::access::AccessContext)
///
/// ```ignore
/// let service = Arc::new(UserService::new(InMemoryUserRepository::new()));
/// let routes = Router::new()
///     .route("/users", get(list_users))
///     .route_layer(axum::middleware::from_fn_with_state(
///         service.clone(),
///         basic_auth_middleware::<InMemoryUserRepository>,
///     ));
/// ```
pub async fn basic_auth_middleware<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let credentials = match BasicCredentials::from_headers(request.headers()) {
        Ok(Some(credentials)) => credentials,
        Ok(None) => return next.run(request).await,
        Err(e) => {
            tracing::debug!("Rejected Authorization header: {}", e);
            return UserError::InvalidCredentials.into_response();
        }
    };

    match service
        .authenticate(&credentials.username, &credentials.password)
        .await
    {
        Ok(principal) => {
            tracing::debug!(username = %principal.username, "Authenticated");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
