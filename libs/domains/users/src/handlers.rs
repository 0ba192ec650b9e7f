use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

use crate::access::{AccessContext, Operation};
use crate::auth::basic_auth_middleware;
use crate::error::UserResult;
use crate::models::{UserInput, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the authentication API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, register, get_user),
    components(
        schemas(UserInput, UserResponse),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    modifiers(&BasicAuthScheme),
    tags(
        (name = "Users", description = "User registration and lookup (HTTP Basic auth)")
    )
)]
pub struct ApiDoc;

struct BasicAuthScheme;

impl Modify for BasicAuthScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "basic_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
    }
}

/// Routes for the user directory, each behind Basic authentication.
///
/// Every handler authorizes its [`Operation`] before reading a body or calling
/// the service.
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/users", get(list_users))
        .route("/users/{username}", get(get_user))
        .route("/register", post(register))
        .route_layer(middleware::from_fn_with_state(
            shared_service.clone(),
            basic_auth_middleware::<R>,
        ))
        .with_state(shared_service)
}

/// List every user (ADMIN only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 204, description = "No users stored"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    access: AccessContext,
) -> UserResult<Response> {
    access.authorize(Operation::ListUsers)?;

    let users = service.find_all().await?;
    if users.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(body).into_response())
}

/// Register a new user (ADMIN or USER; only ADMIN may grant ADMIN)
#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    security(("basic_auth" = [])),
    request_body = UserInput,
    responses(
        (status = 200, description = "User registered", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    access: AccessContext,
    payload: Result<ValidatedJson<UserInput>, Response>,
) -> Result<Json<UserResponse>, Response> {
    let principal = access
        .authorize(Operation::Register)
        .map_err(IntoResponse::into_response)?;
    let ValidatedJson(input) = payload?;
    let user = service
        .register(principal, input)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(user))
}

/// Look up one user by username (ADMIN or USER)
#[utoipa::path(
    get,
    path = "/users/{username}",
    tag = "Users",
    security(("basic_auth" = [])),
    params(
        ("username" = String, Path, description = "Exact, case-sensitive username")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 204, description = "No such user"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    access: AccessContext,
    Path(username): Path<String>,
) -> UserResult<Response> {
    access.authorize(Operation::LookupUser)?;

    match service.find_one(&username).await? {
        Some(record) => Ok(Json(UserResponse::from(record)).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
