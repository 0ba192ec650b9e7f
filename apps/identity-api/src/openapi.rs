//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Identity API",
        version = "0.1.0",
        description = "User registration, lookup and role-gated listing behind HTTP Basic auth",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/authentication", api = domain_users::ApiDoc)
    ),
    tags(
        (name = "Users", description = "User registration and lookup (HTTP Basic auth)")
    )
)]
pub struct ApiDoc;
