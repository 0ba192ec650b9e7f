//! Users Domain
//!
//! Credential storage, registration and role-gated access for the identity service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, Basic auth middleware
//! └──────┬──────┘
//!        │  AccessContext::authorize(Operation)
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, duplicate check, Argon2 hashing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Upsert keyed by username (in-memory or MongoDB)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← UserRecord, UserInput, RoleSet
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//!
//! let service = UserService::new(InMemoryUserRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod access;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod password;
pub mod repository;
pub mod service;

pub use access::{AccessContext, Operation, Principal};
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{Role, RoleParseError, RoleSet, UserInput, UserRecord, UserResponse};
pub use mongodb::MongoUserRepository;
pub use password::{Argon2Hasher, PasswordHashConfig};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
