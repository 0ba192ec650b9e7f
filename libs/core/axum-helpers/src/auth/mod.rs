//! Authentication helpers.
//!
//! Only credential *transport* lives here: pulling a username/password pair out
//! of an `Authorization: Basic` header. Checking the pair against stored
//! credentials, and deciding what the caller may do, is the domain's job.

pub mod basic;

pub use basic::{BasicAuthError, BasicCredentials};
