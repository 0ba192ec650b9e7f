use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Coarse authorization label. Declaration order is the canonical order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleParseError {
    #[error("Unknown role: {0}")]
    Unknown(String),
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| RoleParseError::Unknown(trimmed.to_string()))
    }
}

/// Set of roles held by a user.
///
/// Persisted and serialized as its canonical string: upper-case names joined
/// by `,` in [`Role`] order, e.g. `ADMIN,USER`. Parsing accepts any case,
/// surrounding whitespace and empty segments, and rejects unknown names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// True when at least one of `roles` is in the set.
    pub fn intersects(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.0.contains(role))
    }

    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        Self(BTreeSet::from([role]))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, role) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(role.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for RoleSet {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(Role::from_str)
            .collect()
    }
}

impl TryFrom<String> for RoleSet {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoleSet> for String {
    fn from(roles: RoleSet) -> Self {
        roles.to_string()
    }
}

/// Stored user entity. `username` is the MongoDB `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub username: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub display_name: String,
    pub roles: RoleSet,
    pub last_updated_time: DateTime<Utc>,
}

impl UserRecord {
    /// Builds a record stamped with the current time; an empty role set becomes `USER`.
    pub fn new(
        username: String,
        password_hash: String,
        display_name: String,
        roles: RoleSet,
    ) -> Self {
        Self {
            username,
            password_hash,
            display_name,
            roles: if roles.is_empty() { Role::User.into() } else { roles },
            last_updated_time: Utc::now(),
        }
    }
}

/// Registration payload.
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct UserInput {
    #[validate(length(min = 1, max = 64), custom(function = "validate_username"))]
    #[schema(example = "bob")]
    pub username: String,

    #[validate(length(min = 1, max = 128))]
    #[schema(example = "correct horse battery staple", format = Password)]
    pub password: String,

    #[serde(default, alias = "name")]
    #[validate(length(max = 100))]
    #[schema(example = "Bob")]
    pub display_name: String,

    /// Comma-separated roles; defaults to `USER`
    #[serde(default)]
    #[validate(custom(function = "validate_roles"))]
    #[schema(example = "USER")]
    pub roles: Option<String>,
}

impl fmt::Debug for UserInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInput")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("display_name", &self.display_name)
            .field("roles", &self.roles)
            .finish()
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().any(|c| c.is_whitespace() || c == ':') {
        let mut err = ValidationError::new("username_charset");
        err.message = Some("username must not contain whitespace or ':'".into());
        return Err(err);
    }
    Ok(())
}

fn validate_roles(roles: &str) -> Result<(), ValidationError> {
    roles.parse::<RoleSet>().map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("unknown_role");
        err.message = Some(e.to_string().into());
        err
    })
}

/// User view returned by the API. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub username: String,
    pub display_name: String,
    /// Canonical role string
    #[schema(example = "ADMIN,USER")]
    pub roles: String,
    pub last_updated_time: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        Self {
            username: record.username,
            display_name: record.display_name,
            roles: record.roles.canonical(),
            last_updated_time: record.last_updated_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(username: &str, password: &str) -> UserInput {
        UserInput {
            username: username.to_string(),
            password: password.to_string(),
            display_name: String::new(),
            roles: None,
        }
    }

    #[test]
    fn test_role_set_canonical_order() {
        let roles: RoleSet = "user, admin".parse().unwrap();
        assert_eq!(roles.to_string(), "ADMIN,USER");
        assert!(roles.contains(Role::Admin));
        assert!(roles.contains(Role::User));
    }

    #[test]
    fn test_role_set_parsing_is_lenient_about_format() {
        let roles: RoleSet = " ,USER,,user , ".parse().unwrap();
        assert_eq!(roles, RoleSet::from(Role::User));
        assert!("".parse::<RoleSet>().unwrap().is_empty());
    }

    #[test]
    fn test_role_set_rejects_unknown_names() {
        let err = "ADMIN,SUPERUSER".parse::<RoleSet>().unwrap_err();
        assert_eq!(err, RoleParseError::Unknown("SUPERUSER".to_string()));
    }

    #[test]
    fn test_role_set_serializes_as_string() {
        let roles: RoleSet = [Role::User, Role::Admin].into_iter().collect();
        assert_eq!(serde_json::to_value(&roles).unwrap(), "ADMIN,USER");

        let back: RoleSet = serde_json::from_value(serde_json::json!("admin")).unwrap();
        assert_eq!(back, RoleSet::from(Role::Admin));

        assert!(serde_json::from_value::<RoleSet>(serde_json::json!("ROOT")).is_err());
    }

    #[test]
    fn test_intersects() {
        let roles = RoleSet::from(Role::User);
        assert!(roles.intersects(&[Role::Admin, Role::User]));
        assert!(!roles.intersects(&[Role::Admin]));
        assert!(!RoleSet::empty().intersects(&Role::ALL));
    }

    #[test]
    fn test_record_defaults_to_user_role() {
        let record = UserRecord::new(
            "bob".into(),
            "$argon2id$...".into(),
            "Bob".into(),
            RoleSet::empty(),
        );
        assert_eq!(record.roles.canonical(), "USER");
    }

    #[test]
    fn test_record_stores_username_as_id() {
        let record = UserRecord::new("bob".into(), "h".into(), "Bob".into(), Role::Admin.into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["_id"], "bob");
        assert_eq!(json["roles"], "ADMIN");
        assert!(json.get("username").is_none());
    }

    #[test]
    fn test_response_omits_hash() {
        let record = UserRecord::new("bob".into(), "secret-hash".into(), "Bob".into(), RoleSet::empty());
        let json = serde_json::to_string(&UserResponse::from(record)).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"roles\":\"USER\""));
    }

    #[test]
    fn test_input_validation() {
        assert!(input("bob", "pw1").validate().is_ok());
        assert!(input("", "pw1").validate().is_err());
        assert!(input("bob", "").validate().is_err());
        assert!(input("bob smith", "pw1").validate().is_err());
        assert!(input("bob:admin", "pw1").validate().is_err());
        assert!(input(&"a".repeat(65), "pw1").validate().is_err());
        assert!(input("bob", &"p".repeat(129)).validate().is_err());

        let mut long_name = input("bob", "pw1");
        long_name.display_name = "n".repeat(101);
        assert!(long_name.validate().is_err());

        let mut bad_roles = input("bob", "pw1");
        bad_roles.roles = Some("USER,ROOT".to_string());
        let errors = bad_roles.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("roles"));
    }

    #[test]
    fn test_input_accepts_name_alias() {
        let parsed: UserInput = serde_json::from_value(serde_json::json!({
            "username": "bob",
            "password": "pw1",
            "name": "Bob",
            "roles": "USER"
        }))
        .unwrap();
        assert_eq!(parsed.display_name, "Bob");
        assert_eq!(parsed.roles.as_deref(), Some("USER"));
    }

    #[test]
    fn test_input_debug_redacts_password() {
        let debug = format!("{:?}", input("bob", "pw1"));
        assert!(!debug.contains("pw1"));
    }
}
