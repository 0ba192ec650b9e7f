use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::instrument;
use validator::Validate;

use crate::access::Principal;
use crate::error::{UserError, UserResult};
use crate::models::{Role, RoleSet, UserInput, UserRecord, UserResponse};
use crate::password::Argon2Hasher;
use crate::repository::UserRepository;

/// Password hashed once per service and checked on unknown-username logins.
const DUMMY_PASSWORD: &str = "unknown-user-placeholder";

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    hasher: Argon2Hasher,
    dummy_hash: Arc<OnceCell<String>>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_hasher(repository, Argon2Hasher::default())
    }

    pub fn with_hasher(repository: R, hasher: Argon2Hasher) -> Self {
        Self {
            repository: Arc::new(repository),
            hasher,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Create a user from `input` on behalf of `registered_by`, rejecting any
    /// username that already exists.
    ///
    /// Only an ADMIN may hand out roles other than USER.
    ///
    /// The existence check and the write are two store calls. Two concurrent
    /// registrations of the same new username can both pass the check, in
    /// which case the later write replaces the earlier one.
    #[instrument(skip(self, registered_by, input), fields(username = %input.username, registered_by = %registered_by.username))]
    pub async fn register(
        &self,
        registered_by: &Principal,
        input: UserInput,
    ) -> UserResult<UserResponse> {
        input.validate()?;
        let roles = match input.roles.as_deref() {
            Some(raw) => raw.parse::<RoleSet>()?,
            None => RoleSet::empty(),
        };

        if !registered_by.may_grant(&roles) {
            tracing::warn!(requested = %roles, "Role grant denied");
            return Err(UserError::Forbidden);
        }

        self.create(input, roles).await
    }

    async fn create(&self, input: UserInput, roles: RoleSet) -> UserResult<UserResponse> {
        if self
            .repository
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateUsername(input.username));
        }

        let password_hash = self.hash_password(input.password).await?;
        let record = UserRecord::new(input.username, password_hash, input.display_name, roles);
        let saved = self.repository.save(record).await?;

        tracing::info!(roles = %saved.roles, "User registered");
        Ok(saved.into())
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, username: &str) -> UserResult<Option<UserRecord>> {
        self.repository.find_by_username(username).await
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> UserResult<Vec<UserRecord>> {
        self.repository.find_all().await
    }

    /// Check a username/password pair against the stored hash.
    ///
    /// Unknown user and wrong password produce the same error, and both pay
    /// for one Argon2 verification.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> UserResult<Principal> {
        let Some(record) = self.repository.find_by_username(username).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD.to_string()))
                .await?;
            self.verify_password(password.to_string(), dummy.clone())
                .await?;
            tracing::debug!("Unknown username");
            return Err(UserError::InvalidCredentials);
        };

        if !self
            .verify_password(password.to_string(), record.password_hash)
            .await?
        {
            tracing::debug!("Password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        Ok(Principal::new(record.username, record.roles))
    }

    /// Register `username` as an administrator unless it already exists.
    ///
    /// Returns whether a record was created. An existing record is left as is,
    /// whatever its roles or password.
    #[instrument(skip(self, password))]
    pub async fn ensure_bootstrap_admin(&self, username: &str, password: &str) -> UserResult<bool> {
        let input = UserInput {
            username: username.to_string(),
            password: password.to_string(),
            display_name: "Administrator".to_string(),
            roles: None,
        };
        input.validate()?;

        match self.create(input, Role::Admin.into()).await {
            Ok(_) => {
                tracing::info!("Bootstrap admin created");
                Ok(true)
            }
            Err(UserError::DuplicateUsername(_)) => {
                tracing::info!("Bootstrap admin already present");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Argon2 runs on the blocking pool so request workers keep moving.
    async fn hash_password(&self, password: String) -> UserResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| UserError::Internal(format!("Password hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: String, stored_hash: String) -> UserResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| UserError::Internal(format!("Password verification task failed: {e}")))?
    }
}
