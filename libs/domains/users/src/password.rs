use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use core_config::{ConfigError, FromEnv, env_parse_or};

use crate::error::{UserError, UserResult};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordHashConfig {
    pub fn params(&self) -> Result<Params, argon2::Error> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
    }
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Environment variables:
/// - `PASSWORD_HASH_MEMORY_KIB` (19456)
/// - `PASSWORD_HASH_ITERATIONS` (2)
/// - `PASSWORD_HASH_PARALLELISM` (1)
///
/// A combination Argon2 refuses is reported as a parse error.
impl FromEnv for PasswordHashConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            memory_kib: env_parse_or("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: env_parse_or("PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: env_parse_or("PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };

        config.params().map_err(|e| ConfigError::ParseError {
            key: "PASSWORD_HASH_*".to_string(),
            details: e.to_string(),
        })?;

        Ok(config)
    }
}

/// One-way password hashing with Argon2id and a fresh random salt per hash.
///
/// Verification reads the parameters embedded in the stored PHC string, so
/// hashes made under older cost settings keep verifying.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new(config: &PasswordHashConfig) -> Result<Self, argon2::Error> {
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, config.params()?),
        })
    }

    pub fn hash(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    /// `Ok(false)` on mismatch; a malformed stored hash is an error.
    pub fn verify(&self, password: &str, stored_hash: &str) -> UserResult<bool> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(UserError::PasswordHash(e.to_string())),
        }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::new(&PasswordHashConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_is_not_plaintext_and_verifies() {
        let hasher = cheap();
        let hash = hasher.hash("pw1").unwrap();

        assert_ne!(hash, "pw1");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("pw1", &hash).unwrap());
        assert!(!hasher.verify("pw2", &hash).unwrap());
    }

    #[test]
    fn test_salt_differs_per_hash() {
        let hasher = cheap();
        assert_ne!(hasher.hash("pw1").unwrap(), hasher.hash("pw1").unwrap());
    }

    #[test]
    fn test_verify_uses_params_from_stored_hash() {
        let hash = cheap().hash("pw1").unwrap();
        assert!(Argon2Hasher::default().verify("pw1", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let err = cheap().verify("pw1", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, UserError::PasswordHash(_)));
    }

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars_unset(
            [
                "PASSWORD_HASH_MEMORY_KIB",
                "PASSWORD_HASH_ITERATIONS",
                "PASSWORD_HASH_PARALLELISM",
            ],
            || {
                let config = PasswordHashConfig::from_env().unwrap();
                assert_eq!(config, PasswordHashConfig::default());
                assert_eq!(config.memory_kib, 19456);
                assert_eq!(config.iterations, 2);
                assert_eq!(config.parallelism, 1);
            },
        );
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("PASSWORD_HASH_MEMORY_KIB", Some("65536")),
                ("PASSWORD_HASH_ITERATIONS", Some("3")),
                ("PASSWORD_HASH_PARALLELISM", Some("4")),
            ],
            || {
                let config = PasswordHashConfig::from_env().unwrap();
                assert_eq!(config.memory_kib, 65536);
                assert_eq!(config.iterations, 3);
                assert_eq!(config.parallelism, 4);
            },
        );
    }

    #[test]
    fn test_config_rejects_params_argon2_refuses() {
        temp_env::with_vars(
            [
                ("PASSWORD_HASH_MEMORY_KIB", Some("19456")),
                ("PASSWORD_HASH_ITERATIONS", Some("0")),
                ("PASSWORD_HASH_PARALLELISM", None),
            ],
            || {
                let err = PasswordHashConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::ParseError { .. }));
            },
        );
    }
}
