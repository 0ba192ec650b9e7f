use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_or_default, server::ServerConfig,
};
use database::mongodb::MongoConfig;
use domain_users::PasswordHashConfig;
use domain_users::mongodb::DEFAULT_COLLECTION;

pub use core_config::Environment;

/// Where user records live.
#[derive(Clone, Debug)]
pub enum UserStoreBackend {
    /// Process-local, lost on restart
    Memory,
    MongoDb {
        mongodb: MongoConfig,
        collection: String,
    },
}

impl FromEnv for UserStoreBackend {
    /// `USER_STORE` is `mongodb` (default) or `memory`. MongoDB also reads
    /// [`MongoConfig`] and `USERS_COLLECTION` (default `users`).
    fn from_env() -> Result<Self, ConfigError> {
        match env_or_default("USER_STORE", "mongodb").to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mongodb" | "mongo" => Ok(Self::MongoDb {
                mongodb: MongoConfig::from_env()?,
                collection: env_or_default("USERS_COLLECTION", DEFAULT_COLLECTION),
            }),
            other => Err(ConfigError::ParseError {
                key: "USER_STORE".to_string(),
                details: format!("expected 'mongodb' or 'memory', got '{other}'"),
            }),
        }
    }
}

/// Administrator created at startup when the store doesn't have it yet.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BootstrapAdmin {
    /// `BOOTSTRAP_ADMIN_USERNAME` and `BOOTSTRAP_ADMIN_PASSWORD`, both or neither.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let username = std::env::var("BOOTSTRAP_ADMIN_USERNAME").ok();
        let password = std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok();

        match (username, password) {
            (Some(username), Some(password)) => Ok(Some(Self { username, password })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "BOOTSTRAP_ADMIN_PASSWORD".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(
                "BOOTSTRAP_ADMIN_USERNAME".to_string(),
            )),
        }
    }
}

/// Application configuration, composed from the shared config pieces.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: UserStoreBackend,
    pub password_hash: PasswordHashConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            store: UserStoreBackend::from_env()?,
            password_hash: PasswordHashConfig::from_env()?,
            bootstrap_admin: BootstrapAdmin::from_env()?,
        })
    }
}
