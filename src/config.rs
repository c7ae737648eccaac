use std::{env, fmt::Display, fs::read_to_string, net::IpAddr, str::FromStr};
use thiserror::Error;
use tracing::{info, warn};

const SECRETS_DIR: &str = "/run/secrets";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Appwrite(AppwriteSettings),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
}

/// One login token and the pre-provisioned account it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub email: String,
    pub display_name: String,
}

/// Static `token -> credential` table; all accounts share one password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityTable {
    credentials: Vec<Credential>,
    password: String,
}

impl IdentityTable {
    pub fn new(credentials: Vec<Credential>, password: impl Into<String>) -> Self {
        Self {
            credentials,
            password: password.into(),
        }
    }

    /// Parses `token=email[=Display Name]` entries separated by commas.
    pub fn parse(raw: &str, password: impl Into<String>) -> Result<Self, ConfigError> {
        let mut credentials: Vec<Credential> = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.splitn(3, '=').map(str::trim);
            let token = parts.next().unwrap_or_default();
            let email = parts.next().unwrap_or_default();
            if token.is_empty() || email.is_empty() {
                return Err(ConfigError::Invalid {
                    key: "TRACKER_IDENTITIES",
                    reason: format!("expected token=email, got '{entry}'"),
                });
            }
            if credentials.iter().any(|c| c.token == token) {
                return Err(ConfigError::Invalid {
                    key: "TRACKER_IDENTITIES",
                    reason: format!("duplicate token '{token}'"),
                });
            }
            let display_name = parts
                .next()
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| capitalize(token));
            credentials.push(Credential {
                token: token.to_string(),
                email: email.to_string(),
                display_name,
            });
        }

        if credentials.is_empty() {
            return Err(ConfigError::Invalid {
                key: "TRACKER_IDENTITIES",
                reason: "no identities configured".to_string(),
            });
        }
        Ok(Self::new(credentials, password))
    }

    pub fn resolve(&self, token: &str) -> Option<&Credential> {
        let token = token.trim();
        self.credentials.iter().find(|c| c.token == token)
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    /// Display name of the first participant who is not `email`.
    pub fn friend_of(&self, email: &str) -> Option<&str> {
        self.credentials
            .iter()
            .find(|c| !c.email.eq_ignore_ascii_case(email))
            .map(|c| c.display_name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub backend: BackendKind,
    pub identities: IdentityTable,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match try_load::<String>("TRACKER_BACKEND", "appwrite")?.as_str() {
            "appwrite" => BackendKind::Appwrite(AppwriteSettings {
                endpoint: required("APPWRITE_ENDPOINT")?,
                project_id: required("APPWRITE_PROJECT_ID")?,
                database_id: required("APPWRITE_DATABASE_ID")?,
                collection_id: required("APPWRITE_COLLECTION_ID")?,
            }),
            "memory" => BackendKind::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    key: "TRACKER_BACKEND",
                    reason: format!("unknown backend '{other}'"),
                });
            }
        };

        let identities = IdentityTable::parse(&required("TRACKER_IDENTITIES")?, password()?)?;

        Ok(Self {
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "8080")?,
            backend,
            identities,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    var(key).ok_or(ConfigError::Missing(key))
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}

fn password() -> Result<String, ConfigError> {
    const KEY: &str = "TRACKER_PASSWORD";
    if let Some(password) = var(KEY) {
        return Ok(password);
    }

    let path = format!("{SECRETS_DIR}/{KEY}");
    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {KEY} from {path}: {e}");
            ConfigError::Missing(KEY)
        })
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
