use std::fmt;
use tokio_postgres::config::SslMode;

/// Variables that must be present for the process to start. `PG_PASS` is the
/// write password; it is never used here but its absence means the deployment
/// is misconfigured.
pub const REQUIRED_ENV: [&str; 4] = ["PG_PASS", "PG_PASS_RO", "PG_USER_RO", "PG_HOST_RO"];

const DEFAULT_PORT: u16 = 5432;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CredentialsError {
    #[error("{0} env variable must be set")]
    Missing(&'static str),

    #[error("PG_PORT '{0}' is not a valid port")]
    InvalidPort(String),

    #[error(
        "PG_SSL '{0}' is not supported, use one of: disable, allow, prefer, require, verify-ca, verify-full"
    )]
    UnsupportedSslMode(String),
}

/// Read-only database credentials shared by all requests. The database name is
/// supplied per request.
#[derive(Clone)]
pub struct ReadOnlyCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    password: String,
    pub ssl_mode: SslMode,
}

impl fmt::Debug for ReadOnlyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl ReadOnlyCredentials {
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        for name in REQUIRED_ENV {
            if get(name).is_none() {
                return Err(CredentialsError::Missing(name));
            }
        }

        let port = match get("PG_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| CredentialsError::InvalidPort(port))?,
            None => DEFAULT_PORT,
        };

        let ssl_mode = match get("PG_SSL").as_deref() {
            None | Some("disable") => SslMode::Disable,
            Some("allow") | Some("prefer") => SslMode::Prefer,
            // Certificates are always verified against the system roots once TLS is used.
            Some("require") | Some("verify-ca") | Some("verify-full") => SslMode::Require,
            Some(other) => return Err(CredentialsError::UnsupportedSslMode(other.to_string())),
        };

        Ok(ReadOnlyCredentials {
            host: get("PG_HOST_RO").unwrap_or_default(),
            port,
            user: get("PG_USER_RO").unwrap_or_default(),
            password: get("PG_PASS_RO").unwrap_or_default(),
            ssl_mode,
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}
