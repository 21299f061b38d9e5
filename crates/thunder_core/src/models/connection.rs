//! Connection configuration, session summaries and saved profiles.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ThunderError;

/// Default PostgreSQL port.
pub const DEFAULT_PORT: u16 = 5432;

/// SSL mode for database connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SslMode {
    /// No SSL
    #[default]
    #[serde(rename = "disable")]
    Disable,
    /// Require SSL, accept any certificate
    #[serde(rename = "require")]
    Require,
    /// Require SSL, verify CA
    #[serde(rename = "verify-ca")]
    VerifyCa,
    /// Require SSL, verify CA and hostname
    #[serde(rename = "verify-full")]
    VerifyFull,
}

impl SslMode {
    /// Convert to the libpq keyword value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disable => "disable",
            Self::Require => "require",
            Self::VerifyCa => "verify-ca",
            Self::VerifyFull => "verify-full",
        }
    }

    /// Parse from string representation. Blank or unknown input disables SSL.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "require" => Self::Require,
            "verify-ca" | "verify_ca" => Self::VerifyCa,
            "verify-full" | "verify_full" => Self::VerifyFull,
            _ => Self::Disable,
        }
    }
}

/// Pool and session options that are not part of the DSN proper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionOptions {
    /// Connection timeout in seconds
    pub connect_timeout_secs: u32,
    /// Maximum pooled connections for this session
    pub pool_max_size: usize,
    /// Application name sent to PostgreSQL
    pub application_name: String,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self { connect_timeout_secs: 10, pool_max_size: 4, application_name: "Thunder".to_string() }
    }
}

/// Configuration for a database connection.
///
/// Field names on the wire follow the front end (`db`, `sslMode`, ...).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionConfig {
    /// Display name
    pub name: String,
    /// UI accent color (hex format, e.g., "#FF5733")
    pub color: String,
    /// Server hostname or IP (blank means localhost)
    pub host: String,
    /// Server port
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,
    /// Login username
    pub user: String,
    /// Login password
    pub password: String,
    /// Target database name
    #[serde(rename = "db")]
    pub database: String,
    /// SSL configuration
    #[serde(deserialize_with = "deserialize_ssl_mode")]
    pub ssl_mode: SslMode,
    /// Client certificate path
    pub ssl_cert: String,
    /// Client key path
    pub ssl_key: String,
    /// CA certificate path
    pub ssl_root_cert: String,
    /// Pool options
    pub options: ConnectionOptions,
}

impl ConnectionConfig {
    /// Create a new configuration with required fields.
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: DEFAULT_PORT,
            database: database.into(),
            user: user.into(),
            ..Default::default()
        }
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the UI color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the SSL mode.
    pub fn with_ssl_mode(mut self, ssl_mode: SslMode) -> Self {
        self.ssl_mode = ssl_mode;
        self
    }

    /// Validate the configuration before any connection attempt.
    pub fn validate(&self) -> Result<(), ThunderError> {
        if self.database.trim().is_empty() {
            return Err(ThunderError::connection_with_hint(
                "Database name is required",
                "Enter the name of the database to open",
            ));
        }
        if self.ssl_key.trim().is_empty() != self.ssl_cert.trim().is_empty() {
            return Err(ThunderError::connection_with_hint(
                "Client certificate and key must be provided together",
                "Set both sslCert and sslKey, or neither",
            ));
        }
        Ok(())
    }

    /// Host to connect to.
    pub fn effective_host(&self) -> &str {
        match self.host.trim() {
            "" => "localhost",
            host => host,
        }
    }

    /// Port to connect to.
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_PORT
        } else {
            self.port
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"********")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish_non_exhaustive()
    }
}

/// Accept `5432`, `"5432"` or `""` for the port.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortRepr {
        Number(u16),
        Text(String),
    }

    match PortRepr::deserialize(deserializer)? {
        PortRepr::Number(port) => Ok(port),
        PortRepr::Text(text) if text.trim().is_empty() => Ok(DEFAULT_PORT),
        PortRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {text}"))),
    }
}

/// Blank ssl mode strings mean `disable`.
fn deserialize_ssl_mode<'de, D>(deserializer: D) -> Result<SslMode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "" | "disable" | "require" | "verify-ca" | "verify-full" => Ok(SslMode::parse(&raw)),
        other => Err(serde::de::Error::custom(format!("unknown ssl mode: {other}"))),
    }
}

/// Request to open a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// Driver kind tag (e.g., "postgres")
    pub driver: String,
    /// Connection configuration
    pub config: ConnectionConfig,
}

/// Result of a connect request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    /// Whether a session was opened
    pub connected: bool,
    /// Identity of the new session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
}

/// Public view of an open session. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session identity
    pub id: String,
    /// Display name
    pub name: String,
    /// Database name
    pub database: String,
    /// Server host
    pub host: String,
    /// UI color
    pub color: String,
    /// Whether unaddressed operations route here
    pub is_active: bool,
}

/// A connection profile persisted by the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedConnection {
    /// Profile identity
    pub id: String,
    /// Stored configuration
    pub config: ConnectionConfig,
}
