//! Settings of the read API

/// Credentials of the single admin identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    /// Expected username
    pub username: String,

    /// Expected password
    pub password: String,
}

/// Everything the read API needs, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Route prefix, e.g. `/v1`
    pub version: String,

    /// Table read when a request names none
    pub default_table: String,

    /// Requests allowed per caller per second
    pub per_second: u32,

    /// Requests allowed per caller per minute
    pub per_minute: u32,

    /// Admin identity checked by Basic auth
    pub admin: AdminCredentials,

    /// Address to bind
    pub host: String,

    /// Port to bind
    pub port: u16,
}

impl ApiConfig {
    /// Route prefix with exactly one leading and no trailing slash
    pub fn prefix(&self) -> String {
        let trimmed = self.version.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}
