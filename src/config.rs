use rocket::figment::Figment;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Mysql,
    Memory,
}

/// Application settings, read from the same sources as Rocket's own
/// (`Rocket.toml`, `ROCKET_*` environment variables, selected profile).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreKind,
    pub sql_user: String,
    pub sql_password: String,
    pub sql_host: String,
    pub sql_database: String,
    pub sql_max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Mysql,
            sql_user: "channels".to_string(),
            sql_password: String::new(),
            sql_host: "localhost:3306".to_string(),
            sql_database: "channels".to_string(),
            sql_max_connections: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Figment(#[from] rocket::figment::Error),
    #[error("Missing connection detail: {0}")]
    InvalidConnectionDetails(&'static str),
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    pub fn format_conn_url(&self) -> Result<String, ConfigError> {
        for (name, value) in [
            ("sql_user", &self.sql_user),
            ("sql_host", &self.sql_host),
            ("sql_database", &self.sql_database),
        ] {
            if value.is_empty() {
                return Err(ConfigError::InvalidConnectionDetails(name));
            }
        }
        Ok(format!(
            "mysql://{u}:{p}@{h}/{d}",
            u = self.sql_user,
            p = self.sql_password,
            h = self.sql_host,
            d = self.sql_database,
        ))
    }
}
