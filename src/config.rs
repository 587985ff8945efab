use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Minimum hours between two consecutive module advances.
    pub wait_hours: i64,
    pub catalog_path: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "course-platform".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "course-platform-users".into()),
        };
        let wait_hours = std::env::var("WAIT_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(24);
        let catalog_path = std::env::var("CATALOG_PATH").unwrap_or_else(|_| "catalog.json".into());
        Ok(Self {
            database_url,
            jwt,
            wait_hours,
            catalog_path,
        })
    }
}
