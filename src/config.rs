use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongo_uri: String,
    pub database: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongo_uri = std::env::var("MONGO_URI")?;
        let database =
            std::env::var("MONGO_DATABASE").unwrap_or_else(|_| "MainDatabase".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET_KEY")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "tasknest".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "tasknest-users".into()),
            ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };
        Ok(Self {
            mongo_uri,
            database,
            jwt,
        })
    }
}
