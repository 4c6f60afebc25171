use bookstore_core::config::{parsed_or, required, string_or};

/// API service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// HMAC secret for signing access tokens. Env var: `JWT_SECRET`.
    pub jwt_secret: String,
    /// TCP port for the HTTP server (default 8000). Env var: `API_PORT`.
    pub api_port: u16,
    /// Cookie domain attribute (default `localhost`). Env var: `COOKIE_DOMAIN`.
    pub cookie_domain: String,
    /// Directory uploaded images are written to (default `./media`). Env var: `MEDIA_ROOT`.
    pub media_root: String,
    /// URL prefix uploaded images are served under (default `/media`). Env var: `MEDIA_URL`.
    pub media_url: String,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_port: parsed_or("API_PORT", 8000),
            cookie_domain: string_or("COOKIE_DOMAIN", "localhost"),
            media_root: string_or("MEDIA_ROOT", "./media"),
            media_url: normalize_media_url(&string_or("MEDIA_URL", "/media")),
        })
    }
}

/// `media/` and `/media/` both become `/media`.
fn normalize_media_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/media".to_owned()
    } else {
        format!("/{trimmed}")
    }
}
