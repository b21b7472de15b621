use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Constructed once in `main` and injected through `AppState` — no globals.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub store_key: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    /// Held for request signing if signed uploads are ever enabled;
    /// unsigned preset uploads leave it unused.
    #[allow(dead_code)]
    pub cloudinary_api_secret: String,
    pub cloudinary_upload_preset: String,
    pub admin_key: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            store_url: require_env("SUPABASE_URL")?,
            store_key: require_env("SUPABASE_KEY")?,
            cloudinary_cloud_name: require_env("CLOUDINARY_CLOUD_NAME")?,
            cloudinary_api_key: require_env("CLOUDINARY_API_KEY")?,
            cloudinary_api_secret: require_env("CLOUDINARY_API_SECRET")?,
            cloudinary_upload_preset: require_env("CLOUDINARY_UPLOAD_PRESET")?,
            admin_key: require_env("ADMIN_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
