/// Server configuration loaded from environment variables.
///
/// A `.env` file in the working directory is honored when present.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub listen_addr: String,
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Comma-separated origins allowed by CORS. Empty means allow any.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let listen_addr =
            std::env::var("ADSYNC_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let db_path =
            std::env::var("ADSYNC_DB_PATH").unwrap_or_else(|_| "adsync.db".to_string());
        let cors_origins = std::env::var("ADSYNC_CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Config {
            listen_addr,
            db_path,
            cors_origins,
        }
    }
}
