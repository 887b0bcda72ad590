/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 8000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,

    /// Build id used in hashed asset URLs. When unset, every process start
    /// generates a fresh one.
    pub build_id: Option<String>,

    /// `lang` attribute of rendered documents (default: en)
    pub lang: String,

    /// Max request body size in bytes (default: 2MB)
    pub max_body_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8000,
            environment: "development".to_string(),
            build_id: None,
            lang: "en".to_string(),
            max_body_size: 2 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();
        let defaults = Config::default();

        Ok(Config {
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: match std::env::var("SERVER_PORT") {
                Ok(port) => port.parse()?,
                Err(_) => defaults.server_port,
            },
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            build_id: std::env::var("NOCTURNE_BUILD_ID")
                .ok()
                .filter(|id| !id.trim().is_empty()),
            lang: std::env::var("NOCTURNE_LANG").unwrap_or(defaults.lang),
            max_body_size: match std::env::var("MAX_BODY_SIZE") {
                Ok(size) => size.parse()?,
                Err(_) => defaults.max_body_size,
            },
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// The configured build id, or a fresh random one.
    pub fn build_id(&self) -> String {
        self.build_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string())
    }
}
