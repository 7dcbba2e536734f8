use std::env;

/// Runtime configuration for the portal
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Maximum upload size in bytes (default: 50 MB)
    pub max_file_size: usize,

    /// Base URL objects are publicly served from, e.g. "https://cdn.example.com/materials"
    pub storage_public_url: Option<String>,

    /// JWT Secret Key (Required)
    pub jwt_secret: String,

    /// Admin login name (default: "admin")
    pub admin_username: String,

    /// Argon2 PHC string of the admin password
    pub admin_password_hash: Option<String>,

    /// Completion endpoint base URL
    pub ai_base_url: String,
    /// Completion API key
    pub ai_api_key: Option<String>,
    /// Completion model name (default: "gemini-2.0-flash")
    pub ai_model: String,

    /// Seed the default top-level categories into an empty table (default: true)
    pub seed_default_categories: bool,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50 MB
            storage_public_url: None,
            jwt_secret: "secret".to_string(),
            admin_username: "admin".to_string(),
            admin_password_hash: None,
            ai_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            ai_api_key: None,
            ai_model: "gemini-2.0-flash".to_string(),
            seed_default_categories: true,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl PortalConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            storage_public_url: env::var("STORAGE_PUBLIC_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            admin_username: env::var("ADMIN_USERNAME").unwrap_or(default.admin_username),
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH").ok(),

            ai_base_url: env::var("AI_BASE_URL").unwrap_or(default.ai_base_url),
            ai_api_key: env::var("AI_API_KEY").ok(),
            ai_model: env::var("AI_MODEL").unwrap_or(default.ai_model),

            seed_default_categories: env::var("SEED_DEFAULT_CATEGORIES")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.seed_default_categories),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Environment config for a deployed server. `JWT_SECRET` must be set and
    /// must differ from the built-in default.
    pub fn production() -> anyhow::Result<Self> {
        let jwt_secret = require_jwt_secret(env::var("JWT_SECRET").ok())?;
        Ok(Self {
            jwt_secret,
            ..Self::from_env()
        })
    }

    /// Create config for development (local MinIO, no seeding surprises)
    pub fn development() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            storage_public_url: Some("http://localhost:9000/materials".to_string()),
            jwt_secret: "development-secret".to_string(),
            seed_default_categories: false,
            ..Self::default()
        }
    }
}

fn require_jwt_secret(value: Option<String>) -> anyhow::Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(secret) if !secret.is_empty() && secret != PortalConfig::default().jwt_secret => {
            Ok(secret)
        }
        Some(_) => Err(anyhow::anyhow!(
            "JWT_SECRET must be set to a non-default value"
        )),
        None => Err(anyhow::anyhow!("JWT_SECRET must be set")),
    }
}
