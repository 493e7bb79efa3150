//! Server configuration

use std::path::PathBuf;

use oppa_pdf::PageSize;

use crate::receipt::RenderingConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for admin authentication
    pub jwt_secret: String,
    /// Fallback sender when the sending user has no sender address
    pub ses_from_email: String,
    /// Organization logo printed on receipts
    pub logo_path: Option<PathBuf>,
    pub font_size: f32,
    /// Page margin in points
    pub page_margin: f32,
    /// First admin account, created only while the users table is empty
    pub bootstrap_admin: Option<(String, String)>,
    /// Reverse proxies in front of the server that append to X-Forwarded-For
    pub trusted_proxies: usize,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::parse_var("HTTP_PORT", 8080),
            environment: environment.clone(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            ses_from_email: std::env::var("SES_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@oppa.in".into()),
            logo_path: std::env::var("LOGO_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            font_size: Self::parse_var("FONT_SIZE", 10.0),
            page_margin: Self::parse_var("PAGE_MARGIN", 40.0),
            bootstrap_admin: std::env::var("BOOTSTRAP_ADMIN_EMAIL")
                .ok()
                .zip(std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok())
                .filter(|(email, password)| !email.trim().is_empty() && !password.is_empty()),
            trusted_proxies: Self::parse_var("TRUSTED_PROXIES", 0),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), BoxError> {
        if !(4.0..=72.0).contains(&self.font_size) {
            return Err(format!("FONT_SIZE {} is out of range (4-72)", self.font_size).into());
        }
        if !(0.0..200.0).contains(&self.page_margin) {
            return Err(format!("PAGE_MARGIN {} is out of range (0-200)", self.page_margin).into());
        }
        Ok(())
    }

    /// Renderer settings derived from this configuration
    pub fn rendering_config(&self) -> RenderingConfig {
        RenderingConfig {
            logo_path: self.logo_path.clone(),
            page_size: PageSize::A4,
            margin: self.page_margin,
            base_font_size: self.font_size,
        }
    }
}
