//! Application state

use std::sync::Arc;

use aws_sdk_sesv2::Client as SesClient;
use sqlx::PgPool;

use shared::models::ADMIN_ROLE;

use crate::auth::admin_auth::AccountLookup;
use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::db::users::{self, NewUser};
use crate::email::SesMailer;
use crate::receipt::{PdfRenderer, ReceiptDocumentBuilder, ReportDocumentBuilder};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Receipt email transport (AWS SES)
    pub mailer: SesMailer,
    /// PDF renderer, logo decoded once at startup
    pub renderer: Arc<PdfRenderer>,
    pub receipts: ReceiptDocumentBuilder,
    pub reports: ReportDocumentBuilder,
    /// JWT secret for admin authentication
    pub jwt_secret: String,
    /// Fallback SES sender address
    pub ses_from_email: String,
    /// Rate limiter for the login route
    pub rate_limiter: RateLimiter,
    /// Current account behind each authenticated request
    pub accounts: Arc<dyn AccountLookup>,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        if let Some((email, password)) = &config.bootstrap_admin {
            ensure_bootstrap_admin(&pool, email, password).await?;
        }

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = if let Ok(ses_region) = std::env::var("SES_REGION") {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(ses_region))
                .build();
            SesClient::new(&ses_config)
        } else {
            SesClient::new(&aws_config)
        };

        Ok(Self::from_parts(pool, ses, config))
    }

    /// Assemble the state from an existing pool and SES client
    pub fn from_parts(pool: PgPool, ses: SesClient, config: &Config) -> Self {
        let renderer = PdfRenderer::new(config.rendering_config());
        if config.logo_path.is_some() && !renderer.has_logo() {
            tracing::warn!("Receipts will render without the organization logo");
        }
        let accounts: Arc<dyn AccountLookup> = Arc::new(pool.clone());

        Self {
            pool,
            mailer: SesMailer::new(ses),
            renderer: Arc::new(renderer),
            receipts: ReceiptDocumentBuilder::default(),
            reports: ReportDocumentBuilder,
            jwt_secret: config.jwt_secret.clone(),
            ses_from_email: config.ses_from_email.clone(),
            rate_limiter: RateLimiter::new(config.trusted_proxies),
            accounts,
        }
    }
}

/// Create the first admin when no user exists yet
async fn ensure_bootstrap_admin(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<(), BoxError> {
    if users::count(pool).await? > 0 {
        return Ok(());
    }
    let hashed = crate::util::hash_password(password).map_err(|e| e.to_string())?;
    let email = email.trim().to_lowercase();
    let user = NewUser {
        name: "Administrator",
        email: &email,
        hashed_password: &hashed,
        role: ADMIN_ROLE,
        email_type: None,
        sender_email: None,
    };
    let user_id = users::create(pool, &user, shared::util::now_millis()).await?;
    tracing::info!(user_id, email = %email, "Bootstrap admin created");
    Ok(())
}
