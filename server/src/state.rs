//! Application state

use std::sync::Arc;

use aws_sdk_sesv2::Client as SesClient;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::DbService;
use crate::notify::OrderNotifier;
use crate::paystack::PaystackClient;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Paystack API client
    pub paystack: PaystackClient,
    /// Real-time order notification publisher (constructor-injected)
    pub notifier: Arc<dyn OrderNotifier>,
    /// AWS SES client for transactional email
    pub ses: SesClient,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Storefront base URL (payment callbacks, email links)
    pub frontend_url: String,
    /// Paystack secret key (webhook signature verification)
    pub paystack_secret_key: String,
    /// SES sender address
    pub ses_from_email: String,
}

impl AppState {
    /// Create a new AppState: connect the database, run migrations, build the
    /// gateway client and the SES client.
    pub async fn new(config: &Config, notifier: Arc<dyn OrderNotifier>) -> Result<Self, BoxError> {
        let db = DbService::new(&config.database_path).await?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = SesClient::new(&aws_config);

        let paystack = PaystackClient::new(&config.paystack_secret_key)?;

        Ok(Self {
            pool: db.pool,
            paystack,
            notifier,
            ses,
            jwt_secret: config.jwt_secret.clone(),
            frontend_url: config.frontend_url.clone(),
            paystack_secret_key: config.paystack_secret_key.clone(),
            ses_from_email: config.ses_from_email.clone(),
        })
    }

    /// State over an in-memory database with an injectable gateway client and
    /// notifier (integration tests).
    pub async fn for_tests(
        paystack: PaystackClient,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Result<Self, BoxError> {
        let db = DbService::open_in_memory().await?;
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = SesClient::new(&aws_config);

        Ok(Self {
            pool: db.pool,
            paystack,
            notifier,
            ses,
            jwt_secret: "test-secret-at-least-32-characters!!".into(),
            frontend_url: "http://localhost:3000".into(),
            paystack_secret_key: "sk_test_secret".into(),
            ses_from_email: "noreply@example.com".into(),
        })
    }
}
