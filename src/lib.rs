//! # greenthumb: gardening advice backend
//!
//! `greenthumb` is a small REST backend serving month-by-month gardening
//! advice, with administrator-managed user accounts and a cached proxy in
//! front of an OpenWeatherMap-compatible weather provider.
//!
//! ## Overview
//!
//! The service exposes three resource groups. **Advice** entries pair a free
//! text tip with a calendar month (1-12); anyone can read them, while
//! creating, updating and deleting require the ADMIN role. **Users** are
//! provisioned by administrators (no self-registration) and carry an email,
//! an Argon2id password hash and a 5-digit postcode. **Weather** lookups are
//! proxied to the upstream provider and cached for an hour, either for an
//! explicit city or for the authenticated caller's postcode.
//!
//! Authentication is stateless: `POST /login` exchanges credentials for a
//! signed JWT, and subsequent requests present it as a bearer token.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses SQLite (via sqlx) for persistence. The **API
//! layer** ([`api`]) holds the handlers and their request/response models.
//! The **authentication layer** ([`auth`]) covers password hashing, JWT
//! sessions and the role-guard extractors. The **database layer** ([`db`])
//! uses the repository pattern: each table has a repository handling queries
//! and mutations. A shared tag-aware cache ([`cache`]) backs both the user
//! listing and the weather proxy.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use greenthumb::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = greenthumb::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     greenthumb::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;
mod types;
pub mod validation;
pub mod weather;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::password,
    cache::TaggedCache,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    weather::WeatherClient,
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
pub use config::Config;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};

pub use types::{AdviceId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub cache: TaggedCache,
    pub weather: WeatherClient,
}

/// Get the greenthumb database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the account on first startup, or refreshes the
/// password on later startups when one is configured. Returns the id of the
/// created or existing account.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(
    email: &str,
    password: Option<&str>,
    post_code: &str,
    db: &SqlitePool,
) -> anyhow::Result<UserId> {
    let password_hash = match password {
        Some(pwd) => Some(password::hash_string(pwd).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?),
        None => None,
    };

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_user_by_email(email).await? {
        if let Some(password_hash) = password_hash {
            sqlx::query("UPDATE users SET password_hash = ? WHERE email = ?")
                .bind(password_hash)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let user_create = UserCreateDBRequest {
        email: email.to_string(),
        // An admin account without a configured password cannot log in until
        // one is set
        password_hash: password_hash.unwrap_or_default(),
        post_code: post_code.to_string(),
        roles: vec![Role::Admin],
    };

    let created_user = user_repo
        .create(&user_create)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create admin user: {e}"))?;

    tx.commit().await?;
    info!(user_id = created_user.id, "Created initial admin user");
    Ok(created_user.id)
}

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/login", post(api::handlers::auth::login))
        // Advice endpoints; reads are open, mutations are ADMIN-gated inside
        // the handlers
        .route("/advices", get(api::handlers::advices::list_current_month_advices))
        .route("/advices", post(api::handlers::advices::create_advice))
        .route("/advices/all", get(api::handlers::advices::list_all_advices))
        .route("/advices/month/{month}", get(api::handlers::advices::list_advices_for_month))
        .route("/advices/{id}", get(api::handlers::advices::get_advice))
        .route("/advices/{id}", put(api::handlers::advices::update_advice))
        .route("/advices/{id}", delete(api::handlers::advices::delete_advice))
        // User management (ADMIN only)
        .route("/user", get(api::handlers::users::list_users))
        .route("/user", post(api::handlers::users::create_user))
        .route("/user/{id}", get(api::handlers::users::get_user))
        .route("/user/{id}", put(api::handlers::users::update_user))
        .route("/user/{id}", delete(api::handlers::users::delete_user))
        // Weather proxy
        .route("/weather", get(api::handlers::weather::weather_for_current_user))
        .route("/weather/{city}", get(api::handlers::weather::weather_for_city))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations and provisions the initial admin account
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting greenthumb with configuration: {:#?}", config);

        let pool = SqlitePool::connect(&config.database.url).await?;
        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &config.admin_post_code, &pool).await?;

        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
            cache: TaggedCache::new(config.cache.max_capacity),
            weather: WeatherClient::new(&config.weather)?,
        };
        let router = build_router(state);

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("greenthumb listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
