//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{
    ConnectionAuthenticator, JwtVerifier, MessagePipeline, TokenVerifier,
};
use crate::config::Settings;
use crate::domain::{ChatRepository, MessageRepository, UserRepository};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    PgChatRepository, PgMessageRepository, PgUserRepository,
};
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::{Gateway, SessionServices};
use crate::shared::snowflake::SnowflakeGenerator;

/// Store collaborators behind their domain traits
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            chats: Arc::new(PgChatRepository::new(pool.clone())),
            messages: Arc::new(PgMessageRepository::new(pool.clone())),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub authenticator: Arc<ConnectionAuthenticator>,
    pub realtime: SessionServices,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire services from their collaborators
    pub fn new(
        db: PgPool,
        repositories: Repositories,
        verifier: Arc<dyn TokenVerifier>,
        settings: Settings,
    ) -> Self {
        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            0u64, // Default node_id
            settings.snowflake.epoch,
        ));

        let authenticator = Arc::new(ConnectionAuthenticator::new(
            verifier,
            repositories.users.clone(),
        ));

        let pipeline = Arc::new(MessagePipeline::new(
            repositories.chats.clone(),
            repositories.messages,
            repositories.users,
            snowflake,
        ));

        let realtime = SessionServices {
            gateway: Arc::new(Gateway::new()),
            pipeline,
            chats: repositories.chats,
            authorize_chat_joins: settings.websocket.authorize_chat_joins,
        };

        Self {
            db,
            authenticator,
            realtime,
            settings: Arc::new(settings),
        }
    }
}

/// Router with the HTTP middleware stack applied
pub fn build_router(state: AppState) -> Router {
    let cors_layer = cors::create_cors_layer(&state.settings.cors);
    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors_layer)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db).await?;
            tracing::info!("Database migrations applied");
        }

        let verifier = Arc::new(JwtVerifier::from_settings(&settings.auth)?);
        let repositories = Repositories::postgres(&db);

        let addr = settings.server_addr();
        let state = AppState::new(db, repositories, verifier, settings);

        handlers::health::init_server_start();
        let router = build_router(state);

        // Bind to address
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Resolve on Ctrl+C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
