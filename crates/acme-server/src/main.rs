//! ACME Server - Main entry point

use std::{net::SocketAddr, sync::Arc, time::Duration};

use acme_common::logging::{init_logging, LogConfig};
use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use acme_server::{
    api,
    auth::TokenService,
    config::Config,
    db::{self, DatabaseManagement, MigrationTarget, PgBooksRepository, PgDatabaseManagement, PgUsersRepository},
    features::{management::seed_admin_user, FeatureState},
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("acme-server")
        .filter_directives("acme_server=debug,tower_http=debug,sqlx=info")
        .build();

    // Environment variables take precedence over the defaults above
    let log_config = log_config.merge_env()?;

    let _logging_guard = init_logging(&log_config)?;

    info!("Starting ACME Server");

    let config = Config::load().context("Failed to load configuration")?;
    info!(
        environment = ?config.server.environment,
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;
    info!("Database connection pool established");

    let books = Arc::new(PgBooksRepository::new(pool.clone()));
    let users = Arc::new(PgUsersRepository::new(pool.clone()));
    let management = Arc::new(PgDatabaseManagement::new(pool));

    if config.database.auto_migrate {
        let head = management
            .migrate(&MigrationTarget::Latest)
            .await
            .context("Failed to run migrations")?;
        info!(head = ?head, "Database migrations completed");

        seed_admin_user(users.as_ref(), &config.seed)
            .await
            .context("Failed to seed the administrator account")?;
    } else {
        info!("Automatic migration disabled (DATABASE_AUTO_MIGRATE=false)");
    }

    let state = FeatureState {
        books,
        users,
        management,
        tokens: Arc::new(TokenService::new(&config.token)),
        seed: config.seed.clone(),
    };

    let app = api::create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM, then gives in-flight requests a moment to finish
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
