use std::net::TcpListener;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use gatekeeper::auth::{AuthService, PasswordHasher, TokenService};
use gatekeeper::clock::SystemClock;
use gatekeeper::configuration::{get_configuration, StoreBackend};
use gatekeeper::startup::{run, AppState};
use gatekeeper::store::{CredentialStore, InMemoryCredentialStore, PostgresCredentialStore};
use gatekeeper::telemetry::init_telemetry;

fn fatal(message: &str, err: impl std::fmt::Display) -> std::io::Error {
    tracing::error!(error = %err, "{}", message);
    std::io::Error::new(std::io::ErrorKind::Other, message.to_string())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry("info").map_err(|e| fatal("Failed to initialize telemetry", e))?;

    tracing::info!("Starting application");

    let configuration = get_configuration().map_err(|e| fatal("Failed to read configuration", e))?;
    tracing::info!("Configuration loaded successfully");

    // Signing secret and TTL are validated here; the process does not start without them
    let tokens = TokenService::from_settings(&configuration.auth)
        .map_err(|e| fatal("Invalid authentication settings", e))?;
    let hasher = PasswordHasher::new(configuration.auth.bcrypt_cost)
        .map_err(|e| fatal("Invalid password hashing settings", e))?;

    let store: Arc<dyn CredentialStore> = match configuration.store.backend {
        StoreBackend::Postgres => {
            tracing::info!("Attempting to connect to database");
            let pool = PgPoolOptions::new()
                .max_connections(configuration.database.max_connections)
                .connect(&configuration.database.connection_string())
                .await
                .map_err(|e| fatal("Failed to create connection pool", e))?;

            let store = PostgresCredentialStore::new(pool);
            store
                .migrate()
                .await
                .map_err(|e| fatal("Failed to migrate database", e))?;
            tracing::info!("Database connection pool created and migrated");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory credential store; users are lost on restart");
            Arc::new(InMemoryCredentialStore::new())
        }
    };

    let state = AppState {
        auth: Arc::new(AuthService::new(store, Arc::new(tokens), hasher)),
        clock: Arc::new(SystemClock),
    };

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!(address = %address, "Server listening");

    run(listener, state)?.await
}
