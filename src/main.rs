use rusty_library_lending::{
    adapters::{
        memory::{
            MemoryBookRepository, MemoryBorrowRepository, MemoryMemberRepository, MemoryStore,
            MemoryUnitOfWork,
        },
        postgres::{
            PostgresBookRepository, PostgresBorrowRepository, PostgresMemberRepository,
            PostgresUnitOfWork, connect, run_migrations,
        },
    },
    api::{handlers::AppState, router::create_router},
    application::ServiceDependencies,
    config::{AppConfig, DatabaseConfig},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_lending=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Initialize adapters
    let service_deps = match &config.database {
        Some(database) => postgres_dependencies(database).await?,
        None => {
            tracing::warn!("DATABASE_URL is not set, using the in-memory store");
            memory_dependencies()
        }
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;
    Ok(())
}

async fn postgres_dependencies(
    database: &DatabaseConfig,
) -> Result<ServiceDependencies, Box<dyn std::error::Error>> {
    let pool = connect(database).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(ServiceDependencies {
        books: Arc::new(PostgresBookRepository::new(pool.clone())),
        members: Arc::new(PostgresMemberRepository::new(pool.clone())),
        borrows: Arc::new(PostgresBorrowRepository::new(pool.clone())),
        unit_of_work: Arc::new(PostgresUnitOfWork::new(pool)),
    })
}

fn memory_dependencies() -> ServiceDependencies {
    let store = MemoryStore::new();

    ServiceDependencies {
        books: Arc::new(MemoryBookRepository::new(store.clone())),
        members: Arc::new(MemoryMemberRepository::new(store.clone())),
        borrows: Arc::new(MemoryBorrowRepository::new(store.clone())),
        unit_of_work: Arc::new(MemoryUnitOfWork::new(store)),
    }
}
