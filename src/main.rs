use loudwhispers::{app, db, groups::GroupRegistry, users, AppState};
use sqlx::sqlite::SqlitePoolOptions;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(30)));

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(dotenv::var("DATABASE_URL").unwrap().as_str())
        .await.unwrap();

    db::init(&db_pool).await.unwrap();
    if dotenv::var("SEED_USERS").is_ok() {
        users::seed_sample_users(&db_pool).await.unwrap();
        tracing::info!("sample users seeded");
    }

    let app_state = AppState {
        db_pool,
        registry: GroupRegistry::new(),
    };

    let router = app(app_state).layer(session_layer);
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
    tracing::info!("listening on 0.0.0.0:8080");
    axum::serve(listener, router).await.unwrap();
}
