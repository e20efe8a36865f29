use evalboard::config::Config;
use evalboard::{api, db, seed};

use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    dotenv::dotenv().ok();

    let config = Config::from_env();

    let pool = db::connect(&config.database_url).await?;
    db::init_schema(&pool).await?;

    if std::env::args().any(|arg| arg == "--seed") {
        let count = seed::seed_sample_positions(&pool).await?;
        tracing::info!(count, "seeded sample positions");
    }

    let app = api::router(pool, config.clone());
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("API listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
