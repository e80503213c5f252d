use std::env;

use anyhow::Result;
use madadgar_api::build_app;
use madadgar_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("madadgar_api");

    let data_root =
        env::var("MADADGAR_DATA_ROOT").unwrap_or_else(|_| "data/facilities".to_string());
    let bind = env::var("MADADGAR_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = build_app(&data_root).await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, data_root = %data_root, "madadgar dispatch api started");

    axum::serve(listener, app).await?;
    Ok(())
}
