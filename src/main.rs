use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use liveops_attendance::{app, config::Config, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ─── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("liveops_attendance=debug,tower_http=info")),
        )
        .init();

    // ─── Config ───────────────────────────────────────────────────────────────
    let config = Config::from_env().context("Invalid configuration")?;
    let addr = config.server_addr();
    info!(
        company = %config.default_company_id,
        cutover = %config.attendance_cutover_date,
        "Configuration loaded"
    );

    // ─── App State ────────────────────────────────────────────────────────────
    let state = AppState::in_memory(config);

    // ─── Router ───────────────────────────────────────────────────────────────
    let app = app(state);

    // ─── Start Server ─────────────────────────────────────────────────────────
    info!("🚀 LiveOps Attendance API listening on http://{}", addr);
    info!("📖 Swagger UI:  http://{}/docs", addr);
    info!("❤️  Health:      http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
