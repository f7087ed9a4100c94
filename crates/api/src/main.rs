use anyhow::Context;

use triage_api::{ServeConfig, Startup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    triage_observability::init();

    let cfg = ServeConfig::from_env().inspect_err(|e| tracing::error!("{e}"))?;

    // Load before binding: a failed startup never accepts traffic.
    let mut startup = Startup::new(&cfg.model_dir);
    startup.run();
    let ctx = startup.into_ready()?;

    let app = triage_api::app::build_app(ctx, cfg.docs);

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
