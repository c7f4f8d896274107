use sprint_planner::mcp::run_server;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP transport, logs go to stderr
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        Ok::<_, anyhow::Error>(
            EnvFilter::new("warn").add_directive("sprint_planner::mcp=info".parse()?),
        )
    })?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    run_server().await
}
