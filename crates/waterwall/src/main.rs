mod cli;

use anyhow::Result;
use renderer::RendererConfig;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::parse();
    initialise_tracing();

    let surface_size = cli::parse_surface_size(&args.size)?;
    let config = RendererConfig {
        surface_size,
        background: args.background,
    };

    tracing::info!(
        width = surface_size.0,
        height = surface_size.1,
        background = ?config.background,
        "starting waterwall"
    );
    renderer::run(config)
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
