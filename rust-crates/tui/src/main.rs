use clap::Parser;
use color_eyre::eyre::Result;
use fortune_tui::{
    app,
    config::Args,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let _log_guard = app::init_tracing(&args.log_dir)?;
    tracing::info!("starting fortune-cookie client");
    let config = args.into_config()?;
    app::run_app(config).await
}
