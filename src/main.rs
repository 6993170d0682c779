use anyhow::Result;
use clap::Parser;
use solace::{logger, AppConfig, Launcher};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logger::init();

    let config = AppConfig::parse();
    config.validate()?;

    Launcher::with_config(config).launch().await
}
