use anyhow::{bail, Result};
use log::info;

use fdc_monitor::cli::build_cli;
use fdc_monitor::config::Config;
use fdc_monitor::services::{PollService, SlaveService};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = build_cli().get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => {
            info!("📋 Loading configuration from {}", path);
            Config::from_file(path).map_err(|e| anyhow::anyhow!("config error: {}", e))?
        }
        None => Config::default(),
    };

    match matches.subcommand() {
        Some(("poll", sub)) => {
            config
                .apply_matches(sub)
                .map_err(|e| anyhow::anyhow!("config error: {}", e))?;
            info!("🚀 Field Bus Monitor v{} (poll)", fdc_monitor::VERSION);
            PollService::new(config.client)?.run().await?;
        }
        Some(("serve", sub)) => {
            config
                .apply_matches(sub)
                .map_err(|e| anyhow::anyhow!("config error: {}", e))?;
            info!("🚀 Field Bus Monitor v{} (serve)", fdc_monitor::VERSION);
            SlaveService::new(config.server).run().await?;
        }
        _ => bail!("expected a subcommand: poll or serve"),
    }

    Ok(())
}
