use anyhow::Result;
use aws_config::SdkConfig;
use columbus::inventory::sdk::{load_sdk_config, verify_credentials};
use columbus::{Config, Explorer, ReqwestTraffic, SdkInventory, SharedConfig, TrustDnsResolver};
use is_terminal::IsTerminal;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let config = config_init(std::env::args().nth(1))?;
    let aws_config = aws_init(&config).await?;

    let explorer = Arc::new(Explorer::new(
        config.clone(),
        Arc::new(TrustDnsResolver::new(config.dns_server)),
        Arc::new(ReqwestTraffic::default()),
        Arc::new(SdkInventory::new(&aws_config)),
    ));

    tracing::info!("API listening on {}", &config.api_bind_addr);
    let api_server = columbus::new_http(explorer);
    let api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "columbus=info".into()),
        )
        .init();
}

fn config_init(config_file: Option<String>) -> Result<SharedConfig> {
    let config = match config_file {
        None => {
            tracing::debug!("no config file given, using defaults");
            Config::from_env()
        }
        Some(config_file) => {
            tracing::debug!("loaded config from {config_file}");
            Config::try_from_file(&config_file)?
        }
    };
    Ok(Arc::new(config))
}

async fn aws_init(config: &Config) -> Result<SdkConfig> {
    let aws_config = load_sdk_config(&config.aws_region).await;
    verify_credentials(&aws_config).await?;
    tracing::info!("using AWS region {}", config.aws_region);
    Ok(aws_config)
}
