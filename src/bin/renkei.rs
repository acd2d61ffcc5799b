use clap::{command, Parser};
use renkei::{
    chain::{ChainBuilder, ChainContext},
    config::DriverConfig,
    driver::ChainDriver,
    provider::{TimerApi, TokioSpawner},
    RenkeiError,
};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Number of async units the bounded loop performs
    #[arg(short, long, default_value_t = 4)]
    units: u32,

    /// Enable debug mode
    #[arg(short, long)]
    verbose: bool,
}

async fn run(cli: &Cli) -> Result<(), RenkeiError> {
    // Load config
    let config: DriverConfig = if cli.config.exists() {
        DriverConfig::from_file(&cli.config)?
    } else {
        // Default config
        DriverConfig::default()
    };

    info!("config loaded.");

    debug!("config: {:?}", config);

    let spawner = Arc::new(TokioSpawner::new());
    let api = Arc::new(TimerApi::from_config(&config.provider));
    let driver = ChainDriver::from_config(&config);

    // Single call: the api unit completes, then the final handler runs.
    let context = Arc::new(ChainContext::new(spawner.clone(), api.clone()));
    let simple = ChainBuilder::call(context, || Ok("Data from async".to_string())).build();

    debug!("driving single api call");

    let payload = driver.run(simple).await?;
    println!("called back with: \"{}\"", payload);

    // Bounded loop: exactly `units` async units, then the terminal marker.
    let context = Arc::new(ChainContext::new(spawner, api));
    let looped = ChainBuilder::bounded_loop(context, cli.units).build();

    debug!(units = cli.units, "driving bounded loop");

    let marker = driver.run(looped).await?;
    println!("My Final Handler: {}", marker);

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt().init();
    }

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
