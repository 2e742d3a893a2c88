use clap::Parser;
use dotenv::dotenv;
use iris::run_with_config_path;

/// Iris - HTTP service that describes images with a vision model
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML config file (optional; defaults apply when missing)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from `.env` file into std::env (optional)
    dotenv().ok();

    let args = Args::parse();

    run_with_config_path(&args.config).await
}
