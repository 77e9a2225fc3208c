use anyhow::Result;
use clap::Parser;
use misty_proxy::ProxyState;

#[derive(Parser, Debug)]
#[command(name = "misty-proxy")]
#[command(about = "Serve GET /api/weather?city= backed by OpenWeatherMap")]
struct Args {
    /// Port to listen on (defaults to PORT, then the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Upstream base URL
    #[arg(long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    misty_core::init()?;

    let mut config = misty_core::Config::load()?.proxy;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(upstream) = args.upstream {
        config.upstream_url = upstream;
    }

    let state = ProxyState::from_config(&config)?;
    misty_proxy::run(config.port, state).await
}
