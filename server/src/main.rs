use clap::Parser;
use log::{error, info};
use server::config::GameConfig;
use server::network::Server;

#[derive(Parser, Debug)]
#[command(author, version, about = "Authoritative tile pong server", long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Simulation ticks per second
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = GameConfig {
        tick_rate: args.tick_rate.max(1),
        ..GameConfig::default()
    };

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::new(&address, config).await?;
    info!("WebSocket server: ws://{}", server.local_addr()?);

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
