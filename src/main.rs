use clap::{Parser, Subcommand};

use admin_api::lifecycle::{self, startup::ServerOptions};

#[derive(Parser)]
#[command(name = "admin-api", about = "Admin API service", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Server(ServerOptions),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Server(opts) => {
            if let Err(err) = lifecycle::run(opts).await {
                // Structured record for collectors, stderr for the operator.
                tracing::error!(error = %err, "server terminated");
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    }
}
