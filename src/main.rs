//! lanshare - Entry Point
//!
//! Serves one directory tree to browsers on the local network.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use lanshare::Server;
use lanshare::config::{ConfigOverrides, ServerConfig};
use lanshare::error::ServerError;
use lanshare::storage::UploadPolicy;
use lanshare::utils::logging::setup_logging;

#[derive(Parser, Debug)]
#[command(name = "lanshare", version, about = "Browse, upload and edit files over HTTP")]
struct Args {
    /// Port to listen on [default: 8080]
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Directory to serve [default: .]
    #[arg(short = 'd', long = "dir")]
    dir: Option<String>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(short = 'b', long = "bind")]
    bind: Option<String>,

    /// Config file (TOML); defaults to ./lanshare.toml when present
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Where uploaded files are placed
    #[arg(long, value_enum)]
    upload_policy: Option<UploadPolicy>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            bind_address: self.bind.clone(),
            port: self.port,
            serve_dir: self.dir.clone(),
            upload_policy: self.upload_policy,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();
    let args = Args::parse();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<(), ServerError> {
    let config = ServerConfig::load(&args.overrides())?;
    info!("Launching lanshare...");

    let server = Server::new(config).await?;
    server.start().await
}
