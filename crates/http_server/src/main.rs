use std::process::exit;

use clap::Parser;
use log::{error, info};
use skiff_http_server::{
    HttpServer,
    config::Config,
    service::{App, fs::DirStore},
};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    info!("serving files from {}", config.directory.display());

    let app = App::new(DirStore::new(&config.directory))
        .with_write_failure(config.policy().write_failure);
    let server = HttpServer::with_options(config.address(), app, config.connection_options());
    if let Err(err) = server.serve().await {
        error!("failed to serve on {}: {}", config.address(), err);
        exit(1);
    }
}
