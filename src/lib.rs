pub mod cli;
pub mod composer;
pub mod llm;
pub mod models;
pub mod server;

use cli::Args;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Port: {}", args.port);
    info!("Static Dir: {}", args.static_dir);
    info!("Model: {}", args.model);
    info!("Completion URL: {}", args.completion_url);
    info!("API Key Present: {}", args.api_key.as_deref().is_some_and(|k| !k.is_empty()));
    info!("Folder Id Present: {}", args.folder_id.as_deref().is_some_and(|f| !f.is_empty()));
    info!("-------------------------");

    let addr = format!("0.0.0.0:{}", args.port);
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, args);
    server.run().await
}
