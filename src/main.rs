use rmcp::ServiceExt;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use owui_mcp::client::OpenWebUi;
use owui_mcp::options::ClientOptions;
use owui_mcp::ToolServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // stdout carries the protocol stream.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let options = ClientOptions::from_env();
    info!("Using Open WebUI API at {}", options.api_url);
    if options.api_key.is_none() {
        warn!("OWUI_API_KEY is not set; requests will be unauthenticated");
    }

    let client = match OpenWebUi::new(options) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create Open WebUI client: {}", e);
            std::process::exit(1);
        }
    };

    let server = ToolServer::discover(&client);
    info!("Serving {} tools over stdio", server.tools().len());

    let service = server.serve(rmcp::transport::stdio()).await.inspect_err(|e| {
        error!("Failed to start MCP service: {}", e);
    })?;
    service.waiting().await?;

    Ok(())
}
