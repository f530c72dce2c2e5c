use std::sync::Arc;

use storyline::api::Context;
use storyline::config::{load_config, save_config};
use storyline::wallet::{CrossmintClient, WalletClient};
use storyline::{api, database, llm, logger};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

/// Serves requests as newline-delimited JSON over stdin/stdout. Logs go
/// to stderr so the response stream stays clean.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_logging();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config, using defaults: {}", e);
            let config = storyline::config::Config::default();
            if let Err(e) = save_config(&config) {
                warn!("Failed to write default config: {}", e);
            }
            config
        }
    };

    let db_path = config.resolve_db_path()?;
    database::init_db(&db_path)?;
    info!("Database ready at {}", db_path.display());

    let ai = llm::create_client(&config)?;

    let wallet: Option<Arc<dyn WalletClient>> = if config.crossmint_api_key.is_some() {
        Some(Arc::new(CrossmintClient::new(&config)?))
    } else {
        warn!("No custody API key configured; wallet operations disabled");
        None
    };

    let ctx = Context::new(db_path, config, ai, wallet);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request_id = uuid::Uuid::new_v4();
        let response = match serde_json::from_str::<serde_json::Value>(line) {
            Ok(raw) => {
                info!("Request {}: {}", request_id, raw["op"]);
                api::handle_value(&ctx, raw).await
            }
            Err(e) => {
                error!("Request {}: unparseable input: {}", request_id, e);
                serde_json::json!({
                    "error": {
                        "kind": "validation",
                        "message": format!("Invalid JSON: {}", e),
                    }
                })
            }
        };

        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        stdout.write_all(&payload).await?;
        stdout.flush().await?;
    }

    info!("Input closed, shutting down");
    Ok(())
}
