mod api;
mod gateway;

use anyhow::Context;
use aqari_classifier::{IntentClassifier, LlmClassifier};
use aqari_core::{config, config::Config, message::IncomingMessage};
use aqari_kb::KnowledgeBase;
use aqari_session::{SessionStore, SystemClock};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

#[derive(Parser)]
#[command(name = "aqari", version, about = "Aqari — property concierge webhook bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server.
    Start,
    /// Check configuration and knowledge base health.
    Status,
    /// Run a one-shot message through the bot and print the reply.
    Ask {
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;
            let (gateway, kb_entries) = build_gateway(&cfg)?;

            let state = api::ApiState {
                gateway,
                uptime: Instant::now(),
                kb_entries,
                response_format: cfg.api.response_format.clone(),
            };
            api::serve(&cfg.api, state).await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("Aqari — Status Check\n");
            println!("Config: {}", cli.config);
            println!("Bind address: {}:{}", cfg.api.host, cfg.api.port);
            println!("Session TTL: {}s", cfg.session.ttl_secs);
            println!(
                "Classifier: {}",
                if cfg.classifier.enabled {
                    format!("{} ({})", cfg.classifier.model, cfg.classifier.base_url)
                } else {
                    "disabled (heuristic only)".to_string()
                }
            );
            match KnowledgeBase::load(&cfg.kb.path) {
                Ok(kb) => println!("Knowledge base: {} entries from {}", kb.len(), cfg.kb.path),
                Err(e) => println!("Knowledge base: FAILED — {e}"),
            }
        }
        Commands::Ask { message } => {
            let cfg = config::load(&cli.config)?;
            let (gateway, _) = build_gateway(&cfg)?;

            let text = message.join(" ");
            let reply = gateway
                .handle_message(&IncomingMessage::new("cli", text))
                .await;
            println!("{}", reply.text);
        }
    }

    Ok(())
}

/// Load the knowledge base and assemble the dialogue controller.
fn build_gateway(cfg: &Config) -> anyhow::Result<(Arc<gateway::Gateway>, usize)> {
    let kb = Arc::new(
        KnowledgeBase::load(&cfg.kb.path)
            .with_context(|| format!("loading knowledge base from {}", cfg.kb.path))?,
    );
    if kb.is_empty() {
        anyhow::bail!("knowledge base at {} has no usable rows", cfg.kb.path);
    }
    let entries = kb.len();

    let sessions = SessionStore::new(cfg.session.ttl_secs, Arc::new(SystemClock));
    let classifier = build_classifier(cfg);
    let gateway = Arc::new(gateway::Gateway::new(
        kb,
        sessions,
        classifier,
        cfg.prompts.clone(),
    ));
    Ok((gateway, entries))
}

/// Build the LLM classifier when enabled. A missing API key downgrades to
/// heuristic-only operation rather than refusing to start.
fn build_classifier(cfg: &Config) -> Option<Arc<dyn IntentClassifier>> {
    if !cfg.classifier.enabled {
        return None;
    }

    let mut classifier_cfg = cfg.classifier.clone();
    if classifier_cfg.api_key.is_empty() {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => classifier_cfg.api_key = key,
            _ => {
                warn!("classifier enabled but no API key configured; running heuristic-only");
                return None;
            }
        }
    }

    Some(Arc::new(LlmClassifier::from_config(&classifier_cfg)))
}
