//! Command handlers: the console chat loop and file validation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use concierge_dialogue::{ConciergeService, DialogueEngine, SessionStore};
use concierge_embeddings::{ApiEmbedder, ApiEmbedderConfig, Embedder, HashingEmbedder};
use concierge_knowledge::{KnowledgeStore, TomlKnowledgeStore};
use concierge_llm::{ApiModel, ApiModelConfig, LanguageModel, MockModel};
use concierge_types::{ConciergeConfig, MenuTree, SharedKnowledge, TurnInput};

use crate::collaborators::{ConsoleOutbound, JsonlFeedbackSink, LoggingHandoff};

/// Initialize tracing output. `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(cli_config: Option<&str>, log_override: Option<&str>) -> Result<ConciergeConfig> {
    let mut config = ConciergeConfig::load(cli_config).context("loading configuration")?;
    if let Some(level) = log_override {
        config.log_level = level.to_string();
    }
    Ok(config)
}

fn load_menu(path: &str) -> Result<Arc<MenuTree>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading menu file {path}"))?;
    let tree: MenuTree = toml::from_str(&raw).context("parsing menu file")?;
    if tree.is_empty() {
        bail!("menu file {path} has no top-level entries");
    }
    Ok(Arc::new(tree))
}

fn feedback_path() -> PathBuf {
    ProjectDirs::from("", "", "concierge")
        .map(|dirs| dirs.data_local_dir().join("feedback.jsonl"))
        .unwrap_or_else(|| PathBuf::from("./feedback.jsonl"))
}

fn build_embedder(config: &ConciergeConfig, offline: bool) -> Result<Arc<dyn Embedder>> {
    if offline {
        return Ok(Arc::new(HashingEmbedder::default()));
    }
    let Some(api_key) = config.embedding.api_key.as_deref() else {
        bail!("embedding.api_key is not set; pass --offline or configure it");
    };
    let mut embedder_config = ApiEmbedderConfig::openai(api_key, &config.embedding.model);
    if let Some(base_url) = &config.embedding.api_base_url {
        embedder_config = embedder_config.with_base_url(base_url);
    }
    Ok(Arc::new(ApiEmbedder::new(embedder_config)?))
}

fn build_model(config: &ConciergeConfig, offline: bool) -> Result<Arc<dyn LanguageModel>> {
    if offline {
        // Permissive local stand-in: no classification, answers released
        // unrewritten. Good enough to exercise the flows.
        return Ok(Arc::new(MockModel::new()));
    }
    let Some(api_key) = config.llm.api_key.as_deref() else {
        bail!("llm.api_key is not set; pass --offline or configure it");
    };
    let mut model_config = ApiModelConfig::openai(
        api_key,
        &config.llm.triage_model,
        &config.llm.rewrite_model,
    );
    model_config.max_retries = config.llm.max_retries;
    if let Some(base_url) = &config.llm.api_base_url {
        model_config = model_config.with_base_url(base_url);
    }
    Ok(Arc::new(ApiModel::new(model_config)?))
}

/// Run the interactive console chat loop.
pub async fn run_chat(
    cli_config: Option<&str>,
    log_override: Option<&str>,
    offline: bool,
    conversation_id: &str,
) -> Result<()> {
    let config = load_config(cli_config, log_override)?;
    init_logging(&config.log_level);

    let embedder = build_embedder(&config, offline)?;
    let model = build_model(&config, offline)?;
    let tree = load_menu(&config.menu_path)?;

    let store = TomlKnowledgeStore::new(
        &config.knowledge_path,
        embedder.clone(),
        config.retrieval.question_weight,
    );
    let base = store.load().await.context("loading knowledge base")?;
    info!(
        topics = base.topics.len(),
        entries = base.entry_count(),
        offline,
        "Concierge ready"
    );
    let knowledge = SharedKnowledge::new(base);

    let engine = DialogueEngine::new(
        tree,
        embedder,
        model,
        Arc::new(LoggingHandoff),
        Arc::new(JsonlFeedbackSink::new(feedback_path())),
        config.retrieval.clone(),
        config.dialogue.clone(),
    );
    let service = ConciergeService::new(
        SessionStore::new(knowledge.clone()),
        engine,
        Arc::new(ConsoleOutbound),
    );

    println!("Concierge console. Type 'menu' to begin, '/reload' to reload the knowledge base, '/quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "/quit" => break,
            "/reload" => match store.load().await {
                Ok(base) => {
                    println!(
                        "Knowledge base reloaded: {} topics, {} entries.",
                        base.topics.len(),
                        base.entry_count()
                    );
                    knowledge.replace(base);
                }
                Err(e) => println!("Reload failed, keeping the current base: {e}"),
            },
            text => {
                service
                    .handle_message(TurnInput {
                        conversation_id: conversation_id.to_string(),
                        display_name: String::new(),
                        text: text.to_string(),
                        is_group: false,
                    })
                    .await;
            }
        }
    }

    Ok(())
}

/// Validate the menu and knowledge files without starting a chat.
///
/// The knowledge file is embedded with the offline embedder, so validation
/// costs no API calls.
pub async fn validate(cli_config: Option<&str>, log_override: Option<&str>) -> Result<()> {
    let config = load_config(cli_config, log_override)?;
    init_logging(&config.log_level);

    let tree = load_menu(&config.menu_path)?;
    println!(
        "Menu OK: {} nodes, {} top-level.",
        tree.nodes.len(),
        tree.top_level_names().len()
    );

    let store = TomlKnowledgeStore::new(
        &config.knowledge_path,
        Arc::new(HashingEmbedder::default()),
        config.retrieval.question_weight,
    );
    let base = store.load().await.context("loading knowledge base")?;
    println!(
        "Knowledge base OK: {} topics, {} entries.",
        base.topics.len(),
        base.entry_count()
    );
    for (label, entries) in &base.topics {
        println!("  {label}: {} entries", entries.len());
    }

    Ok(())
}
