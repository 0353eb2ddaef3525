//! CLI command definitions, routing, and tracing setup.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use lexdraft_classifier::IntentClassifier;
use lexdraft_core::{AnthropicGenerator, ConversationOrchestrator, TurnProgress, TurnStage, strategy_for};
use lexdraft_retrieval::KnowledgeRetriever;
use lexdraft_shared::{
    AppConfig, ConversationId, Request, ResponseEnvelope, Role, SourceOrigin, StrategyKind,
    init_config, load_config, resolve_api_key, validate_api_key,
};
use lexdraft_storage::{ConversationStore, Storage};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LexDraft: draft legal documents and answer questions in conversation.
#[derive(Parser)]
#[command(
    name = "lexdraft",
    version,
    about = "Conversational legal drafting assistant backed by a local knowledge base.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Send one message and print the assistant's reply.
    Chat {
        /// The message text.
        message: String,

        /// Continue an existing conversation.
        #[arg(short, long)]
        conversation: Option<ConversationId>,

        /// Override the configured strategy: heuristic or tagged.
        #[arg(short, long)]
        strategy: Option<StrategyKind>,

        /// Print the response envelope as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show how a message would be classified, without generating anything.
    Classify {
        /// The message text.
        message: String,
    },

    /// Browse stored conversations.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Knowledge sidecar operations.
    Retriever {
        #[command(subcommand)]
        action: RetrieverAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// History subcommands.
#[derive(Subcommand)]
pub(crate) enum HistoryAction {
    /// List conversations, most recently updated first.
    List {
        /// Maximum number of conversations to show.
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
    /// Print every turn of one conversation.
    Show {
        /// Conversation ID.
        id: ConversationId,
    },
}

/// Retriever subcommands.
#[derive(Subcommand)]
pub(crate) enum RetrieverAction {
    /// Report whether the vector database is loaded.
    Status,
    /// Load the vector database if it is not loaded yet.
    Load,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "lexdraft=info",
        1 => "lexdraft=debug",
        _ => "lexdraft=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Chat {
            message,
            conversation,
            strategy,
            json,
        } => cmd_chat(message, conversation, strategy, json).await,
        Command::Classify { message } => cmd_classify(&message),
        Command::History { action } => match action {
            HistoryAction::List { limit } => cmd_history_list(limit).await,
            HistoryAction::Show { id } => cmd_history_show(id).await,
        },
        Command::Retriever { action } => match action {
            RetrieverAction::Status => cmd_retriever_status().await,
            RetrieverAction::Load => cmd_retriever_load().await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// chat
// ---------------------------------------------------------------------------

async fn cmd_chat(
    message: String,
    conversation: Option<ConversationId>,
    strategy: Option<StrategyKind>,
    json: bool,
) -> Result<()> {
    let config = load_config()?;
    let api_key = resolve_api_key(&config)?;
    let kind = strategy.unwrap_or(config.assistant.strategy);

    let generator = AnthropicGenerator::new(&config.generator, api_key)?;
    let retriever = KnowledgeRetriever::new(&config.retrieval)?;
    let storage = Storage::open(&config.storage.resolved_path()?).await?;

    let model = generator.model().to_string();
    let sidecar = retriever.base_url().to_string();
    let orchestrator = ConversationOrchestrator::new(
        strategy_for(kind),
        Arc::new(retriever),
        Arc::new(generator),
        Arc::new(storage),
    )
    .configured(&config);

    info!(
        strategy = ?orchestrator.strategy().kind(),
        model = %model,
        sidecar = %sidecar,
        "starting turn"
    );

    let mut request = Request::new(message);
    if let Some(id) = conversation {
        request = request.in_conversation(id);
    }

    let progress = CliProgress::new()?;
    let outcome = orchestrator.handle(&request, &progress).await;
    progress.finish();

    let envelope = outcome.map_err(|e| {
        if e.is_fatal_to_turn() {
            eyre!("turn failed: {e}")
        } else {
            eyre!(e)
        }
    })?;
    if json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        print_envelope(&envelope);
    }
    Ok(())
}

fn print_envelope(envelope: &ResponseEnvelope) {
    println!();
    println!("{}", envelope.content);
    println!();
    if envelope.is_legal_draft {
        println!(
            "  Draft:        yes ({})",
            envelope.document_type.as_deref().unwrap_or("general")
        );
    } else {
        println!("  Draft:        no");
    }
    if !envelope.sources.is_empty() {
        println!("  Sources:");
        for source in &envelope.sources {
            match (source.origin, &source.key) {
                (SourceOrigin::RemoteObjectStore, Some(key)) => {
                    println!("    - {} ({key})", source.filename)
                }
                _ => println!("    - {}", source.filename),
            }
        }
    }
    match envelope.conversation_id {
        Some(id) => println!("  Conversation: {id}"),
        None => println!("  Conversation: not saved"),
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner that follows the stages of a turn.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl TurnProgress for CliProgress {
    fn stage(&self, stage: TurnStage) {
        let message = match stage {
            TurnStage::Received | TurnStage::Classified => "Reading request",
            TurnStage::Retrieved | TurnStage::RetrievalSkipped => "Consulting knowledge base",
            TurnStage::Prompted => "Drafting",
            TurnStage::Generated | TurnStage::Parsed => "Checking response",
            TurnStage::Packaged => "Done",
        };
        self.spinner.set_message(message);
    }
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

fn cmd_classify(message: &str) -> Result<()> {
    let classification = IntentClassifier::new().classify(message);
    println!("  Category:      {}", classification.category);
    println!(
        "  Document type: {}",
        classification
            .document_type
            .map(|t| t.as_str())
            .unwrap_or("-")
    );
    println!("  Valid:         {}", classification.is_valid);
    Ok(())
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

/// Read-only store, or `None` when nothing has been recorded yet.
async fn open_history(config: &AppConfig) -> Result<Option<Storage>> {
    let path = config.storage.resolved_path()?;
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(Storage::open_readonly(&path).await?))
}

async fn cmd_history_list(limit: u32) -> Result<()> {
    let config = load_config()?;
    let Some(storage) = open_history(&config).await? else {
        println!("No conversations yet.");
        return Ok(());
    };

    let conversations = storage.list_conversations(limit).await?;
    if conversations.is_empty() {
        println!("No conversations yet.");
        return Ok(());
    }
    for c in conversations {
        println!(
            "{}  {}  {:>3} turns  {}",
            c.id,
            c.updated_at.format("%Y-%m-%d %H:%M"),
            c.turn_count,
            c.title
        );
    }
    Ok(())
}

async fn cmd_history_show(id: ConversationId) -> Result<()> {
    let config = load_config()?;
    let storage = open_history(&config)
        .await?
        .ok_or_else(|| eyre!("conversation {id} not found"))?;

    let snapshot = storage.get_conversation(id).await?;
    println!("# {}", snapshot.title);
    println!("  Created: {}", snapshot.created_at.to_rfc3339());
    println!("  Updated: {}", snapshot.updated_at.to_rfc3339());
    for turn in &snapshot.turns {
        println!();
        match (turn.role, turn.is_legal_draft) {
            (Role::User, _) => println!("## user"),
            (Role::Assistant, true) => println!(
                "## assistant (draft: {})",
                turn.document_type.as_deref().unwrap_or("general")
            ),
            (Role::Assistant, false) => println!("## assistant"),
        }
        println!("{}", turn.content);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// retriever
// ---------------------------------------------------------------------------

async fn cmd_retriever_status() -> Result<()> {
    let config = load_config()?;
    let retriever = KnowledgeRetriever::new(&config.retrieval)?;
    let loaded = retriever.status().await?;
    println!("  Sidecar:  {}", retriever.base_url());
    println!("  Loaded:   {}", if loaded { "yes" } else { "no" });
    Ok(())
}

async fn cmd_retriever_load() -> Result<()> {
    let config = load_config()?;
    let retriever = KnowledgeRetriever::new(&config.retrieval)?;
    retriever.ensure_loaded().await?;
    println!("Vector database loaded from {}", config.retrieval.database_path);
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    match validate_api_key(&config) {
        Ok(()) => println!("# {} is set", config.generator.api_key_env),
        Err(e) => println!("# {e}"),
    }
    Ok(())
}
