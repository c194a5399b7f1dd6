//! # GemClaw — Diamond Inventory & Policy Assistant
//!
//! Answers questions about the diamond inventory (through generated SQL) and
//! the company's grading and sales policies (through document retrieval).
//!
//! Usage:
//!   gemclaw chat                         # Interactive session
//!   gemclaw ask "How many Ideal cuts?"   # One-shot question
//!   gemclaw init-db --csv diamonds.csv   # Load the inventory table
//!   gemclaw stats                        # Inventory size
//!   gemclaw retrieve "return policy"     # Show retrieved policy chunks

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gemclaw_agent::{ChatSession, build_orchestrator};
use gemclaw_core::config::{GemClawConfig, expand_path};
use gemclaw_inventory::InventoryDb;
use gemclaw_knowledge::PolicyRagTool;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gemclaw",
    version,
    about = "💎 GemClaw — Hybrid inventory (SQL) and policy (RAG) assistant"
)]
struct Cli {
    /// Config file (default: ~/.gemclaw/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session
    Chat,
    /// Ask a single question and exit
    Ask {
        /// The question
        query: Vec<String>,
    },
    /// Load the inventory CSV into SQLite, replacing the existing table
    InitDb {
        /// CSV file (default: inventory.csv_path from config)
        #[arg(long)]
        csv: Option<String>,
        /// Database file (default: inventory.db_path from config)
        #[arg(long)]
        db: Option<String>,
    },
    /// Show inventory statistics
    Stats,
    /// Show the policy chunks retrieved for a question, without an LLM call
    Retrieve {
        query: Vec<String>,
    },
    /// List supported LLM providers
    Providers {
        /// Check that the active provider is reachable
        #[arg(long)]
        check: bool,
    },
}

fn load_config(path: Option<&str>) -> Result<GemClawConfig> {
    let config = match path {
        Some(p) => GemClawConfig::load_from(&expand_path(p))?,
        None => GemClawConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose { "gemclaw=debug" } else { "gemclaw=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Chat => chat(&config).await,
        Command::Ask { query } => {
            let query = query.join(" ");
            anyhow::ensure!(!query.trim().is_empty(), "empty question");
            let orchestrator = build_orchestrator(&config)?;
            println!("{}", orchestrator.answer(&query).await);
            Ok(())
        }
        Command::InitDb { csv, db } => init_db(&config, csv, db),
        Command::Stats => stats(&config),
        Command::Retrieve { query } => retrieve(&config, &query.join(" ")).await,
        Command::Providers { check } => providers(&config, check).await,
    }
}

async fn chat(config: &GemClawConfig) -> Result<()> {
    let orchestrator = Arc::new(build_orchestrator(config)?);
    let mut session = ChatSession::new(orchestrator);

    println!("💎 GemClaw v{}", env!("CARGO_PKG_VERSION"));
    println!("   🤖 Model:     {} / {}", config.provider_name(), config.model_name());
    match inventory_size(config) {
        Ok(n) => println!("   📊 Inventory: {n} items"),
        Err(e) => println!("   ⚠️  Inventory unavailable: {e}"),
    }
    println!("   📋 Policies:  {}", expand_path(&config.knowledge.policy_path).display());
    println!("   Commands: /history, /clear, /quit\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("🧹 History cleared.\n");
            }
            "/history" => {
                for message in session.history() {
                    println!("[{}] {}", message.role, message.content);
                }
                println!();
            }
            query => {
                let answer = session.ask(query).await;
                println!("\n{answer}\n");
            }
        }
    }

    println!("👋 Bye ({} questions).", session.turns());
    Ok(())
}

fn init_db(config: &GemClawConfig, csv: Option<String>, db: Option<String>) -> Result<()> {
    let csv_path = expand_path(csv.as_deref().unwrap_or(&config.inventory.csv_path));
    let db_path = expand_path(db.as_deref().unwrap_or(&config.inventory.db_path));

    let store = InventoryDb::open(&db_path)?;
    let rows = store
        .load_csv(&csv_path, &config.inventory.table)
        .with_context(|| format!("loading {}", csv_path.display()))?;

    println!(
        "✅ Loaded {rows} rows from {} into {}:{}",
        csv_path.display(),
        db_path.display(),
        config.inventory.table
    );
    Ok(())
}

fn stats(config: &GemClawConfig) -> Result<()> {
    let db_path = expand_path(&config.inventory.db_path);
    let store = InventoryDb::open_existing(&db_path)?;
    let tables = store.tables()?;
    if tables.is_empty() {
        println!("⚠️  {} has no tables. Run `gemclaw init-db` first.", db_path.display());
        return Ok(());
    }
    println!("🗄️  {}", db_path.display());
    for table in tables {
        println!("   {table}: {} items", store.row_count(&table)?);
    }
    Ok(())
}

async fn retrieve(config: &GemClawConfig, query: &str) -> Result<()> {
    anyhow::ensure!(!query.trim().is_empty(), "empty question");
    let provider = gemclaw_providers::create_provider(config)?;
    let embedder = gemclaw_providers::create_embedder(config)?;
    let params = gemclaw_core::traits::provider::GenerateParams::from_config(config);
    let tool = PolicyRagTool::new(provider, embedder, params, &config.knowledge);

    for (rank, hit) in tool.retrieve(query).await?.iter().enumerate() {
        println!("#{} chunk {} (score {:.3})", rank + 1, hit.chunk.index, hit.score);
        println!("{}\n", hit.chunk.content);
    }
    Ok(())
}

async fn providers(config: &GemClawConfig, check: bool) -> Result<()> {
    let active = config.provider_name();
    println!("🔌 Supported providers:");
    for name in gemclaw_providers::available_providers() {
        let marker = if name == active { " (active)" } else { "" };
        println!("   • {name}{marker}");
    }

    let models = gemclaw_providers::known_models(active);
    if !models.is_empty() {
        println!("\n🧠 Models for {active}:");
        for m in models {
            println!("   • {} ({}, {}k context)", m.id, m.name, m.context_length / 1000);
        }
    }

    if check {
        let provider = gemclaw_providers::create_provider(config)?;
        match provider.health_check().await {
            Ok(true) => println!("\n✅ {} is reachable", provider.name()),
            Ok(false) => println!("\n⚠️  {} is not ready (missing API key?)", provider.name()),
            Err(e) => println!("\n❌ {} check failed: {e}", provider.name()),
        }
    }
    Ok(())
}

fn inventory_size(config: &GemClawConfig) -> Result<i64> {
    let store = InventoryDb::open_existing(&expand_path(&config.inventory.db_path))?;
    Ok(store.row_count(&config.inventory.table)?)
}
