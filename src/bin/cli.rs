use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use shipwreck::shipwreck_agent::SqlAgent;
use shipwreck::shipwreck_agent::llm::OpenAiChatModel;
use shipwreck::shipwreck_config::{AgentConfig, DatabaseConfig, LlmConfig};
use shipwreck::shipwreck_db::{Database, demo};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shipwreck-cli")]
#[command(about = "Shipwreck CLI - ask billing questions and manage the demo database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question and print the generated SQL, the answer and the rows
    Ask {
        /// The question, in plain language
        question: String,

        /// Also print every tool call the model made
        #[arg(long)]
        show_steps: bool,
    },
    /// List the tables and views visible through DATABASE_URL
    Tables,
    /// Write the demo student-billing database to a SQLite file
    SeedDemo {
        /// Path of the SQLite file to create
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask {
            question,
            show_steps,
        } => handle_ask(&question, show_steps).await,
        Commands::Tables => handle_tables().await,
        Commands::SeedDemo { path } => handle_seed_demo(path).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn connect() -> anyhow::Result<Database> {
    let config = DatabaseConfig::from_env();
    Database::connect(&config)
        .await
        .with_context(|| format!("failed to open database at {}", config.redacted_url()))
}

async fn handle_ask(question: &str, show_steps: bool) -> anyhow::Result<()> {
    let llm_config = LlmConfig::from_env()?;
    let db = connect().await?;
    let model = OpenAiChatModel::new(llm_config)?;
    let agent = SqlAgent::new(Arc::new(model), db.clone(), AgentConfig::from_env());

    let outcome = agent.run(question, &[]).await?;

    if show_steps {
        for (i, step) in outcome.steps.iter().enumerate() {
            println!("── step {} · {} {}", i + 1, step.tool, step.input);
            println!("{}\n", step.observation);
        }
    }

    let rows = db.fetch_rows(&outcome.query).await?;

    println!("SQL:\n  {}\n", outcome.query);
    println!("Answer:\n  {}\n", outcome.content);
    println!("Rows ({}):", rows.len());
    println!("{}", serde_json::to_string_pretty(&rows)?);

    db.close().await;
    Ok(())
}

async fn handle_tables() -> anyhow::Result<()> {
    let db = connect().await?;
    let tables = db.list_tables().await?;

    if tables.is_empty() {
        println!("No tables found.");
    }
    for table in tables {
        println!("{}", table);
    }

    db.close().await;
    Ok(())
}

async fn handle_seed_demo(path: PathBuf) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    demo::create_demo_database(&path).await?;

    println!("✅ Demo database written to {}", path.display());
    println!("   DATABASE_URL=sqlite://{}", path.display());
    Ok(())
}
