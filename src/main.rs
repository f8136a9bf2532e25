use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hearth::agent::{Agent, AgentConfig};
use hearth::config::Config;
use hearth::llm::{Message, OpenAiClient, OpenAiConfig, Role};
use hearth::store::FamilyStore;
use hearth::tools::ToolCatalog;

mod cli;

use cli::{Cli, Commands};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hearth")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("hearth.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_agent(config: &Config) -> Result<Agent<OpenAiClient>> {
    let llm_config = OpenAiConfig {
        base_url: config.llm.base_url.clone(),
        api_key_env: config.llm.api_key_env.clone(),
        timeout: Duration::from_millis(config.llm.timeout_ms),
    };
    let client = OpenAiClient::new(llm_config).context("Failed to build LLM client")?;

    let agent_config = AgentConfig {
        model: config.llm.model.clone(),
        system_prompt: config.resolve_system_prompt(),
        db_path: config.storage.db_path.clone(),
    };

    Ok(Agent::new(
        Arc::new(client),
        ToolCatalog::builtin(),
        agent_config,
    ))
}

async fn run_chat(config: &Config) -> Result<()> {
    info!("Starting chat session");

    if let Some(parent) = config.storage.db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create data directory")?;
    }

    let agent = build_agent(config)?;

    println!("{}", "Hearth - your kitchen assistant".cyan().bold());
    println!("{}", "Type a message, or 'quit' to exit.".dimmed());

    let stdin = std::io::stdin();
    let mut history: Vec<Message> = Vec::new();

    loop {
        print!("{} ", "you>".green().bold());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        history.push(Message::user(input));
        history = agent
            .run_turn(std::mem::take(&mut history))
            .await
            .context("Conversation turn failed")?;

        for message in history.iter().rev() {
            if message.role == Role::Assistant && !message.has_tool_calls() {
                let reply = message.content.as_deref().unwrap_or("");
                println!("{} {}", "hearth>".cyan().bold(), reply);
                break;
            }
        }
    }

    println!("{}", "Goodbye!".cyan());
    Ok(())
}

fn run_tools() -> Result<()> {
    let catalog = ToolCatalog::builtin();
    println!("{}", "Available tools:".cyan().bold());
    for tool in catalog.tools() {
        println!("  {} - {}", tool.name.green(), tool.description);
    }
    Ok(())
}

fn run_init_db(config: &Config) -> Result<()> {
    if let Some(parent) = config.storage.db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create data directory")?;
    }
    FamilyStore::open(&config.storage.db_path).context("Failed to initialize database")?;
    println!(
        "{} {}",
        "Database ready:".green(),
        config.storage.db_path.display()
    );
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
        println!("  model: {}", config.llm.model);
        println!("  database: {}", config.storage.db_path.display());
    }

    match &cli.command {
        None | Some(Commands::Chat) => run_chat(config).await,
        Some(Commands::Tools) => run_tools(),
        Some(Commands::InitDb) => run_init_db(config),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
