use std::fs::{self, File};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use rebel_core::{catalog, Config, Conversation, GeminiClient, StylistGateway};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "rebel")]
#[command(version, about = "Rebel Youth storefront with an AI stylist")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Gemini model for the stylist (overrides the config file)
    #[arg(short, long, global = true, env = "REBEL_MODEL")]
    model: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the stylist a single question and print the reply
    Ask {
        /// What you want styled
        question: String,
    },
    /// List the product lineup
    Catalog,
    /// List selectable Gemini models
    Models {
        /// Save this model as the default
        #[arg(long = "use")]
        use_model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config: {e}");
        Config::new()
    });
    if let Some(model) = cli.model.clone() {
        config.model = Some(model);
    }

    match cli.command {
        None => {
            init_file_logging(cli.debug)?;
            run_tui(config).await
        }
        Some(command) => {
            init_stderr_logging(cli.debug);
            match command {
                Commands::Ask { question } => ask_stylist(&config, &question).await,
                Commands::Catalog => {
                    list_catalog();
                    Ok(())
                }
                Commands::Models { use_model } => list_models(&config, use_model.as_deref()),
            }
        }
    }
}

fn env_filter(debug: bool) -> EnvFilter {
    let default_filter = if debug { "debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

fn init_stderr_logging(debug: bool) {
    tracing_subscriber::registry()
        .with(env_filter(debug))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// The TUI owns the terminal, so logs go to a file under the cache directory
fn init_file_logging(debug: bool) -> Result<()> {
    let Some(log_dir) = dirs::cache_dir().map(|p| p.join("rebel-youth")) else {
        return Ok(());
    };
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let file = File::create(log_dir.join("rebel.log"))?;

    tracing_subscriber::registry()
        .with(env_filter(debug))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    if debug {
        tracing::info!("Debug logging enabled");
    }
    Ok(())
}

async fn run_tui(config: Config) -> Result<()> {
    let gateway = StylistGateway::from_config(&config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(gateway, config.model().to_string(), events.sender());

    let result = event_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn event_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

async fn ask_stylist(config: &Config, question: &str) -> Result<()> {
    let Some(gateway) = StylistGateway::from_config(config) else {
        println!("{}", "Stylist offline.".red());
        println!("Set {} or add \"api_key\" to the config file.", "GEMINI_API_KEY".bold());
        return Ok(());
    };

    let mut conversation = Conversation::new(true);
    let turn = match conversation.submit(question) {
        Ok(turn) => turn,
        Err(rejection) => {
            println!("{}: {}", "Nothing to ask".yellow(), rejection);
            return Ok(());
        }
    };

    println!("{} {}", "YOU>".bold(), turn.utterance);
    let outcome = gateway.ask(&turn.utterance).await;
    conversation.resolve(turn.id, outcome);

    if let Some(reply) = conversation.last() {
        println!("{} {}", "STYLIST.EXE>".green().bold(), reply.text);
    }
    Ok(())
}

fn list_catalog() {
    println!("\n{}", "LATEST DROPS".bold().green());
    println!("{}", "=".repeat(40).dark_grey());

    for product in catalog::products() {
        let pick = if product.stylist_pick { "" } else { " (not stocked by the stylist)" };
        println!(
            "  {:>2}. {:<24} {:>5}  {}{}",
            product.id,
            product.name.to_uppercase(),
            format!("${}", product.price),
            product.category.as_str().dark_grey(),
            pick.dark_grey(),
        );
    }

    println!("\n[ {} ITEMS DETECTED ]", catalog::products().len());
}

fn list_models(config: &Config, use_model: Option<&str>) -> Result<()> {
    if let Some(model) = use_model {
        Config::save_model(model)?;
        println!("Default model set to {}", model.bold());
        return Ok(());
    }

    println!("\n{}", "Gemini models".bold().green());
    for model in GeminiClient::list_models() {
        if model == config.model() {
            println!("  * {}", model.green());
        } else {
            println!("    {}", model);
        }
    }
    Ok(())
}
