use anyhow::{Context, Result};
use recipe_bot::app::{browse_history, generate_recipe, GenerationOutcome, HistoryView};
use recipe_bot::api_connection::RecipeClient;
use recipe_bot::cli::{parse_args, Command};
use recipe_bot::config::AppConfig;
use recipe_bot::history::{export_to_dir, HistoryStore};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "recipe_bot=info";

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_history(view: &HistoryView) {
    if view.is_empty_store() {
        println!("Your Knowledge Base is empty. Generate some recipes to see your search history here!");
        return;
    }
    if let Some((first, last)) = view.date_bounds {
        println!("History spans {} to {}.", first, last);
    }
    println!("Diet types: {}", view.diet_options.join(", "));
    println!("\n{} of {} searches match:\n", view.records.len(), view.total);
    println!("{:<19}  {:<12}  {}", "Timestamp", "Diet", "Query");
    for record in &view.records {
        println!(
            "{:<19}  {:<12}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.diet,
            record.query
        );
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let cli_args = parse_args();
    let mut config = AppConfig::from_env();
    if let Some(path) = cli_args.history_file.clone() {
        config = config.with_history_file(path);
    }
    info!(history = ?config.history_file, model = %config.model, "configuration loaded");

    let store = HistoryStore::new(config.history_file.clone());

    match &cli_args.command {
        Command::Generate { query, diet } => {
            let client = RecipeClient::new(&config);
            let progress_callback = |message: &str| println!("{}", message);
            match generate_recipe(&store, &client, query, *diet, progress_callback).await {
                GenerationOutcome::Generated(text) => {
                    println!("\n### 🧾 Here's your recipe!\n");
                    println!("{}", text);
                }
                GenerationOutcome::Rejected(message) | GenerationOutcome::Failed(message) => {
                    eprintln!("{}", message);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::History { export, .. } => {
            let query = cli_args.command.history_query().unwrap_or_default();
            let view = browse_history(&store, &query)?;
            print_history(&view);

            if let Some(dir) = export {
                let path = export_to_dir(&view.records, dir)
                    .with_context(|| format!("Failed to export filtered history into {:?}", dir))?;
                println!("\n📥 Filtered history written to {}", path.display());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
