use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::diet::{Diet, DietSelector};
use crate::history::HistoryQuery;

#[derive(Parser, Debug)]
#[command(author, version, about = "AI-powered recipe creator with a searchable query history", long_about = None)]
pub struct Cli {
    /// History CSV file (overrides RECIPE_BOT_HISTORY)
    #[arg(long, global = true)]
    pub history_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a recipe for a free-text request
    Generate {
        /// What you want a recipe for, e.g. "South Indian full meal"
        #[arg(short, long)]
        query: String,

        /// None, Vegan, Keto, Low Carb, Diabetic or High Protein
        #[arg(short, long, default_value = "None")]
        diet: Diet,
    },
    /// Browse and filter past requests, newest first
    History {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// "All" or one diet label
        #[arg(short, long, default_value = "All")]
        diet: DietSelector,

        /// Case-insensitive text the query must contain
        #[arg(short, long)]
        keyword: Option<String>,

        /// Directory to write filtered_recipe_history.csv into
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

impl Command {
    /// Filter predicates for the `history` subcommand.
    pub fn history_query(&self) -> Option<HistoryQuery> {
        match self {
            Command::History {
                start,
                end,
                diet,
                keyword,
                ..
            } => Some(HistoryQuery {
                start_date: *start,
                end_date: *end,
                diet: *diet,
                keyword: keyword.clone(),
            }),
            Command::Generate { .. } => None,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
