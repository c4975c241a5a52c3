use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::api_connection::{GenerationError, RecipeClient, RecipeText};
use crate::diet::Diet;
use crate::history::{self, HistoryQuery, HistoryStore, QueryRecord};
use crate::prompt_builder::{build_prompt, is_thali_request};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter what you want a recipe for.";

#[derive(Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(RecipeText),
    /// Nothing was sent; the input was not usable.
    Rejected(String),
    Failed(String),
}

fn failure_message(err: &GenerationError) -> String {
    format!("❌ {}", err)
}

/// Runs one "Generate Recipe" action: records the request, then asks the model.
/// `progress_updater` is called once the request passed validation, right before the network call.
pub async fn generate_recipe(
    store: &HistoryStore,
    client: &RecipeClient,
    query: &str,
    diet: Diet,
    progress_updater: impl Fn(&str),
) -> GenerationOutcome {
    if query.is_empty() {
        return GenerationOutcome::Rejected(EMPTY_QUERY_MESSAGE.to_string());
    }
    if !client.has_credentials() {
        return GenerationOutcome::Failed(failure_message(&GenerationError::MissingCredentials));
    }

    let record = QueryRecord::now(query, diet);
    if let Err(e) = store.append(&record) {
        warn!("could not save query to history: {:#}", e);
    }

    let prompt = build_prompt(query, diet);
    info!(thali = is_thali_request(query), diet = %diet, "generating recipe");
    progress_updater("Cooking up something delicious... 🍳");

    match client.generate(&prompt).await {
        Ok(text) => GenerationOutcome::Generated(text),
        Err(e) => {
            error!(error = %e, "recipe generation failed");
            GenerationOutcome::Failed(failure_message(&e))
        }
    }
}

/// Filtered history plus the facts the user needs to refine the filter.
#[derive(Debug, Clone)]
pub struct HistoryView {
    pub records: Vec<QueryRecord>,
    pub total: usize,
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
    pub diet_options: Vec<String>,
}

impl HistoryView {
    pub fn is_empty_store(&self) -> bool {
        self.total == 0
    }
}

pub fn browse_history(store: &HistoryStore, query: &HistoryQuery) -> Result<HistoryView> {
    let all = store
        .load_all()
        .with_context(|| format!("Failed to load history from {:?}", store.path()))?;
    let records = history::filter(&all, query);
    info!(total = all.len(), matched = records.len(), "history filtered");
    Ok(HistoryView {
        total: all.len(),
        date_bounds: history::date_bounds(&all),
        diet_options: history::diet_options(&all),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::diet::DietSelector;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_empty_query_is_rejected_without_record() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        let config = AppConfig {
            api_key: Some("sk-test".to_string()),
            ..AppConfig::default()
        };
        let client = RecipeClient::new(&config);

        let progress = std::cell::Cell::new(0);
        let outcome = generate_recipe(&store, &client, "", Diet::Vegan, |_| {
            progress.set(progress.get() + 1)
        })
        .await;
        assert_eq!(
            outcome,
            GenerationOutcome::Rejected(EMPTY_QUERY_MESSAGE.to_string())
        );
        assert!(!store.path().exists());
        assert_eq!(progress.get(), 0);
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_record() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        let client = RecipeClient::new(&AppConfig::default());

        let progress = std::cell::Cell::new(0);
        let outcome = generate_recipe(&store, &client, "keto bread", Diet::Keto, |_| {
            progress.set(progress.get() + 1)
        })
        .await;
        match outcome {
            GenerationOutcome::Failed(message) => assert!(message.contains("API Key not found")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!store.path().exists());
        assert_eq!(progress.get(), 0);
    }

    #[test]
    fn test_browse_empty_history() -> Result<()> {
        let dir = tempdir()?;
        let store = HistoryStore::new(dir.path().join("history.csv"));
        let view = browse_history(&store, &HistoryQuery::default())?;
        assert!(view.is_empty_store());
        assert!(view.records.is_empty());
        assert_eq!(view.date_bounds, None);
        assert_eq!(view.diet_options, vec!["All".to_string()]);
        Ok(())
    }

    #[test]
    fn test_browse_filters_and_reports_totals() -> Result<()> {
        let dir = tempdir()?;
        let store = HistoryStore::new(dir.path().join("history.csv"));
        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        };
        store.append(&QueryRecord::new(day(1), "vegan breakfast", Diet::Vegan))?;
        store.append(&QueryRecord::new(day(2), "keto lunch", Diet::Keto))?;
        store.append(&QueryRecord::new(day(3), "vegan dinner", Diet::Vegan))?;

        let view = browse_history(
            &store,
            &HistoryQuery {
                diet: DietSelector::Only(Diet::Vegan),
                ..Default::default()
            },
        )?;
        assert_eq!(view.total, 3);
        let queries: Vec<&str> = view.records.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["vegan dinner", "vegan breakfast"]);
        assert_eq!(
            view.date_bounds,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
            ))
        );
        assert_eq!(view.diet_options, vec!["All", "Keto", "Vegan"]);
        Ok(())
    }
}
