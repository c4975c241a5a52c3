use crate::diet::Diet;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Phrases that switch the request to the multi-course thali template.
pub const THALI_TRIGGERS: [&str; 4] = ["south indian", "north indian", "thali", "full meal"];

pub fn is_thali_request(query: &str) -> bool {
    let lowered = query.to_lowercase();
    THALI_TRIGGERS.iter().any(|trigger| lowered.contains(trigger))
}

/// Builds the user message sent to the model for `query` under `diet`.
pub fn build_prompt(query: &str, diet: Diet) -> String {
    if is_thali_request(query) {
        thali_prompt(query)
    } else {
        general_prompt(query, diet)
    }
}

fn thali_prompt(query: &str) -> String {
    format!(
        "
You are a professional Indian chef. Create a full Indian thali for this request: \"{query}\"

Include:
- Starter
- 2 Main dishes (e.g., rice, chapati, curry)
- 2 Side dishes (e.g., dal, sabzi, sambar, rasam)
- 1 Chutney or pickle
- 1 Dessert
- Short description of each item
- 🍎 Ingredients
- 🍳 Cooking Instructions
- 🔢 Nutritional Information
- 💡 Serving Suggestions

Only suggest authentic regional dishes relevant to the type of thali (South or North Indian).
"
    )
}

fn general_prompt(query: &str, diet: Diet) -> String {
    let diet_label = match diet {
        Diet::None => "general",
        other => other.label(),
    };
    format!(
        "
You are a professional chef and dietician. Generate a recipe for: {query}
Diet type: {diet_label}

Include:
- 🍎 Ingredients
- 🍳 Cooking instructions
- 🔢 Nutritional info
- 💡 Serving tips
"
    )
}
