use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dietary preference attached to every generation request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Diet {
    #[default]
    None,
    Vegan,
    Keto,
    #[serde(rename = "Low Carb")]
    LowCarb,
    Diabetic,
    #[serde(rename = "High Protein")]
    HighProtein,
}

impl Diet {
    pub const ALL: [Diet; 6] = [
        Diet::None,
        Diet::Vegan,
        Diet::Keto,
        Diet::LowCarb,
        Diet::Diabetic,
        Diet::HighProtein,
    ];

    /// Label as stored in the history file and shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Diet::None => "None",
            Diet::Vegan => "Vegan",
            Diet::Keto => "Keto",
            Diet::LowCarb => "Low Carb",
            Diet::Diabetic => "Diabetic",
            Diet::HighProtein => "High Protein",
        }
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

fn normalize(input: &str) -> String {
    input
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl FromStr for Diet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Diet::ALL
            .into_iter()
            .find(|diet| diet.label().to_lowercase() == wanted)
            .ok_or_else(|| {
                let labels: Vec<&str> = Diet::ALL.iter().map(|d| d.label()).collect();
                format!("unknown diet '{}', expected one of: {}", s, labels.join(", "))
            })
    }
}

/// Diet predicate for the history view: `All` disables the diet filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DietSelector {
    #[default]
    All,
    Only(Diet),
}

pub const ALL_DIETS_LABEL: &str = "All";

impl DietSelector {
    pub fn matches(self, diet: Diet) -> bool {
        match self {
            DietSelector::All => true,
            DietSelector::Only(wanted) => wanted == diet,
        }
    }
}

impl FromStr for DietSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_DIETS_LABEL) {
            return Ok(DietSelector::All);
        }
        s.parse::<Diet>().map(DietSelector::Only)
    }
}
