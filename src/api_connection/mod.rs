pub mod connection;
pub mod endpoints;

pub use connection::{GenerationError, RecipeClient, RecipeText};
