//! CLI command implementations.

mod account;
mod analytics;
mod export;
mod favorites;
mod generate;
mod history;
mod scan;
mod templates;

pub use account::register;
pub use analytics::analytics;
pub use export::export;
pub use favorites::{favorites, FavoritesAction};
pub use generate::{generate, GenerateArgs};
pub use history::{history, HistoryAction};
pub use scan::scan;
pub use templates::templates;
