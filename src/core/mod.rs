//! Core pricing domain: types, the margin curve, and the calculator.

pub mod catalog;
pub mod error;
pub mod history;
pub mod margin;
pub mod pricing;
pub mod settings;

// Re-export main types for cleaner imports
pub use catalog::{CatalogEntry, CatalogStore, EntryKey, ImportRow};
pub use error::{EngineError, Result};
pub use history::{ChangeType, HistoryQuery, HistoryStore, PriceHistoryEntry};
pub use pricing::{PRICE_EPSILON, Quote};
pub use settings::{Commission, MarketSettings, SettingsStore};
