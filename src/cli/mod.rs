pub mod history;
pub mod import;
pub mod pin;
pub mod price;
pub mod settings;
pub mod sweep;
pub mod ui;
