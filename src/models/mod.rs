pub mod catalog;
pub mod history;
pub mod scheduled_change;
pub mod settings;
pub mod sweep;
