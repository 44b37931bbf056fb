// Slash commands and the interaction handlers they own
pub mod config;
pub mod confirm;
pub mod help;
pub mod session;
pub mod setup;
pub mod wizard_ui;
