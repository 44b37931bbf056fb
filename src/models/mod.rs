pub mod config_document;
pub mod vote;
