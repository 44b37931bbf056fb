// Core behavior, independent of how it is rendered
pub mod banner_capture;
pub mod config_store;
pub mod router;
pub mod session;
pub mod vote_tracker;
pub mod wizard;
