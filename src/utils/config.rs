// Centralized configuration for the session bot

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};

/// How long a session vote stays open
pub const VOTE_DURATION: Duration = Duration::from_secs(5 * 60);

/// Used when `votesRequired` is missing or not a positive integer
pub const DEFAULT_VOTES_REQUIRED: u32 = 5;

/// Number of recent channel messages scanned for banner uploads
pub const BANNER_HISTORY_WINDOW: u8 = 20;

pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Discord embed colors
pub mod colors {
    pub const PRIMARY: u32 = 0x5865f2;
    pub const SESSION_START: u32 = 0x57f287;
    pub const SESSION_SHUTDOWN: u32 = 0xed4245;
    pub const SESSION_VOTE: u32 = 0xfee75c;
    pub const SUCCESS: u32 = 0x2ecc71;
}

/// Process settings read from the environment (after `.env` is loaded)
#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub config_path: PathBuf,
    pub log_filter: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let discord_token = env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;
        Ok(Self {
            discord_token,
            config_path: env::var("CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
            log_filter: env::var("RUST_LOG").unwrap_or_else(|_| "session_bot=info".into()),
        })
    }
}

/// Parse the free-text votes field by its leading integer ("7 votes" is 7, "1.5" is 1).
/// No leading digits, zero, a negative number or overflow fall back to the default.
pub fn parse_votes_required(input: &str) -> u32 {
    let text = input.trim_start();
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    match unsigned[..digits_end].parse::<u32>() {
        Ok(votes) if votes > 0 && !negative => votes,
        _ => DEFAULT_VOTES_REQUIRED,
    }
}
