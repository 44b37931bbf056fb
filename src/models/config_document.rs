// Configuration document model
// The single persisted document: banners, roles and server metadata.

use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};

use crate::utils::config::DEFAULT_VOTES_REQUIRED;

/// One of the three banner image slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, poise::ChoiceParameter)]
pub enum BannerKind {
    #[name = "Session Start"]
    SessionStart,
    #[name = "Session Shutdown"]
    SessionShutdown,
    #[name = "Session Vote"]
    SessionVote,
}

impl BannerKind {
    pub const ALL: [BannerKind; 3] = [
        BannerKind::SessionStart,
        BannerKind::SessionShutdown,
        BannerKind::SessionVote,
    ];

    /// Key used in the stored document and in select-menu values
    pub fn key(&self) -> &'static str {
        match self {
            BannerKind::SessionStart => "sessionStart",
            BannerKind::SessionShutdown => "sessionShutdown",
            BannerKind::SessionVote => "sessionVote",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BannerKind::SessionStart => "Start",
            BannerKind::SessionShutdown => "Shutdown",
            BannerKind::SessionVote => "Vote",
        }
    }

    /// Filename keyword used by bulk capture
    pub fn keyword(&self) -> &'static str {
        match self {
            BannerKind::SessionStart => "start",
            BannerKind::SessionShutdown => "shutdown",
            BannerKind::SessionVote => "vote",
        }
    }
}

/// Banner image references; an empty string means "not set"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Banners {
    pub session_start: String,
    pub session_shutdown: String,
    pub session_vote: String,
}

impl Banners {
    pub fn get(&self, kind: BannerKind) -> Option<&str> {
        let url = match kind {
            BannerKind::SessionStart => &self.session_start,
            BannerKind::SessionShutdown => &self.session_shutdown,
            BannerKind::SessionVote => &self.session_vote,
        };
        if url.is_empty() {
            None
        } else {
            Some(url.as_str())
        }
    }

    pub fn set(&mut self, kind: BannerKind, url: impl Into<String>) {
        let slot = match kind {
            BannerKind::SessionStart => &mut self.session_start,
            BannerKind::SessionShutdown => &mut self.session_shutdown,
            BannerKind::SessionVote => &mut self.session_vote,
        };
        *slot = url.into();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Roles {
    /// Role allowed to start and stop sessions
    pub can_start_session: Option<serenity::RoleId>,
    /// Role mentioned in start announcements
    pub ping_on_start: Option<serenity::RoleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerInfo {
    pub server_name: String,
    pub owner_username: String,
    pub join_code: String,
    pub votes_required: u32,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            server_name: String::new(),
            owner_username: String::new(),
            join_code: String::new(),
            votes_required: DEFAULT_VOTES_REQUIRED,
        }
    }
}

/// Whole-deployment configuration. Every group may be absent while the bot
/// is only partially configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banners: Option<Banners>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Roles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_info: Option<ServerInfo>,
}

impl ConfigDocument {
    pub fn banner(&self, kind: BannerKind) -> Option<&str> {
        self.banners.as_ref().and_then(|b| b.get(kind))
    }

    pub fn start_role(&self) -> Option<serenity::RoleId> {
        self.roles.as_ref().and_then(|r| r.can_start_session)
    }

    pub fn ping_role(&self) -> Option<serenity::RoleId> {
        self.roles.as_ref().and_then(|r| r.ping_on_start)
    }

    pub fn votes_required(&self) -> u32 {
        self.server_info
            .as_ref()
            .map(|s| s.votes_required)
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_VOTES_REQUIRED)
    }

    pub fn roles_mut(&mut self) -> &mut Roles {
        self.roles.get_or_insert_with(Roles::default)
    }

    pub fn banners_mut(&mut self) -> &mut Banners {
        self.banners.get_or_insert_with(Banners::default)
    }
}
