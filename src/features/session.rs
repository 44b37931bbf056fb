// Session controller
// Role gate and announcement content for session start/stop. No "session active"
// state is tracked; starting twice just announces twice.

use poise::serenity_prelude as serenity;

use crate::error::BotError;
use crate::models::config_document::{BannerKind, ConfigDocument};
use crate::utils::config::colors;
use crate::utils::formatters::or_unset;

/// A rendered-to-be announcement card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Plain message content, used for the role ping
    pub content: Option<String>,
    pub title: String,
    pub description: String,
    pub color: u32,
    pub image: Option<String>,
}

impl Announcement {
    pub fn embed(&self) -> serenity::CreateEmbed {
        let mut embed = serenity::CreateEmbed::new()
            .title(&self.title)
            .description(&self.description)
            .color(self.color)
            .timestamp(serenity::Timestamp::now());
        if let Some(url) = &self.image {
            embed = embed.image(url);
        }
        embed
    }
}

/// Actor must hold `roles.canStartSession`. An unset role authorizes nobody.
pub fn authorize(doc: &ConfigDocument, member_roles: &[serenity::RoleId]) -> Result<(), BotError> {
    match doc.start_role() {
        Some(required) if member_roles.contains(&required) => Ok(()),
        _ => Err(BotError::Unauthorized),
    }
}

pub fn start_announcement(doc: &ConfigDocument, actor: serenity::UserId) -> Announcement {
    let info = doc.server_info.clone().unwrap_or_default();
    Announcement {
        content: doc.ping_role().map(|role| format!("<@&{}>", role)),
        title: "Session Start!".to_string(),
        description: format!(
            "A session startup has been started by <@{}>!\n\n**Server:** {}\n**Server code:** {}\n**Server owner:** {}",
            actor,
            or_unset(&info.server_name),
            or_unset(&info.join_code),
            or_unset(&info.owner_username),
        ),
        color: colors::SESSION_START,
        image: doc.banner(BannerKind::SessionStart).map(str::to_string),
    }
}

pub fn shutdown_announcement(doc: &ConfigDocument) -> Announcement {
    Announcement {
        content: None,
        title: "Session shutdown!".to_string(),
        description: "Session shutdown. You must not join the in-game server or else there will be moderation action taken against you!".to_string(),
        color: colors::SESSION_SHUTDOWN,
        image: doc.banner(BannerKind::SessionShutdown).map(str::to_string),
    }
}
