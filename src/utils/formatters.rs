// Formatting utilities

use poise::serenity_prelude as serenity;

/// Comma-separated user mentions, or "None"
pub fn mention_list(users: &[serenity::UserId]) -> String {
    if users.is_empty() {
        "None".to_string()
    } else {
        users
            .iter()
            .map(|id| format!("<@{}>", id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Role mention, or "Not set"
pub fn role_or_unset(role: Option<serenity::RoleId>) -> String {
    role.map(|id| format!("<@&{}>", id))
        .unwrap_or_else(|| "Not set".to_string())
}

/// Embed field values may not be empty
pub fn or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "Not set".to_string()
    } else {
        value.to_string()
    }
}
