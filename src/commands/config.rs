// Config command - targeted reconfiguration of one section

use poise::serenity_prelude as serenity;
use poise::ChoiceParameter;

use crate::commands::wizard_ui::{self, private_notice};
use crate::error::BotError;
use crate::features::wizard::{ConfigSection, WizardFlow};
use crate::models::config_document::BannerKind;
use crate::{Context, Data, Error};

/// Reconfigure the session bot settings
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn config(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content("Select a section to reconfigure:")
            .components(vec![wizard_ui::section_picker()])
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

fn selected_value(component: &serenity::ComponentInteraction) -> Option<&str> {
    match &component.data.kind {
        serenity::ComponentInteractionDataKind::StringSelect { values } => {
            values.first().map(String::as_str)
        }
        _ => None,
    }
}

/// Jump straight to one section
pub async fn handle_section_select(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), BotError> {
    let section = selected_value(component)
        .and_then(ConfigSection::from_value)
        .ok_or_else(|| BotError::ValidationFailed("Unknown configuration section.".to_string()))?;

    let response = match section {
        ConfigSection::Graphics => serenity::CreateInteractionResponse::Message(
            serenity::CreateInteractionResponseMessage::new()
                .content("Select which banner you want to update:")
                .components(vec![wizard_ui::banner_picker()])
                .ephemeral(true),
        ),
        ConfigSection::Roles => {
            let doc = data.config_store.load();
            let (content, components) = wizard_ui::roles_prompt(WizardFlow::Reconfigure, &doc);
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .components(components)
                    .ephemeral(true),
            )
        }
        ConfigSection::Server => {
            let doc = data.config_store.load();
            serenity::CreateInteractionResponse::Modal(wizard_ui::server_info_modal(
                WizardFlow::Reconfigure,
                &doc,
            ))
        }
    };

    component.create_response(ctx, response).await?;
    Ok(())
}

/// Banner chosen: explain the upload-then-confirm flow
pub async fn handle_banner_select(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
) -> Result<(), BotError> {
    let kind = selected_value(component)
        .and_then(BannerKind::from_key)
        .ok_or_else(|| BotError::ValidationFailed("Unknown banner type.".to_string()))?;

    let content = format!(
        "Please upload a new image for the **{}** banner as an attachment in this channel. \
        After uploading, run `/confirm banner` with type **{}** to save it.",
        kind.label(),
        kind.name(),
    );
    component.create_response(ctx, private_notice(content)).await?;
    Ok(())
}
