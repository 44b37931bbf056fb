// Setup wizard - first-run configuration flow
// banners -> roles -> server info -> summary

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::commands::wizard_ui::{self, private_notice};
use crate::error::BotError;
use crate::features::banner_capture::ChannelMessage;
use crate::features::wizard::{self, RoleTarget, ServerInfoForm, ServerInfoOutcome, WizardFlow};
use crate::utils::config::BANNER_HISTORY_WINDOW;
use crate::{Context, Data, Error};

/// Run the initial setup wizard for the session bot
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn setup(ctx: Context<'_>) -> Result<(), Error> {
    info!("{} started the setup wizard", ctx.author().name);
    let (embed, components) = wizard_ui::banners_prompt();
    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .components(components)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Recent messages in `channel_id`, newest first
pub async fn recent_history(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
) -> Result<Vec<ChannelMessage>, BotError> {
    let messages = channel_id
        .messages(ctx, serenity::GetMessages::new().limit(BANNER_HISTORY_WINDOW))
        .await?;
    Ok(messages.iter().map(ChannelMessage::from).collect())
}

async fn advance_to_roles(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), BotError> {
    let doc = data.config_store.load();
    let (content, components) = wizard_ui::roles_prompt(WizardFlow::Setup, &doc);
    component
        .create_response(
            ctx,
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .embeds(vec![])
                    .components(components),
            ),
        )
        .await?;
    Ok(())
}

/// "Next" on step 1: bulk-capture banners from the channel
pub async fn handle_banners_next(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), BotError> {
    let history = recent_history(ctx, component.channel_id).await?;
    wizard::capture_setup_banners(&data.config_store, &history)?;
    advance_to_roles(ctx, component, data).await
}

/// "Skip" on step 1: clear banners and move on
pub async fn handle_banners_skip(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), BotError> {
    wizard::skip_setup_banners(&data.config_store)?;
    advance_to_roles(ctx, component, data).await
}

/// Either role selector, from setup or reconfiguration
pub async fn handle_role_select(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
    target: RoleTarget,
) -> Result<(), BotError> {
    let role = match &component.data.kind {
        serenity::ComponentInteractionDataKind::RoleSelect { values } => values.first().copied(),
        _ => None,
    }
    .ok_or_else(|| BotError::ValidationFailed("Please select a role.".to_string()))?;

    wizard::set_role(&data.config_store, target, role)?;

    let message = match target {
        RoleTarget::CanStartSession => "Role for who can start the session updated!",
        RoleTarget::PingOnStart => "Role to ping for session start updated!",
    };
    component.create_response(ctx, private_notice(message)).await?;
    Ok(())
}

/// "Continue" on step 2: open the server info form
pub async fn handle_roles_next(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), BotError> {
    let doc = data.config_store.load();
    let modal = wizard_ui::server_info_modal(WizardFlow::Setup, &doc);
    component
        .create_response(ctx, serenity::CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Server info form submission, from setup or reconfiguration
pub async fn handle_server_info(
    ctx: &serenity::Context,
    modal: &serenity::ModalInteraction,
    data: &Data,
    flow: WizardFlow,
) -> Result<(), BotError> {
    let fields = modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            serenity::ActionRowComponent::InputText(input) => Some((
                input.custom_id.as_str(),
                input.value.as_deref().unwrap_or_default(),
            )),
            _ => None,
        });
    let form = ServerInfoForm::from_fields(fields);

    let response = match wizard::submit_server_info(&data.config_store, flow, form)? {
        ServerInfoOutcome::ShowSummary(doc) => {
            let (embed, components) = wizard_ui::summary(&doc);
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(components)
                    .ephemeral(true),
            )
        }
        ServerInfoOutcome::Confirmed => private_notice("Server information updated!"),
    };
    modal.create_response(ctx, response).await?;
    Ok(())
}

pub async fn handle_goto_config(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
) -> Result<(), BotError> {
    component
        .create_response(ctx, private_notice("Use /config to update your settings at any time!"))
        .await?;
    Ok(())
}

/// "Re-run Setup" on the summary: back to step 1, nothing carried over
pub async fn handle_rerun(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
) -> Result<(), BotError> {
    let (embed, components) = wizard_ui::banners_prompt();
    component
        .create_response(
            ctx,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content("Re-running setup...")
                    .embed(embed)
                    .components(components)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}
