// Confirm command - save a freshly uploaded banner for one slot

use poise::serenity_prelude as serenity;
use tracing::debug;

use crate::commands::setup::recent_history;
use crate::error::BotError;
use crate::features::wizard;
use crate::models::config_document::BannerKind;
use crate::utils::config::colors;
use crate::{Context, Error};

/// Confirm and save a new banner image
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands("banner"),
    subcommand_required
)]
pub async fn confirm(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Confirm a new banner image
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn banner(
    ctx: Context<'_>,
    #[description = "Which banner to update"]
    #[rename = "type"]
    kind: BannerKind,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let history = recent_history(ctx.serenity_context(), ctx.channel_id()).await?;
    let confirmed =
        wizard::confirm_banner(&ctx.data().config_store, kind, &history, ctx.author().id);
    let url = match confirmed {
        Ok(url) => url,
        Err(e @ BotError::ValidationFailed(_)) => {
            debug!("Banner confirmation by {} failed: {}", ctx.author().id, e);
            ctx.send(
                poise::CreateReply::default()
                    .content(e.user_message())
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let embed = serenity::CreateEmbed::new()
        .title("Banner Updated!")
        .description(format!("The **{}** banner has been updated.", kind.label()))
        .image(url)
        .color(colors::SUCCESS);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
