// Help command - show usage guide

use poise::serenity_prelude as serenity;
use crate::{Context, Error};
use crate::utils::config::{colors, VOTE_DURATION};

/// Show help and usage guide
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let doc = ctx.data().config_store.load();

    let embed = serenity::CreateEmbed::new()
        .title("Session Bot - Help")
        .description("Announces game sessions and runs session votes for your community")
        .color(colors::PRIMARY)
        .field(
            "Setup",
            "`/setup` - Step-by-step setup: banners, roles, server info\n\
            `/config` - Change a single section at any time\n\
            `/confirm banner` - Save your latest uploaded image as a banner",
            false,
        )
        .field(
            "Sessions",
            "`/session start` - Announce a session start\n\
            `/session stop` - Announce a session shutdown\n\
            Both require the configured start role.",
            false,
        )
        .field(
            "Votes",
            format!(
                "`/session vote` - Open a {}-minute vote. {} votes are currently needed.",
                VOTE_DURATION.as_secs() / 60,
                doc.votes_required()
            ),
            false,
        )
        .footer(serenity::CreateEmbedFooter::new(
            "Built with Serenity & Poise",
        ));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true)).await?;

    Ok(())
}
