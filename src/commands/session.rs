// Session command - start/stop announcements and session votes

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::commands::wizard_ui::private_notice;
use crate::error::BotError;
use crate::features::session::{self, Announcement};
use crate::features::vote_tracker::VoteTracker;
use crate::models::vote::{VoteKey, VoteTally};
use crate::utils::config::{colors, VOTE_DURATION};
use crate::utils::formatters::mention_list;
use crate::utils::ids;
use crate::{Context, Error};

/// Session management commands
#[poise::command(
    slash_command,
    guild_only,
    subcommands("start", "stop", "vote"),
    subcommand_required
)]
pub async fn session(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Role gate shared by start and stop. Sends the private notice itself.
async fn authorized(ctx: Context<'_>, action: &str) -> Result<bool, Error> {
    let doc = ctx.data().config_store.load();
    let roles = ctx
        .author_member()
        .await
        .map(|member| member.roles.clone())
        .unwrap_or_default();

    match session::authorize(&doc, &roles) {
        Ok(()) => Ok(true),
        Err(BotError::Unauthorized) => {
            warn!("{} tried to {} a session without the start role", ctx.author().id, action);
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("You do not have permission to {} a session.", action))
                    .ephemeral(true),
            )
            .await?;
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn announce(ctx: Context<'_>, announcement: Announcement) -> Result<(), Error> {
    let mut reply = poise::CreateReply::default().embed(announcement.embed());
    if let Some(content) = announcement.content {
        reply = reply.content(content);
    }
    ctx.send(reply).await?;
    Ok(())
}

/// Start a session
#[poise::command(slash_command, guild_only)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    if !authorized(ctx, "start").await? {
        return Ok(());
    }
    let doc = ctx.data().config_store.load();
    info!("Session started by {}", ctx.author().id);
    announce(ctx, session::start_announcement(&doc, ctx.author().id)).await
}

/// Stop a session
#[poise::command(slash_command, guild_only)]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    if !authorized(ctx, "stop").await? {
        return Ok(());
    }
    let doc = ctx.data().config_store.load();
    info!("Session stopped by {}", ctx.author().id);
    announce(ctx, session::shutdown_announcement(&doc)).await
}

/// Start a session vote
#[poise::command(slash_command, guild_only)]
pub async fn vote(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let doc = data.config_store.load();
    let draft = data.votes.draft(&doc, ctx.channel_id(), ctx.author().id);

    // The button is only attached once the session is registered under the message id
    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(vote_embed(&draft.tally()))
                .components(vote_controls(false)),
        )
        .await?;
    let message = match reply.message().await {
        Ok(message) => message,
        Err(e) => {
            warn!(
                "Vote by {} posted but its message could not be fetched: {:?}",
                ctx.author().id,
                e
            );
            return Err(e.into());
        }
    };

    let tally = data.votes.start(message.id, draft);
    reply
        .edit(
            ctx,
            poise::CreateReply::default()
                .embed(vote_embed(&tally))
                .components(vote_controls(true)),
        )
        .await?;
    Ok(())
}

/// The Vote button while the vote accepts votes, nothing otherwise
fn vote_controls(open: bool) -> Vec<serenity::CreateActionRow> {
    if !open {
        return vec![];
    }
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(ids::SESSION_VOTE_BUTTON)
            .label("Vote")
            .style(serenity::ButtonStyle::Success),
    ])]
}

/// Tally card; the ended form lists every voter
pub fn vote_embed(tally: &VoteTally) -> serenity::CreateEmbed {
    let description = if tally.ended {
        format!(
            "Session vote ended!\n\nVotes received: **{}**/{}\nVoters: {}",
            tally.count(),
            tally.votes_needed,
            mention_list(&tally.voters),
        )
    } else {
        let mut text = format!(
            "A session vote has been started by <@{}>!\nVote below to show us you're going to join our session!\n\n\
            Votes needed: **{}**\nTime: **{} Minutes** (ends <t:{}:R>)",
            tally.initiator,
            tally.votes_needed,
            VOTE_DURATION.as_secs() / 60,
            tally.expires_at_unix,
        );
        if !tally.voters.is_empty() {
            text.push_str(&format!(
                "\n\nVotes received: **{}**/{}\nVoters: {}",
                tally.count(),
                tally.votes_needed,
                mention_list(&tally.voters),
            ));
        }
        text
    };

    let mut embed = serenity::CreateEmbed::new()
        .title("Session Vote!")
        .description(description)
        .color(colors::SESSION_VOTE)
        .timestamp(serenity::Timestamp::now());
    if let Some(url) = &tally.banner {
        embed = embed.image(url);
    }
    embed
}

/// Vote button: add the voter and re-render the tally in place
pub async fn handle_vote_button(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    votes: &VoteTracker,
) -> Result<(), BotError> {
    let key = component.message.id;
    let gate = votes.render_gate(key);
    let _render = gate.lock().await;

    match votes.cast(key, component.user.id, Instant::now()) {
        Ok(tally) => {
            component
                .create_response(
                    ctx,
                    serenity::CreateInteractionResponse::UpdateMessage(
                        serenity::CreateInteractionResponseMessage::new()
                            .embed(vote_embed(&tally))
                            .components(vote_controls(!tally.ended)),
                    ),
                )
                .await?;
        }
        Err(e @ BotError::StaleVoteSession) => {
            component
                .create_response(ctx, private_notice(e.user_message()))
                .await?;
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Close one vote and render its final tally without controls. Platform failures
/// (e.g. the channel was deleted) are logged and swallowed.
async fn close_vote(http: Arc<serenity::Http>, votes: Arc<VoteTracker>, key: VoteKey) {
    let gate = votes.render_gate(key);
    let _render = gate.lock().await;

    let Some(tally) = votes.expire(key) else {
        return;
    };

    let edit = serenity::EditMessage::new()
        .embed(vote_embed(&tally))
        .components(vote_controls(false));
    if let Err(e) = tally.channel_id.edit_message(&*http, key, edit).await {
        warn!("Could not render the end of vote {}: {:?}", key, e);
    }
}

/// Receives fired expiry timers for the lifetime of the bot
pub async fn run_expiry_worker(
    http: Arc<serenity::Http>,
    votes: Arc<VoteTracker>,
    mut fired: mpsc::UnboundedReceiver<VoteKey>,
) {
    while let Some(key) = fired.recv().await {
        tokio::spawn(close_vote(http.clone(), votes.clone(), key));
    }
    info!("Vote expiry worker stopped");
}
