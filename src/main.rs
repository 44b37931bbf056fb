// Session Bot
// A Discord bot for community game sessions: setup wizard, announcements and session votes

mod commands;
mod error;
mod features;
mod models;
mod utils;

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::features::config_store::ConfigStore;
use crate::features::vote_tracker::{DashMapRegistry, TokioScheduler, VoteTracker};
use crate::utils::config::Settings;

/// User data shared across all commands and interaction handlers
pub struct Data {
    pub config_store: Arc<ConfigStore>,
    pub votes: Arc<VoteTracker>,
}

// Manual Debug impl since the storage backends are trait objects
impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("config_store", &"ConfigStore")
            .field("votes", &"VoteTracker")
            .finish()
    }
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Register all slash commands
fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        commands::setup::setup(),
        commands::config::config(),
        commands::session::session(),
        commands::confirm::confirm(),
        commands::help::help(),
    ]
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                "Error in command `{}`: {:?}",
                ctx.command().qualified_name,
                error
            );
            let reply = poise::CreateReply::default()
                .content("Something went wrong while running that command.")
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Could not report command error: {:?}", e);
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!("Event handler failed on {:?}: {:?}", event.snake_case_name(), error);
        }
        err => {
            if let Err(e) = poise::builtins::on_error(err).await {
                error!("Framework error: {:?}", e);
            }
        }
    }
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::InteractionCreate { interaction } = event {
        features::router::handle_interaction(ctx, interaction, data).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&settings.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Session Bot...");

    let config_store = Arc::new(ConfigStore::from_path(&settings.config_path));
    if let Err(e) = config_store.try_load() {
        warn!("Configuration document is not usable yet: {}", e);
    }

    let (scheduler, fired) = TokioScheduler::new();
    let votes = Arc::new(VoteTracker::new(DashMapRegistry::default(), scheduler));

    // Setup framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: get_commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready as {}! Registering commands...", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully!");

                tokio::spawn(commands::session::run_expiry_worker(
                    ctx.http.clone(),
                    votes.clone(),
                    fired,
                ));

                Ok(Data {
                    config_store,
                    votes,
                })
            })
        })
        .build();

    // MESSAGE_CONTENT and GUILD_MEMBERS are privileged, enable them in the Discord Dev Portal
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(&settings.discord_token, intents)
        .framework(framework)
        .await?;

    // Run with graceful shutdown
    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to register Ctrl+C handler: {:?}", e);
            return;
        }
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    info!("Goodbye!");
    Ok(())
}
