// Wizard UI
// Embeds, menus and forms shared by /setup and /config. Everything is prefilled from the
// live document passed in.

use poise::serenity_prelude as serenity;

use crate::features::wizard::{ServerInfoForm, WizardFlow, WizardStep};
use crate::models::config_document::{BannerKind, ConfigDocument};
use crate::utils::config::colors;
use crate::utils::formatters::{or_unset, role_or_unset};
use crate::utils::ids;

fn step_title(step: WizardStep) -> String {
    format!("Session Bot Setup: Step {}/{}", step.number(), WizardStep::TOTAL)
}

/// Setup step 1: upload banners, then Next or Skip
pub fn banners_prompt() -> (serenity::CreateEmbed, Vec<serenity::CreateActionRow>) {
    let embed = serenity::CreateEmbed::new()
        .title(step_title(WizardStep::Banners))
        .description(
            "Please upload your **Session Start Banner**, **Session Shutdown Banner**, and **Session Vote Banner** \
            as image attachments in this channel. Their file names must contain `start`, `shutdown` and `vote`.\n\n\
            When you are done, click **Next**, or **Skip** to proceed without uploading images.",
        )
        .color(colors::PRIMARY);

    let buttons = vec![
        serenity::CreateButton::new(ids::SETUP_BANNERS_NEXT)
            .label("Next")
            .style(serenity::ButtonStyle::Primary),
        serenity::CreateButton::new(ids::SETUP_BANNERS_SKIP)
            .label("Skip")
            .style(serenity::ButtonStyle::Secondary),
    ];

    (embed, vec![serenity::CreateActionRow::Buttons(buttons)])
}

/// Two independent role selectors; setup adds a Continue button
pub fn roles_prompt(
    flow: WizardFlow,
    doc: &ConfigDocument,
) -> (String, Vec<serenity::CreateActionRow>) {
    let (start_id, ping_id, content) = match flow {
        WizardFlow::Setup => (
            ids::SETUP_ROLE_START,
            ids::SETUP_ROLE_PING,
            format!(
                "**{}**\nSelect the roles for session management, then click **Continue**.",
                step_title(WizardStep::Roles)
            ),
        ),
        WizardFlow::Reconfigure => (
            ids::CONFIG_ROLE_START,
            ids::CONFIG_ROLE_PING,
            "Update the roles for session management:".to_string(),
        ),
    };

    let select_start = serenity::CreateSelectMenu::new(
        start_id,
        serenity::CreateSelectMenuKind::Role {
            default_roles: doc.start_role().map(|r| vec![r]),
        },
    )
    .placeholder("Select who can start the session");

    let select_ping = serenity::CreateSelectMenu::new(
        ping_id,
        serenity::CreateSelectMenuKind::Role {
            default_roles: doc.ping_role().map(|r| vec![r]),
        },
    )
    .placeholder("Select which role to ping for session start");

    let mut rows = vec![
        serenity::CreateActionRow::SelectMenu(select_start),
        serenity::CreateActionRow::SelectMenu(select_ping),
    ];
    if flow == WizardFlow::Setup {
        rows.push(serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(ids::SETUP_ROLES_NEXT)
                .label("Continue")
                .style(serenity::ButtonStyle::Primary),
        ]));
    }

    (content, rows)
}

fn text_input(label: &str, custom_id: &str, value: &str) -> serenity::CreateActionRow {
    let mut input =
        serenity::CreateInputText::new(serenity::InputTextStyle::Short, label, custom_id)
            .required(true);
    // Discord rejects an empty prefill
    if !value.is_empty() {
        input = input.value(value);
    }
    serenity::CreateActionRow::InputText(input)
}

/// Four-field server info form
pub fn server_info_modal(flow: WizardFlow, doc: &ConfigDocument) -> serenity::CreateModal {
    let (custom_id, title) = match flow {
        WizardFlow::Setup => (ids::SETUP_SERVER_INFO, step_title(WizardStep::ServerInfo)),
        WizardFlow::Reconfigure => {
            (ids::CONFIG_SERVER_INFO, "Update Server Information".to_string())
        }
    };
    let prefill = ServerInfoForm::prefill(doc);

    serenity::CreateModal::new(custom_id, title).components(vec![
        text_input("Server Name", ids::FIELD_SERVER_NAME, &prefill.server_name),
        text_input("Server Owner Username", ids::FIELD_OWNER_USERNAME, &prefill.owner_username),
        text_input("Join Code", ids::FIELD_JOIN_CODE, &prefill.join_code),
        text_input(
            "Votes Required to Start Session",
            ids::FIELD_VOTES_REQUIRED,
            &prefill.votes_required,
        ),
    ])
}

/// Final setup step
pub fn summary(doc: &ConfigDocument) -> (serenity::CreateEmbed, Vec<serenity::CreateActionRow>) {
    let info = doc.server_info.clone().unwrap_or_default();

    let mut embed = serenity::CreateEmbed::new()
        .title("Session Bot Setup: Success!")
        .description("Your session bot is now configured with the following settings:")
        .field("Server Name", or_unset(&info.server_name), true)
        .field("Owner Username", or_unset(&info.owner_username), true)
        .field("Join Code", or_unset(&info.join_code), true)
        .field("Votes Required", doc.votes_required().to_string(), true)
        .field("Can Start Session Role", role_or_unset(doc.start_role()), true)
        .field("Ping On Start Role", role_or_unset(doc.ping_role()), true)
        .footer(serenity::CreateEmbedFooter::new(
            "You can re-run /setup or use /config to update these settings.",
        ))
        .color(colors::SUCCESS);
    if let Some(url) = doc.banner(BannerKind::SessionStart) {
        embed = embed.image(url);
    }

    let buttons = vec![
        serenity::CreateButton::new(ids::SETUP_GOTO_CONFIG)
            .label("Go to /config")
            .style(serenity::ButtonStyle::Secondary),
        serenity::CreateButton::new(ids::SETUP_RERUN)
            .label("Re-run Setup")
            .style(serenity::ButtonStyle::Primary),
    ];

    (embed, vec![serenity::CreateActionRow::Buttons(buttons)])
}

/// Reconfiguration section picker
pub fn section_picker() -> serenity::CreateActionRow {
    let options = vec![
        serenity::CreateSelectMenuOption::new("Graphics", ids::SECTION_GRAPHICS)
            .description("Session banners"),
        serenity::CreateSelectMenuOption::new("Roles", ids::SECTION_ROLES)
            .description("Roles for session management"),
        serenity::CreateSelectMenuOption::new("Server Information", ids::SECTION_SERVER)
            .description("Server info, join code, votes"),
    ];
    serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(
            ids::CONFIG_SECTION_SELECT,
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("Select a section to configure"),
    )
}

/// Which banner to replace
pub fn banner_picker() -> serenity::CreateActionRow {
    let options = BannerKind::ALL
        .into_iter()
        .map(|kind| {
            serenity::CreateSelectMenuOption::new(
                format!("Session {} Banner", kind.label()),
                kind.key(),
            )
        })
        .collect();
    serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(
            ids::CONFIG_BANNER_SELECT,
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("Select a banner to update"),
    )
}

/// Private reply to a component or modal interaction
pub fn private_notice(content: impl Into<String>) -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::Message(
        serenity::CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
}
