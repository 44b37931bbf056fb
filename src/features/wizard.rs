// Wizard engine
// Step logic for the first-run setup flow and the targeted reconfiguration flow.
//
// There is no stored wizard session. Each step is a function of the live document and
// whatever was just gathered (scanned history, chosen role, submitted form), so steps can
// be re-entered in any order and any number of times.

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::error::BotError;
use crate::features::banner_capture::{self, ChannelMessage};
use crate::features::config_store::ConfigStore;
use crate::models::config_document::{BannerKind, Banners, ConfigDocument, ServerInfo};
use crate::utils::config::parse_votes_required;
use crate::utils::ids;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardFlow {
    /// Fixed sequence: banners, roles, server info, summary
    Setup,
    /// Direct jump to one section
    Reconfigure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Banners,
    Roles,
    ServerInfo,
    Summary,
}

impl WizardStep {
    pub const TOTAL: usize = 4;

    pub fn number(&self) -> usize {
        match self {
            WizardStep::Banners => 1,
            WizardStep::Roles => 2,
            WizardStep::ServerInfo => 3,
            WizardStep::Summary => 4,
        }
    }

    /// Step shown after this one in `flow`; reconfiguration never advances
    pub fn next(&self, flow: WizardFlow) -> Option<WizardStep> {
        match (flow, self) {
            (WizardFlow::Reconfigure, _) => None,
            (WizardFlow::Setup, WizardStep::Banners) => Some(WizardStep::Roles),
            (WizardFlow::Setup, WizardStep::Roles) => Some(WizardStep::ServerInfo),
            (WizardFlow::Setup, WizardStep::ServerInfo) => Some(WizardStep::Summary),
            (WizardFlow::Setup, WizardStep::Summary) => None,
        }
    }
}

/// Sections offered by the reconfiguration picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Graphics,
    Roles,
    Server,
}

impl ConfigSection {
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            ids::SECTION_GRAPHICS => Some(ConfigSection::Graphics),
            ids::SECTION_ROLES => Some(ConfigSection::Roles),
            ids::SECTION_SERVER => Some(ConfigSection::Server),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTarget {
    CanStartSession,
    PingOnStart,
}

/// Bulk banner capture for setup step 1. All three kinds are mandatory.
pub fn capture_setup_banners(
    store: &ConfigStore,
    history: &[ChannelMessage],
) -> Result<ConfigDocument, BotError> {
    let captured = banner_capture::capture_by_keyword(history);
    if !captured.is_complete() {
        let missing: Vec<&str> = captured.missing().iter().map(|k| k.keyword()).collect();
        return Err(BotError::ValidationFailed(format!(
            "Please upload all three banners (start, shutdown, vote) as images before proceeding. Missing: {}.",
            missing.join(", ")
        )));
    }

    let banners = captured.into_banners();
    let doc = store.update(|doc| doc.banners = Some(banners))?;
    info!("Setup captured all three banners");
    Ok(doc)
}

/// Setup step 1 "skip": clears every banner reference
pub fn skip_setup_banners(store: &ConfigStore) -> Result<ConfigDocument, BotError> {
    let doc = store.update(|doc| doc.banners = Some(Banners::default()))?;
    info!("Setup skipped banner upload");
    Ok(doc)
}

/// Explicit single-banner confirmation: the actor's newest image in the window
pub fn confirm_banner(
    store: &ConfigStore,
    kind: BannerKind,
    history: &[ChannelMessage],
    actor: serenity::UserId,
) -> Result<String, BotError> {
    let attachment = banner_capture::latest_image_by_author(history, actor).ok_or_else(|| {
        BotError::ValidationFailed(
            "No recent image attachment found from you in this channel. Please upload an image and try again."
                .to_string(),
        )
    })?;

    let url = attachment.url.clone();
    store.update(|doc| doc.banners_mut().set(kind, url.clone()))?;
    info!("Banner {} updated by {}", kind.key(), actor);
    Ok(url)
}

/// Role selections write immediately and independently of each other
pub fn set_role(
    store: &ConfigStore,
    target: RoleTarget,
    role: serenity::RoleId,
) -> Result<ConfigDocument, BotError> {
    let doc = store.update(|doc| {
        let roles = doc.roles_mut();
        match target {
            RoleTarget::CanStartSession => roles.can_start_session = Some(role),
            RoleTarget::PingOnStart => roles.ping_on_start = Some(role),
        }
    })?;
    info!("Role {:?} set to {}", target, role);
    Ok(doc)
}

/// Raw text of the server info form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfoForm {
    pub server_name: String,
    pub owner_username: String,
    pub join_code: String,
    pub votes_required: String,
}

impl ServerInfoForm {
    /// Build from submitted `(field id, value)` pairs; unknown ids are ignored
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = ServerInfoForm::default();
        for (id, value) in fields {
            let slot = match id {
                ids::FIELD_SERVER_NAME => &mut form.server_name,
                ids::FIELD_OWNER_USERNAME => &mut form.owner_username,
                ids::FIELD_JOIN_CODE => &mut form.join_code,
                ids::FIELD_VOTES_REQUIRED => &mut form.votes_required,
                _ => continue,
            };
            *slot = value.trim().to_string();
        }
        form
    }

    /// Prefill values from the live document
    pub fn prefill(doc: &ConfigDocument) -> Self {
        let info = doc.server_info.clone().unwrap_or_default();
        Self {
            server_name: info.server_name,
            owner_username: info.owner_username,
            join_code: info.join_code,
            votes_required: doc.votes_required().to_string(),
        }
    }

    /// Never rejects: an unparsable votes value becomes the default
    pub fn into_server_info(self) -> ServerInfo {
        ServerInfo {
            votes_required: parse_votes_required(&self.votes_required),
            server_name: self.server_name,
            owner_username: self.owner_username,
            join_code: self.join_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerInfoOutcome {
    /// Setup flow moves on to the summary of the saved document
    ShowSummary(ConfigDocument),
    /// Reconfiguration just acknowledges
    Confirmed,
}

pub fn submit_server_info(
    store: &ConfigStore,
    flow: WizardFlow,
    form: ServerInfoForm,
) -> Result<ServerInfoOutcome, BotError> {
    let info = form.into_server_info();
    let doc = store.update(|doc| doc.server_info = Some(info))?;
    info!("Server info saved ({:?} flow)", flow);

    Ok(match WizardStep::ServerInfo.next(flow) {
        Some(WizardStep::Summary) => ServerInfoOutcome::ShowSummary(doc),
        _ => ServerInfoOutcome::Confirmed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::banner_capture::AttachmentRef;
    use crate::utils::config::DEFAULT_VOTES_REQUIRED;

    fn upload(author: u64, filename: &str) -> ChannelMessage {
        ChannelMessage {
            author: serenity::UserId::new(author),
            attachments: vec![AttachmentRef {
                filename: filename.to_string(),
                url: format!("https://cdn/{}", filename),
                content_type: Some("image/png".to_string()),
            }],
        }
    }

    fn full_upload(prefix: &str) -> Vec<ChannelMessage> {
        vec![
            upload(1, &format!("{}-start.png", prefix)),
            upload(1, &format!("{}-shutdown.png", prefix)),
            upload(1, &format!("{}-vote.png", prefix)),
        ]
    }

    #[test]
    fn test_setup_sequence() {
        let flow = WizardFlow::Setup;
        assert_eq!(WizardStep::Banners.next(flow), Some(WizardStep::Roles));
        assert_eq!(WizardStep::Roles.next(flow), Some(WizardStep::ServerInfo));
        assert_eq!(WizardStep::ServerInfo.next(flow), Some(WizardStep::Summary));
        assert_eq!(WizardStep::Summary.next(flow), None);
        assert_eq!(WizardStep::ServerInfo.next(WizardFlow::Reconfigure), None);
    }

    #[test]
    fn test_incomplete_upload_does_not_advance() {
        let store = ConfigStore::in_memory();
        let history = vec![upload(1, "start.png")];
        let err = capture_setup_banners(&store, &history).unwrap_err();
        match err {
            BotError::ValidationFailed(msg) => assert!(msg.contains("shutdown, vote")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.load().banners, None);
    }

    #[test]
    fn test_rerun_after_skip_overwrites_banners() {
        let store = ConfigStore::in_memory();
        skip_setup_banners(&store).unwrap();
        assert_eq!(store.load().banner(BannerKind::SessionStart), None);

        capture_setup_banners(&store, &full_upload("new")).unwrap();
        let doc = store.load();
        assert_eq!(doc.banner(BannerKind::SessionStart), Some("https://cdn/new-start.png"));
        assert_eq!(doc.banner(BannerKind::SessionShutdown), Some("https://cdn/new-shutdown.png"));
        assert_eq!(doc.banner(BannerKind::SessionVote), Some("https://cdn/new-vote.png"));
    }

    #[test]
    fn test_skip_after_upload_clears_banners() {
        let store = ConfigStore::in_memory();
        capture_setup_banners(&store, &full_upload("old")).unwrap();
        skip_setup_banners(&store).unwrap();
        let doc = store.load();
        for kind in BannerKind::ALL {
            assert_eq!(doc.banner(kind), None);
        }
        assert_eq!(doc.banners, Some(Banners::default()));
    }

    #[test]
    fn test_role_selections_are_independent() {
        let store = ConfigStore::in_memory();
        set_role(&store, RoleTarget::PingOnStart, serenity::RoleId::new(5)).unwrap();
        let doc = store.load();
        assert_eq!(doc.ping_role(), Some(serenity::RoleId::new(5)));
        assert_eq!(doc.start_role(), None);

        set_role(&store, RoleTarget::CanStartSession, serenity::RoleId::new(6)).unwrap();
        let doc = store.load();
        assert_eq!(doc.ping_role(), Some(serenity::RoleId::new(5)));
        assert_eq!(doc.start_role(), Some(serenity::RoleId::new(6)));
    }

    #[test]
    fn test_server_info_bad_votes_defaults_and_succeeds() {
        let store = ConfigStore::in_memory();
        let form = ServerInfoForm::from_fields([
            (ids::FIELD_SERVER_NAME, "Harbor RP"),
            (ids::FIELD_OWNER_USERNAME, "captain"),
            (ids::FIELD_JOIN_CODE, "HRBR"),
            (ids::FIELD_VOTES_REQUIRED, "abc"),
        ]);
        let outcome = submit_server_info(&store, WizardFlow::Reconfigure, form).unwrap();
        assert_eq!(outcome, ServerInfoOutcome::Confirmed);

        let info = store.load().server_info.unwrap();
        assert_eq!(info.votes_required, DEFAULT_VOTES_REQUIRED);
        assert_eq!(info.server_name, "Harbor RP");
        assert_eq!(info.join_code, "HRBR");
    }

    #[test]
    fn test_setup_server_info_leads_to_summary() {
        let store = ConfigStore::in_memory();
        set_role(&store, RoleTarget::CanStartSession, serenity::RoleId::new(2)).unwrap();
        let form = ServerInfoForm {
            server_name: "Harbor".into(),
            owner_username: "captain".into(),
            join_code: "HRBR".into(),
            votes_required: "7".into(),
        };
        match submit_server_info(&store, WizardFlow::Setup, form).unwrap() {
            ServerInfoOutcome::ShowSummary(doc) => {
                assert_eq!(doc.votes_required(), 7);
                assert_eq!(doc.start_role(), Some(serenity::RoleId::new(2)));
            }
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn test_prefill_reads_live_document() {
        let store = ConfigStore::in_memory();
        assert_eq!(
            ServerInfoForm::prefill(&store.load()).votes_required,
            DEFAULT_VOTES_REQUIRED.to_string()
        );

        submit_server_info(
            &store,
            WizardFlow::Reconfigure,
            ServerInfoForm {
                server_name: "Harbor".into(),
                votes_required: "9".into(),
                ..ServerInfoForm::default()
            },
        )
        .unwrap();
        let prefill = ServerInfoForm::prefill(&store.load());
        assert_eq!(prefill.server_name, "Harbor");
        assert_eq!(prefill.votes_required, "9");
    }

    #[test]
    fn test_confirm_banner_uses_actor_upload() {
        let store = ConfigStore::in_memory();
        let history = vec![upload(2, "someone-else.png"), upload(1, "fresh.png")];
        let url = confirm_banner(
            &store,
            BannerKind::SessionShutdown,
            &history,
            serenity::UserId::new(1),
        )
        .unwrap();
        assert_eq!(url, "https://cdn/fresh.png");
        assert_eq!(store.load().banner(BannerKind::SessionShutdown), Some("https://cdn/fresh.png"));

        let err =
            confirm_banner(&store, BannerKind::SessionVote, &history, serenity::UserId::new(3));
        assert!(matches!(err, Err(BotError::ValidationFailed(_))));
    }

    #[test]
    fn test_section_values() {
        assert_eq!(ConfigSection::from_value("graphics"), Some(ConfigSection::Graphics));
        assert_eq!(ConfigSection::from_value("server"), Some(ConfigSection::Server));
        assert_eq!(ConfigSection::from_value("emoji"), None);
    }
}
