// Event router
// Classifies component and modal interactions by custom id and hands them to the
// owning handler. Slash commands are dispatched by poise itself.

use poise::serenity_prelude as serenity;
use tracing::{debug, error};

use crate::commands::wizard_ui::private_notice;
use crate::commands::{config, session, setup};
use crate::error::BotError;
use crate::features::wizard::{RoleTarget, WizardFlow};
use crate::utils::ids;
use crate::Data;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SetupBannersNext,
    SetupBannersSkip,
    SetupRolesNext,
    RoleSelect(RoleTarget),
    ServerInfo(WizardFlow),
    ConfigSectionSelect,
    ConfigBannerSelect,
    GotoConfig,
    RerunSetup,
    CastVote,
}

impl Route {
    pub fn classify(custom_id: &str) -> Option<Route> {
        let route = match custom_id {
            ids::SETUP_BANNERS_NEXT => Route::SetupBannersNext,
            ids::SETUP_BANNERS_SKIP => Route::SetupBannersSkip,
            ids::SETUP_ROLES_NEXT => Route::SetupRolesNext,
            ids::SETUP_ROLE_START | ids::CONFIG_ROLE_START => {
                Route::RoleSelect(RoleTarget::CanStartSession)
            }
            ids::SETUP_ROLE_PING | ids::CONFIG_ROLE_PING => {
                Route::RoleSelect(RoleTarget::PingOnStart)
            }
            ids::SETUP_SERVER_INFO => Route::ServerInfo(WizardFlow::Setup),
            ids::CONFIG_SERVER_INFO => Route::ServerInfo(WizardFlow::Reconfigure),
            ids::CONFIG_SECTION_SELECT => Route::ConfigSectionSelect,
            ids::CONFIG_BANNER_SELECT => Route::ConfigBannerSelect,
            ids::SETUP_GOTO_CONFIG => Route::GotoConfig,
            ids::SETUP_RERUN => Route::RerunSetup,
            ids::SESSION_VOTE_BUTTON => Route::CastVote,
            _ => return None,
        };
        Some(route)
    }

    /// Modal routes never arrive as component clicks and vice versa
    pub fn is_modal(&self) -> bool {
        matches!(self, Route::ServerInfo(_))
    }
}

async fn route_component(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
    route: Route,
) -> Result<(), BotError> {
    match route {
        Route::SetupBannersNext => setup::handle_banners_next(ctx, component, data).await,
        Route::SetupBannersSkip => setup::handle_banners_skip(ctx, component, data).await,
        Route::SetupRolesNext => setup::handle_roles_next(ctx, component, data).await,
        Route::RoleSelect(target) => setup::handle_role_select(ctx, component, data, target).await,
        Route::ConfigSectionSelect => config::handle_section_select(ctx, component, data).await,
        Route::ConfigBannerSelect => config::handle_banner_select(ctx, component).await,
        Route::GotoConfig => setup::handle_goto_config(ctx, component).await,
        Route::RerunSetup => setup::handle_rerun(ctx, component).await,
        Route::CastVote => session::handle_vote_button(ctx, component, &data.votes).await,
        Route::ServerInfo(_) => Ok(()),
    }
}

fn log_failure(custom_id: &str, user: serenity::UserId, e: &BotError) {
    match e {
        BotError::ValidationFailed(_) | BotError::Unauthorized | BotError::StaleVoteSession => {
            debug!("Interaction {} by {} rejected: {}", custom_id, user, e)
        }
        _ => error!("Interaction {} by {} failed: {:?}", custom_id, user, e),
    }
}

/// Entry point for every `InteractionCreate` event
pub async fn handle_interaction(
    ctx: &serenity::Context,
    interaction: &serenity::Interaction,
    data: &Data,
) -> Result<(), BotError> {
    match interaction {
        serenity::Interaction::Component(component) => {
            let custom_id = component.data.custom_id.as_str();
            let Some(route) = Route::classify(custom_id).filter(|r| !r.is_modal()) else {
                debug!("Ignoring component {}", custom_id);
                return Ok(());
            };
            if let Err(e) = route_component(ctx, component, data, route).await {
                log_failure(custom_id, component.user.id, &e);
                // An already-acknowledged interaction rejects a second response
                if let Err(notice_err) = component
                    .create_response(ctx, private_notice(e.user_message()))
                    .await
                {
                    debug!("Could not send failure notice: {:?}", notice_err);
                }
            }
        }
        serenity::Interaction::Modal(modal) => {
            let custom_id = modal.data.custom_id.as_str();
            let Some(Route::ServerInfo(flow)) = Route::classify(custom_id) else {
                debug!("Ignoring modal {}", custom_id);
                return Ok(());
            };
            if let Err(e) = setup::handle_server_info(ctx, modal, data, flow).await {
                log_failure(custom_id, modal.user.id, &e);
                if let Err(notice_err) = modal
                    .create_response(ctx, private_notice(e.user_message()))
                    .await
                {
                    debug!("Could not send failure notice: {:?}", notice_err);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_and_config_role_selectors_share_handlers() {
        assert_eq!(
            Route::classify(ids::SETUP_ROLE_START),
            Some(Route::RoleSelect(RoleTarget::CanStartSession))
        );
        assert_eq!(
            Route::classify(ids::CONFIG_ROLE_START),
            Some(Route::RoleSelect(RoleTarget::CanStartSession))
        );
        assert_eq!(
            Route::classify(ids::CONFIG_ROLE_PING),
            Some(Route::RoleSelect(RoleTarget::PingOnStart))
        );
    }

    #[test]
    fn test_server_info_flow_from_modal_id() {
        assert_eq!(
            Route::classify("setup_server_info"),
            Some(Route::ServerInfo(WizardFlow::Setup))
        );
        assert_eq!(
            Route::classify("config_server_info"),
            Some(Route::ServerInfo(WizardFlow::Reconfigure))
        );
        assert!(Route::ServerInfo(WizardFlow::Setup).is_modal());
        assert!(!Route::CastVote.is_modal());
    }

    #[test]
    fn test_wizard_and_vote_buttons() {
        assert_eq!(Route::classify("setup_banners_next"), Some(Route::SetupBannersNext));
        assert_eq!(Route::classify("setup_banners_skip"), Some(Route::SetupBannersSkip));
        assert_eq!(Route::classify("rerun_setup"), Some(Route::RerunSetup));
        assert_eq!(Route::classify("session_vote_btn"), Some(Route::CastVote));
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        assert_eq!(Route::classify(""), None);
        assert_eq!(Route::classify("quiz_select"), None);
        assert_eq!(Route::classify("setup_banners_next_extra"), None);
    }
}
