//! Custom ids for every interactive component and modal the bot sends.
//! The router classifies incoming events by these strings only.

// Setup wizard
pub const SETUP_BANNERS_NEXT: &str = "setup_banners_next";
pub const SETUP_BANNERS_SKIP: &str = "setup_banners_skip";
pub const SETUP_ROLE_START: &str = "setup_role_start";
pub const SETUP_ROLE_PING: &str = "setup_role_ping";
pub const SETUP_ROLES_NEXT: &str = "setup_roles_next";
pub const SETUP_SERVER_INFO: &str = "setup_server_info";
pub const SETUP_GOTO_CONFIG: &str = "goto_config";
pub const SETUP_RERUN: &str = "rerun_setup";

// Reconfiguration
pub const CONFIG_SECTION_SELECT: &str = "config_section_select";
pub const CONFIG_BANNER_SELECT: &str = "config_banner_select";
pub const CONFIG_ROLE_START: &str = "config_role_start";
pub const CONFIG_ROLE_PING: &str = "config_role_ping";
pub const CONFIG_SERVER_INFO: &str = "config_server_info";

// Section picker values
pub const SECTION_GRAPHICS: &str = "graphics";
pub const SECTION_ROLES: &str = "roles";
pub const SECTION_SERVER: &str = "server";

// Server info form fields
pub const FIELD_SERVER_NAME: &str = "server_name";
pub const FIELD_OWNER_USERNAME: &str = "owner_username";
pub const FIELD_JOIN_CODE: &str = "join_code";
pub const FIELD_VOTES_REQUIRED: &str = "votes_required";

// Sessions
pub const SESSION_VOTE_BUTTON: &str = "session_vote_btn";
