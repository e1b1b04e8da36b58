pub(crate) mod command;
pub(crate) mod options;
pub(crate) mod player_event;
pub(crate) mod player_response;
pub(crate) mod player_state;
pub(crate) mod player_status;
pub(crate) mod track_data;
