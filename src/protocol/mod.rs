mod command;
mod list;
mod passive;
mod reply;

pub use self::{
    command::Command,
    list::{parse_list, DirEntry, EntryKind},
    passive::parse_passive,
    reply::Reply,
};

pub const DATA_CONNECTION_OPEN: u16 = 125;
pub const OPENING_DATA_CONNECTION: u16 = 150;
pub const COMMAND_OK: u16 = 200;
pub const COMMAND_SUPERFLUOUS: u16 = 202;
pub const FILE_STATUS: u16 = 213;
pub const SERVICE_READY: u16 = 220;
pub const CLOSING_CONTROL: u16 = 221;
pub const CLOSING_DATA: u16 = 226;
pub const PASSIVE_MODE: u16 = 227;
pub const LOGGED_IN: u16 = 230;
pub const FILE_ACTION_OK: u16 = 250;
pub const NEED_PASSWORD: u16 = 331;

/// Codes that announce an incoming transfer on the data connection
pub const TRANSFER_STARTING: &[u16] = &[DATA_CONNECTION_OPEN, OPENING_DATA_CONNECTION];

/// Codes that close a successful transfer
pub const TRANSFER_COMPLETE: &[u16] = &[CLOSING_DATA, FILE_ACTION_OK];
