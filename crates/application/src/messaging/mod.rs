pub mod command_listener;

pub use command_listener::{BridgeCommand, CommandListener, parse_command};
