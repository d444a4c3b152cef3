//! IPC module for the manual control surface

mod protocol;
mod server;

pub use protocol::{read_message, send_message, DaemonStatus, DeviceStatus, Request, Response};
pub use server::Server;
