//! IPC module for host UI to daemon communication

mod protocol;
mod server;

pub use protocol::{DaemonStatus, Request, Response, MAX_FRAME_LEN};
pub use server::{read_frame, write_frame, Server, ServerState};
