//! WebSocket infrastructure for the client task channel.
//!
//! Provides connection management, heartbeat monitoring, the HTTP
//! upgrade handler, and the task intake loop.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::{handle_task_message, ws_handler};
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
