//! WebSocket Server
//!
//! Every WebSocket connection is one session. Clients send shell commands and
//! receive the resolved view after every state change.

mod handler;
mod protocol;
mod router;
mod state;

pub use handler::*;
pub use protocol::*;
pub use router::*;
pub use state::*;
