//! IDRAK Types - Core type definitions for the facility dashboard
//!
//! This crate contains the pure data structures shared by the dashboard shell,
//! the facility catalog and the WebSocket protocol. Every public type derives
//! `TS` so the browser client can import generated bindings.

mod drills;
mod emergency;
mod facility;
mod navigation;

pub use drills::*;
pub use emergency::*;
pub use facility::*;
pub use navigation::*;
