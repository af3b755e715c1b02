//! IDRAK Dashboard Shell Server
//!
//! Headless view-state shell for the IDRAK facility dashboard. Each WebSocket
//! client gets its own session; sessions share the facility catalog and a
//! persisted store that carries the emergency mode between them.

pub mod catalog;
pub mod config;
pub mod server;
pub mod session;
pub mod shell;
pub mod simulation;
pub mod storage;
