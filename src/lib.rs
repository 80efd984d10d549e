//! Quill: client for a multi-agent content generation service
//!
//! Drives streamed generation sessions over WebSocket, keeps a bounded local
//! history of results and wraps the backend's REST endpoints for discovery,
//! health and publishing.

pub mod backend;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod publish;
pub mod session;
pub mod types;
