//! Integration tests for the Quill generation client

mod history_persistence;
mod publish_flow;
pub mod test_utils;
mod ws_session;
