//! # cue-remote: template console host
//!
//! Drives one template from stdin hook calls and sends its commands to the
//! playout server over the configured transport.

pub mod config;
pub mod console;
pub mod templates;
