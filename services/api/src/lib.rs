//! Quizdrill API Library Crate
//!
//! This library contains all the logic for the quizdrill web service: the
//! application state, API handlers, WebSocket logic for spoken answers, and
//! routing. The `api` binary is a thin wrapper around this library.

pub mod audio;
pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod ws;
