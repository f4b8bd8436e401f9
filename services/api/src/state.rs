//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources like the session controller and service clients.

use crate::config::Config;
use quizdrill_core::{session::SessionController, synthesis::SynthesisClient};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub synthesis: Arc<dyn SynthesisClient>,
    pub config: Arc<Config>,
}
