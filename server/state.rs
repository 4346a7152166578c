use std::sync::Arc;

use ferrite_digits::{InferenceSession, Recognizer, RecognizerConfig, Result};

/// Immutable per-process server state. The only lazily created piece, the
/// inference session, lives in `InferenceSession::global`.
pub struct ServerState {
    pub config: RecognizerConfig,
}

impl ServerState {
    pub fn new(config: RecognizerConfig) -> Self {
        ServerState { config }
    }

    /// The shared session, loading the configured model on first use.
    pub fn session(&self) -> Result<&'static InferenceSession> {
        InferenceSession::global(&self.config.model_path)
    }

    /// A recognizer bound to the shared session and configured constants.
    pub fn recognizer(&self) -> Result<Recognizer<'static>> {
        let session = self.session()?;
        Ok(Recognizer::new(session).with_normalization(self.config.normalization))
    }

    pub fn allow_origin(&self) -> &str {
        &self.config.server.allow_origin
    }
}

/// Shared state type: an `Arc<ServerState>` passed to every handler.
pub type SharedState = Arc<ServerState>;
