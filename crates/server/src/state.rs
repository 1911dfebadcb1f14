use std::path::{Path, PathBuf};

use middleman_core::{Config, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    transcripts_dir: PathBuf,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let transcripts_dir = config.transcripts.dir.clone();
        Self {
            config,
            transcripts_dir,
        }
    }

    /// Serve transcripts from `dir` instead of the configured directory.
    pub fn with_transcripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.transcripts_dir = dir.into();
        self
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn transcripts_dir(&self) -> &Path {
        &self.transcripts_dir
    }
}
