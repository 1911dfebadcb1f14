//! Transcript generation: capture, render, publish.

mod error;
mod generator;
mod publisher;
mod render;
mod types;

pub use error::TranscriptError;
pub use generator::TranscriptGenerator;
pub use publisher::{
    numbered_filename, FsTranscriptPublisher, PublishedTranscript, TranscriptPublisher,
    MAX_NAME_ATTEMPTS,
};
pub use render::{escape_html, render_html};
pub use types::{transcript_filename, TranscriptEntry, TranscriptRecord, FILENAME_TIMESTAMP_FORMAT};
