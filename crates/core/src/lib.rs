//! Core of the middleman ticket service.
//!
//! The chat platform and transcript storage are collaborators behind the
//! [`ChatPlatform`] and [`TranscriptPublisher`] traits; everything else, the
//! ticket lifecycle, authorization, membership, transcripts and the calc
//! command, lives here.

pub mod auth;
pub mod calc;
pub mod config;
pub mod dispatch;
pub mod lifecycle;
pub mod metrics;
pub mod platform;
pub mod state;
pub mod testing;
pub mod ticket;
pub mod transcript;

pub use auth::{create_policy, StaffPolicy};
pub use calc::{CalcError, RateLimitedEvaluator};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use dispatch::{Dispatcher, InboundAction, Outcome, Reply};
pub use lifecycle::{LifecycleController, SetupReport, Transition, TranscriptTrigger};
pub use platform::{ActorId, ChannelId, ChatPlatform, PlatformError};
pub use state::StateStore;
pub use ticket::{ServiceRequest, Ticket, TicketError, TicketState, TicketType};
pub use transcript::{
    FsTranscriptPublisher, PublishedTranscript, TranscriptError, TranscriptPublisher,
    TranscriptRecord,
};
