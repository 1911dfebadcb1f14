//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ticket lifecycle (creations, lifecycle actions, permission denials)
//! - Transcripts (generation and publication)
//! - The calc command

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Ticket Lifecycle Metrics
// =============================================================================

/// Tickets created by tier.
pub static TICKETS_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("middleman_tickets_created_total", "Total tickets created"),
        &["ticket_type"],
    )
    .unwrap()
});

/// Ticket creations rejected before a channel was provisioned.
pub static TICKET_CREATIONS_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "middleman_ticket_creations_rejected_total",
            "Ticket creation attempts that were rejected",
        ),
        &["reason"], // "configuration", "invalid_selection", "tip_required", "unresolved_counterparty", "platform"
    )
    .unwrap()
});

/// Lifecycle actions by action and result.
pub static LIFECYCLE_ACTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "middleman_lifecycle_actions_total",
            "Total ticket lifecycle actions",
        ),
        &["action", "result"], // result: "ok", "unchanged", "denied", "error"
    )
    .unwrap()
});

/// Authorization denials.
pub static PERMISSION_DENIALS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "middleman_permission_denials_total",
        "Lifecycle requests denied for lack of permission",
    )
    .unwrap()
});

// =============================================================================
// Transcript Metrics
// =============================================================================

/// Transcripts by result.
pub static TRANSCRIPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("middleman_transcripts_total", "Total transcripts generated"),
        &["result"], // "published", "read_failed", "write_failed"
    )
    .unwrap()
});

/// Messages per generated transcript.
pub static TRANSCRIPT_MESSAGES: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "middleman_transcript_messages",
            "Number of messages captured per transcript",
        )
        .buckets(vec![0.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]),
    )
    .unwrap()
});

// =============================================================================
// Calc Metrics
// =============================================================================

/// Calc evaluations by result.
pub static CALC_EVALUATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("middleman_calc_evaluations_total", "Total calc evaluations"),
        &["result"], // "ok", "cooldown", "invalid"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Lifecycle
        Box::new(TICKETS_CREATED.clone()),
        Box::new(TICKET_CREATIONS_REJECTED.clone()),
        Box::new(LIFECYCLE_ACTIONS.clone()),
        Box::new(PERMISSION_DENIALS.clone()),
        // Transcripts
        Box::new(TRANSCRIPTS.clone()),
        Box::new(TRANSCRIPT_MESSAGES.clone()),
        // Calc
        Box::new(CALC_EVALUATIONS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        TICKETS_CREATED.with_label_values(&["trial_middleman"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"middleman_tickets_created_total".to_string()));
        assert!(names.contains(&"middleman_transcript_messages".to_string()));
    }

    #[test]
    fn test_transcript_messages_observed_without_labels() {
        let before = TRANSCRIPT_MESSAGES.get_sample_count();
        TRANSCRIPT_MESSAGES.observe(12.0);
        assert!(TRANSCRIPT_MESSAGES.get_sample_count() > before);
    }
}
