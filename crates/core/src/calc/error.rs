use std::time::Duration;

use thiserror::Error;

/// Calc command failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalcError {
    #[error("Please wait {:.1} seconds before using this command again.", remaining.as_secs_f64())]
    CooldownActive { remaining: Duration },

    /// The reason is kept for logs; the actor only sees the short form.
    #[error("Invalid expression.")]
    InvalidExpression(String),
}

impl CalcError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        CalcError::InvalidExpression(reason.into())
    }

    pub fn result_label(&self) -> &'static str {
        match self {
            CalcError::CooldownActive { .. } => "cooldown",
            CalcError::InvalidExpression(_) => "invalid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_message_rounds_to_tenths() {
        let err = CalcError::CooldownActive {
            remaining: Duration::from_millis(12_340),
        };
        assert_eq!(
            err.to_string(),
            "Please wait 12.3 seconds before using this command again."
        );
    }

    #[test]
    fn test_invalid_hides_reason() {
        let err = CalcError::invalid("unknown function 'open'");
        assert_eq!(err.to_string(), "Invalid expression.");
        assert_eq!(err.result_label(), "invalid");
    }
}
