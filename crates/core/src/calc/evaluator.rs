use std::sync::Arc;

use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use super::{evaluate_expression, CalcError};
use crate::metrics;
use crate::platform::ActorId;
use crate::state::StateStore;

/// Evaluates calc expressions on behalf of actors, one cooldown per actor.
pub struct RateLimitedEvaluator {
    state: Arc<StateStore>,
    window: Duration,
}

impl RateLimitedEvaluator {
    pub fn new(state: Arc<StateStore>, window: Duration) -> Self {
        Self { state, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Evaluate `expression` for `actor` as of `now`.
    pub async fn evaluate(
        &self,
        actor: ActorId,
        expression: &str,
        now: Instant,
    ) -> Result<f64, CalcError> {
        let result = self
            .state
            .cooldowns()
            .run(actor, now, self.window, || evaluate_expression(expression))
            .await;

        match &result {
            Ok(value) => {
                debug!(actor_id = %actor, value, "Calc evaluated");
                metrics::CALC_EVALUATIONS.with_label_values(&["ok"]).inc();
            }
            Err(e) => {
                if let CalcError::InvalidExpression(reason) = e {
                    info!(actor_id = %actor, reason = %reason, "Calc rejected expression");
                }
                metrics::CALC_EVALUATIONS
                    .with_label_values(&[e.result_label()])
                    .inc();
            }
        }

        result
    }

    /// Evaluate against the current instant.
    pub async fn evaluate_now(&self, actor: ActorId, expression: &str) -> Result<f64, CalcError> {
        self.evaluate(actor, expression, Instant::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> RateLimitedEvaluator {
        RateLimitedEvaluator::new(Arc::new(StateStore::new()), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_cooldown_window_round_trip() {
        let calc = evaluator();
        let actor = ActorId(42);
        let t = Instant::now();

        assert_eq!(calc.evaluate(actor, "1 + 1", t).await.unwrap(), 2.0);

        for offset in [1, 15, 29] {
            let err = calc
                .evaluate(actor, "1 + 1", t + Duration::from_secs(offset))
                .await
                .unwrap_err();
            assert!(matches!(err, CalcError::CooldownActive { .. }));
        }
        let err = calc
            .evaluate(actor, "1 + 1", t + Duration::from_millis(29_999))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CalcError::CooldownActive {
                remaining: Duration::from_millis(1)
            }
        );

        assert_eq!(
            calc.evaluate(actor, "2 * 3", t + Duration::from_secs(30))
                .await
                .unwrap(),
            6.0
        );
    }

    #[tokio::test]
    async fn test_invalid_expression_leaves_actor_free() {
        let calc = evaluator();
        let actor = ActorId(42);
        let t = Instant::now();

        let err = calc.evaluate(actor, "1 / 0", t).await.unwrap_err();
        assert!(matches!(err, CalcError::InvalidExpression(_)));

        assert_eq!(calc.evaluate(actor, "9 // 2", t).await.unwrap(), 4.0);
    }

    #[tokio::test]
    async fn test_cooldown_checked_before_parsing() {
        let calc = evaluator();
        let actor = ActorId(7);
        let t = Instant::now();

        calc.evaluate(actor, "1", t).await.unwrap();
        let err = calc
            .evaluate(actor, "not valid", t + Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CalcError::CooldownActive { .. }));
    }
}
