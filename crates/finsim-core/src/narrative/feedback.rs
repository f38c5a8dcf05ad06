use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::engine::model::YearState;
use crate::narrative::prompt::FeedbackRequest;

/// Shown in place of feedback the service failed to produce.
pub const FALLBACK_FEEDBACK: &str =
    "Feedback could not be generated right now. Your results have been computed and are shown above.";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("Feedback service unavailable: {0}")]
    Unavailable(String),

    #[error("Feedback service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Feedback service returned no text")]
    EmptyResponse,
}

/// An external writer of prose feedback, typically a language model behind
/// an HTTP endpoint. Slow, fallible, and never on the path of the numbers.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, request: &FeedbackRequest) -> Result<String, NarrativeError>;
}

/// Always answers with the same text. Useful offline and in tests.
#[derive(Debug, Clone)]
pub struct StaticNarrator {
    text: String,
}

impl StaticNarrator {
    pub fn new(text: impl Into<String>) -> Self {
        StaticNarrator { text: text.into() }
    }
}

#[async_trait]
impl NarrativeGenerator for StaticNarrator {
    async fn generate(&self, _request: &FeedbackRequest) -> Result<String, NarrativeError> {
        Ok(self.text.clone())
    }
}

/// Ask for feedback, bounded by `timeout`. Blank answers count as failures.
pub async fn try_feedback(
    generator: &dyn NarrativeGenerator,
    request: &FeedbackRequest,
    timeout: Duration,
) -> Result<String, NarrativeError> {
    let text = tokio::time::timeout(timeout, generator.generate(request))
        .await
        .map_err(|_| NarrativeError::Timeout(timeout))??;

    if text.trim().is_empty() {
        return Err(NarrativeError::EmptyResponse);
    }
    Ok(text)
}

/// Like [`try_feedback`], but any failure becomes [`FALLBACK_FEEDBACK`].
pub async fn request_feedback(
    generator: &dyn NarrativeGenerator,
    request: &FeedbackRequest,
    timeout: Duration,
) -> String {
    match try_feedback(generator, request, timeout).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "using fallback feedback");
            FALLBACK_FEEDBACK.to_string()
        }
    }
}

pub async fn annual_feedback(
    generator: &dyn NarrativeGenerator,
    state: &YearState,
    timeout: Duration,
) -> String {
    request_feedback(generator, &FeedbackRequest::annual(state), timeout).await
}

pub async fn final_feedback(
    generator: &dyn NarrativeGenerator,
    history: &[YearState],
    timeout: Duration,
) -> String {
    request_feedback(generator, &FeedbackRequest::final_report(history), timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::YearInput;
    use crate::engine::year::simulate_years;
    use crate::narrative::prompt::FinalMetrics;
    use crate::params::SimulationParameters;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct Failing;

    #[async_trait]
    impl NarrativeGenerator for Failing {
        async fn generate(&self, _request: &FeedbackRequest) -> Result<String, NarrativeError> {
            Err(NarrativeError::Unavailable("connection refused".into()))
        }
    }

    struct Slow;

    #[async_trait]
    impl NarrativeGenerator for Slow {
        async fn generate(&self, _request: &FeedbackRequest) -> Result<String, NarrativeError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".into())
        }
    }

    /// Records every request it receives.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<FeedbackRequest>>,
    }

    #[async_trait]
    impl NarrativeGenerator for Recording {
        async fn generate(&self, request: &FeedbackRequest) -> Result<String, NarrativeError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok("Noted.".into())
        }
    }

    fn history() -> Vec<YearState> {
        let input = YearInput {
            units_sold: dec!(1000),
            unit_price: dec!(20),
            unit_variable_cost: dec!(10),
            fixed_costs: dec!(5000),
            new_investment: dec!(0),
            new_loans: dec!(0),
            new_equity: dec!(0),
            collection_days: dec!(30),
            payment_days: dec!(30),
        };
        simulate_years(&[input.clone(), input], &SimulationParameters::default()).unwrap()
    }

    fn request() -> FeedbackRequest {
        FeedbackRequest::Final(FinalMetrics {
            summary: "Year 1: revenue 100".into(),
        })
    }

    #[tokio::test]
    async fn test_static_narrator_passes_text_through() {
        let text = request_feedback(&StaticNarrator::new("Well done."), &request(), DEFAULT_TIMEOUT)
            .await;
        assert_eq!(text, "Well done.");
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let text = request_feedback(&Failing, &request(), DEFAULT_TIMEOUT).await;
        assert_eq!(text, FALLBACK_FEEDBACK);
    }

    #[tokio::test]
    async fn test_blank_answer_is_empty_response() {
        let err = try_feedback(&StaticNarrator::new("  \n"), &request(), DEFAULT_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, NarrativeError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let timeout = Duration::from_millis(20);
        let err = try_feedback(&Slow, &request(), timeout).await.unwrap_err();
        assert!(matches!(err, NarrativeError::Timeout(_)));

        let text = request_feedback(&Slow, &request(), timeout).await;
        assert_eq!(text, FALLBACK_FEEDBACK);
    }

    #[tokio::test]
    async fn test_annual_feedback_sends_the_year_metrics() {
        let history = history();
        let narrator = Recording::default();

        let text = annual_feedback(&narrator, &history[1], DEFAULT_TIMEOUT).await;
        assert_eq!(text, "Noted.");

        let seen = narrator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        match &seen[0] {
            FeedbackRequest::Annual(m) => assert_eq!(m.year, 2),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_annual_feedback_falls_back_on_failure() {
        let text = annual_feedback(&Failing, &history()[0], DEFAULT_TIMEOUT).await;
        assert_eq!(text, FALLBACK_FEEDBACK);
    }

    #[tokio::test]
    async fn test_final_feedback_sends_the_whole_trajectory() {
        let narrator = Recording::default();

        let text = final_feedback(&narrator, &history(), DEFAULT_TIMEOUT).await;
        assert_eq!(text, "Noted.");

        let seen = narrator.seen.lock().unwrap();
        match &seen[0] {
            FeedbackRequest::Final(m) => assert_eq!(m.summary.lines().count(), 2),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_final_feedback_falls_back_on_timeout() {
        let text = final_feedback(&Slow, &history(), Duration::from_millis(20)).await;
        assert_eq!(text, FALLBACK_FEEDBACK);
    }
}
