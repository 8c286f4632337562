//! Spending guard for billed route matrix elements.

use crate::error::GmapsError;

/// Price of one route matrix element in US dollars.
pub const DOLLARS_PER_ELEMENT: f64 = 0.005;

/// Asks a human whether to go ahead.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Requires confirmation before an expensive fetch.
#[derive(Debug, Clone, Copy)]
pub struct CostGate {
    pub dollars_per_element: f64,
    /// Estimates at or above this amount need confirmation.
    pub confirm_threshold_dollars: f64,
}

impl Default for CostGate {
    fn default() -> Self {
        Self::with_threshold(1.0)
    }
}

impl CostGate {
    #[must_use]
    pub fn with_threshold(confirm_threshold_dollars: f64) -> Self {
        Self {
            dollars_per_element: DOLLARS_PER_ELEMENT,
            confirm_threshold_dollars,
        }
    }

    /// Estimated cost in dollars of querying `pairs` elements.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate(&self, pairs: usize) -> f64 {
        pairs as f64 * self.dollars_per_element
    }

    /// Lets the fetch proceed, asking `confirm` first when the estimate
    /// reaches the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`GmapsError::UserAborted`] if confirmation is declined.
    pub fn check(&self, pairs: usize, confirm: &impl Confirm) -> Result<(), GmapsError> {
        let dollars = self.estimate(pairs);
        if dollars < self.confirm_threshold_dollars {
            tracing::debug!(pairs, dollars, "route matrix cost below confirmation threshold");
            return Ok(());
        }

        let prompt = format!("Querying {pairs} routes will cost about ${dollars:.2}. Continue?");
        if confirm.confirm(&prompt) {
            tracing::info!(pairs, dollars, "route matrix cost confirmed");
            Ok(())
        } else {
            Err(GmapsError::UserAborted { pairs, dollars })
        }
    }
}
