//! Token usage and cost estimate.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// USD per million input tokens.
pub const COST_PER_1M_INPUT_TOKENS: f64 = 0.80;
/// USD per million output tokens.
pub const COST_PER_1M_OUTPUT_TOKENS: f64 = 4.00;

/// Tokens consumed by provider calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Estimated cost in USD.
    pub fn estimated_cost_usd(&self) -> f64 {
        self.input_tokens as f64 / 1_000_000.0 * COST_PER_1M_INPUT_TOKENS
            + self.output_tokens as f64 / 1_000_000.0 * COST_PER_1M_OUTPUT_TOKENS
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_estimate() {
        let usage = TokenUsage {
            input_tokens: 1_000_000,
            output_tokens: 500_000,
        };
        assert!((usage.estimated_cost_usd() - 2.80).abs() < 1e-9);
        assert_eq!(usage.total(), 1_500_000);
    }
}
