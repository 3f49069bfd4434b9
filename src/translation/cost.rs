/*!
 * Advisory cost estimate for an augmentation run.
 *
 * The numbers are rough per-word averages; the estimate is shown before the
 * user confirms and never blocks a run.
 */

use crate::app_config::ModelPricing;

/// Prompt tokens spent per batch on instructions and the JSON schema
pub const BATCH_OVERHEAD_TOKENS: u64 = 150;
pub const INPUT_TOKENS_PER_WORD: u64 = 5;
/// A sentence, its translation and the JSON keys
pub const OUTPUT_TOKENS_PER_WORD: u64 = 60;

/// Estimated size and price of an augmentation run
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    pub words: usize,
    pub batches: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// None when no price is known for the model
    pub cost_usd: Option<f64>,
}

impl CostEstimate {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Human readable price
    pub fn display_cost(&self) -> String {
        match self.cost_usd {
            None => "unknown".to_string(),
            Some(cost) if cost <= 0.0 => "free".to_string(),
            Some(cost) if cost < 0.01 => "< $0.01".to_string(),
            Some(cost) => format!("${:.2}", cost),
        }
    }
}

/// Estimate tokens and price for augmenting `words` words in batches of `batch_size`
pub fn estimate_cost(words: usize, batch_size: usize, pricing: Option<&ModelPricing>) -> CostEstimate {
    let batches = if batch_size == 0 { 0 } else { words.div_ceil(batch_size) };

    let input_tokens = batches as u64 * BATCH_OVERHEAD_TOKENS + words as u64 * INPUT_TOKENS_PER_WORD;
    let output_tokens = words as u64 * OUTPUT_TOKENS_PER_WORD;

    let cost_usd = pricing.map(|pricing| {
        input_tokens as f64 / 1_000_000.0 * pricing.input_per_million
            + output_tokens as f64 / 1_000_000.0 * pricing.output_per_million
    });

    CostEstimate {
        words,
        batches,
        input_tokens,
        output_tokens,
        cost_usd,
    }
}
