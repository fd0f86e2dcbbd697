//! Per-model token pricing.
//!
//! Prices are USD per million tokens. Models missing from the table have no
//! known price and their responses carry `cost: None`.

use rag_turn::TokenUsage;
use rust_decimal::Decimal;

/// Price of a model's input and output tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    /// USD per million prompt tokens.
    pub input_per_million: Decimal,
    /// USD per million completion tokens.
    pub output_per_million: Decimal,
}

impl Pricing {
    /// A price from per-million input and output rates.
    pub const fn new(input_per_million: Decimal, output_per_million: Decimal) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    /// Cost of one call with the given usage.
    pub fn cost(&self, usage: &TokenUsage) -> Decimal {
        let million = Decimal::from(1_000_000u32);
        (Decimal::from(usage.input_tokens) * self.input_per_million
            + Decimal::from(usage.output_tokens) * self.output_per_million)
            / million
    }
}

/// Built-in price for a model, if known.
///
/// Provider prefixes such as `groq/` or `openai/` are ignored.
pub fn lookup(model: &str) -> Option<Pricing> {
    let bare = model.rsplit('/').next().unwrap_or(model);
    let (input, output) = match bare {
        "llama-3.3-70b-versatile" => ((59, 2), (79, 2)),
        "llama-3.1-8b-instant" => ((5, 2), (8, 2)),
        "gemma2-9b-it" => ((20, 2), (20, 2)),
        "gpt-4o" => ((250, 2), (1000, 2)),
        "gpt-4o-mini" => ((15, 2), (60, 2)),
        "gpt-3.5-turbo" => ((50, 2), (150, 2)),
        _ => return None,
    };
    Some(Pricing::new(
        Decimal::new(input.0, input.1),
        Decimal::new(output.0, output.1),
    ))
}
