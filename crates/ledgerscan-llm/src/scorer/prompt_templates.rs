//! Prompt templates for fraud scoring

/// Prompt template for scoring candidate transactions.
///
/// `{candidates}` is replaced with the JSON array of candidates.
pub const FRAUD_SCORING_PROMPT: &str = r#"You are reviewing financial transactions that a statistical pass flagged as unusual for their activity category.

Each candidate has:
- id: identifier that must be echoed back unchanged
- businessArea: organisational unit that booked the transaction
- activityCode: spending category
- amount: transaction amount
- categoryAverageAmount: average amount for the same activityCode across the whole file
- deviationRatio: amount divided by categoryAverageAmount

Candidates:
{candidates}

Requirements:
1. Only report candidates you consider genuinely risky; omit the rest
2. fraudScore is a number between 0 and 1 (1 = almost certainly fraudulent)
3. reason is one short sentence explaining the risk
4. Respond with JSON only, no markdown code blocks, no explanations
5. Use this shape: [{"id": <number>, "fraudScore": <number>, "reason": "<text>"}]
6. If a JSON object is required, wrap the array as {"results": [...]}
7. If nothing is risky, respond with []
"#;

/// System message for fraud scoring
pub const SYSTEM_MESSAGE: &str = "You are a forensic accountant. You answer with strict JSON and never invent ids that were not provided.";
