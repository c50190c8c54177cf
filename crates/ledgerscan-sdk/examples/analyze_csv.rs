//! Command-line analysis of a transaction CSV
//!
//! This example demonstrates:
//! - Building an Analyzer from environment credentials
//! - Loading a CSV file and printing the dataset summary
//! - Scoring the top candidates and printing the ranked results
//!
//! Usage: `cargo run -p ledgerscan-sdk --example analyze_csv -- transactions.csv`
//!
//! Uses Gemini when `GEMINI_API_KEY` is set, otherwise the mock provider.

use ledgerscan_sdk::{AnalyzeOutcome, Analyzer, LLMConfig, LLMProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerscan_sdk=info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: analyze_csv <file.csv>"))?;

    let llm = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => LLMConfig::new(LLMProvider::Gemini).with_api_key(key),
        _ => {
            println!("GEMINI_API_KEY not set, using the mock provider\n");
            LLMConfig::new(LLMProvider::Mock)
        }
    };

    let analyzer = Analyzer::builder().with_llm(llm).build();

    let snapshot = analyzer.load_csv_file(&path).await?;
    if let Some(summary) = &snapshot.summary {
        println!("=== {} ===", path);
        println!("  Rows:        {}", summary.total_rows);
        println!("  Processed:   {}", summary.processed);
        println!("  Skipped:     {}", summary.skipped);
        println!("  Total:       {:.2}", summary.total_amount);
        println!("  Candidates:  {}", summary.candidate_count);
        println!("  Top categories:");
        for category in &summary.top_categories {
            println!(
                "    {:<20} {:>14.2} ({} rows, avg {:.2})",
                category.activity_code, category.total_amount, category.count, category.average
            );
        }
        println!();
    }

    match analyzer.analyze().await? {
        AnalyzeOutcome::Scored { results } => {
            println!("Flagged transactions:");
            for record in results {
                println!(
                    "  #{:<6} {:.2}  {} / {}  {:.2} (x{:.1})  {}",
                    record.id(),
                    record.fraud_score,
                    record.record.business_area,
                    record.record.activity_code,
                    record.record.amount,
                    record.record.deviation_ratio,
                    record.reason
                );
            }
        }
        AnalyzeOutcome::NothingSuspicious => println!("Nothing suspicious found."),
        AnalyzeOutcome::Superseded => println!("Analysis superseded."),
    }

    Ok(())
}
