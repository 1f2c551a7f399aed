//! X12 claim pipeline binary.
//!
//! Reads X12 documents from a directory, runs parsing and reconciliation,
//! and writes the per-document summaries plus the aggregate revenue-risk
//! report to stdout as JSON.

use chrono::NaiveDate;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use x12_pipeline::{process_directory, ProcessedDocument};
use x12_reconcile::{ClaimLedger, ReconcileConfig, ReconciliationReport};

const DEFAULT_DATA_PATH: &str = "./data";

#[derive(Serialize)]
struct PipelineOutput {
    documents: Vec<ProcessedDocument>,
    report: ReconciliationReport,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Get data path from env or use default
    let data_path =
        std::env::var("X12_DATA_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());

    let mut config = ReconcileConfig::default();
    if let Ok(days) = std::env::var("X12_STUCK_AFTER_DAYS") {
        config.stuck_after_days = days.parse()?;
    }
    if let Ok(days) = std::env::var("X12_LOOKBACK_DAYS") {
        config.lookback_days = Some(days.parse()?);
    }

    // Report date from env (YYYY-MM-DD), falling back to today.
    let as_of = match std::env::var("X12_AS_OF") {
        Ok(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")?,
        Err(_) => chrono::Local::now().date_naive(),
    };

    tracing::info!("Processing X12 documents from: {}", data_path);

    let ledger = ClaimLedger::new(config);
    let documents = process_directory(&data_path, &ledger)?;

    tracing::info!(
        "Processed {} documents covering {} claims",
        documents.len(),
        ledger.claim_count()
    );

    let report = ledger.report(as_of);

    tracing::info!(
        "Report: {} alerts, {:.2} revenue at risk, rejection rate {:.2}",
        report.alerts.len(),
        report.revenue_at_risk,
        report.rejection_rate
    );

    let output = PipelineOutput { documents, report };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
