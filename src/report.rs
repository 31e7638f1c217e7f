use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{FeatureRecord, PredictionResult, PredictionSource, RosterEntry, StudentSession};
use crate::risk::{self, RiskThresholds};

pub fn build_report(
    session: &StudentSession,
    features: &FeatureRecord,
    result: &PredictionResult,
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Predicted GPA Report");
    let _ = writeln!(
        output,
        "Generated for {} at {}",
        session.label(),
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Result");
    let _ = writeln!(output, "- Predicted GPA: {:.2}", result.gpa);
    let _ = writeln!(
        output,
        "- Risk: {} ({})",
        result.risk,
        result.risk.presentation_token()
    );
    let source = match result.source {
        PredictionSource::Remote => "scoring service",
        PredictionSource::Fallback => "local fallback estimate",
    };
    let _ = writeln!(output, "- Source: {source}");

    let _ = writeln!(output);
    let _ = writeln!(output, "## Suggestions");
    for suggestion in &result.suggestions {
        let _ = writeln!(output, "- {suggestion}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Predictors");
    let _ = writeln!(output, "{}", key_predictors(features));

    output
}

/// One-line summary of the inputs that drive the fallback estimate.
pub fn key_predictors(features: &FeatureRecord) -> String {
    format!(
        "Age {}; Study {}h/day; WAEC avg {:.1}",
        features.age, features.study_hours_per_day, features.waec_average
    )
}

/// Writes the advisor export: every roster row not classified Low.
///
/// Returns how many rows were written.
pub fn write_at_risk_csv<W: std::io::Write>(
    writer: W,
    thresholds: &RiskThresholds,
    roster: &[RosterEntry],
) -> anyhow::Result<usize> {
    let rows = risk::at_risk(thresholds, roster);
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(writer);

    csv_writer.write_record(["Student ID", "Predicted GPA", "Risk", "Key Predictors"])?;
    for (entry, tier) in &rows {
        let gpa = match entry.predicted_gpa.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => format!("{value:.2}"),
            _ => entry.predicted_gpa.clone(),
        };
        csv_writer.write_record([
            entry.student_id.as_str(),
            gpa.as_str(),
            tier.label(),
            entry.key_predictors.as_str(),
        ])?;
    }
    csv_writer.flush()?;

    Ok(rows.len())
}

pub fn read_roster<R: std::io::Read>(reader: R) -> anyhow::Result<Vec<RosterEntry>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut roster = Vec::new();
    for row in reader.deserialize::<RosterEntry>() {
        roster.push(row?);
    }
    Ok(roster)
}
