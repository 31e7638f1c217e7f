use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{RosterEntry, TierSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskTier {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
            RiskTier::Unknown => "Unknown",
        }
    }

    /// Styling token handed to the UI layer.
    pub fn presentation_token(&self) -> &'static str {
        match self {
            RiskTier::Low => "badge-risk-low",
            RiskTier::Medium => "badge-risk-medium",
            RiskTier::High => "badge-risk-high",
            RiskTier::Unknown => "bg-secondary",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower bounds (inclusive) of the Medium and High tiers.
///
/// Defaults need domain review: High starting at 4.0 on a 0-5 scale is unusual.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 4.0,
            medium: 2.5,
        }
    }
}

impl RiskThresholds {
    pub fn classify(&self, gpa: f64) -> RiskTier {
        match gpa {
            g if g.is_nan() => RiskTier::Unknown,
            g if g >= self.high => RiskTier::High,
            g if g >= self.medium => RiskTier::Medium,
            _ => RiskTier::Low,
        }
    }

    pub fn classify_text(&self, gpa: &str) -> RiskTier {
        match gpa.trim().parse::<f64>() {
            Ok(value) => self.classify(value),
            Err(_) => RiskTier::Unknown,
        }
    }
}

pub fn parse_filter(value: &str) -> Option<Option<RiskTier>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "all" => Some(None),
        "low" => Some(Some(RiskTier::Low)),
        "medium" => Some(Some(RiskTier::Medium)),
        "high" => Some(Some(RiskTier::High)),
        "unknown" => Some(Some(RiskTier::Unknown)),
        _ => None,
    }
}

pub fn filter_roster<'a>(
    thresholds: &RiskThresholds,
    roster: &'a [RosterEntry],
    tier: Option<RiskTier>,
) -> Vec<(&'a RosterEntry, RiskTier)> {
    roster
        .iter()
        .map(|entry| (entry, thresholds.classify_text(&entry.predicted_gpa)))
        .filter(|(_, found)| tier.map_or(true, |wanted| wanted == *found))
        .collect()
}

/// Rows the advisor export keeps: everything not classified Low.
pub fn at_risk<'a>(
    thresholds: &RiskThresholds,
    roster: &'a [RosterEntry],
) -> Vec<(&'a RosterEntry, RiskTier)> {
    roster
        .iter()
        .map(|entry| (entry, thresholds.classify_text(&entry.predicted_gpa)))
        .filter(|(_, tier)| *tier != RiskTier::Low)
        .collect()
}

pub fn summarize_by_tier(thresholds: &RiskThresholds, roster: &[RosterEntry]) -> Vec<TierSummary> {
    let mut map: HashMap<RiskTier, (usize, f64)> = HashMap::new();

    for entry in roster {
        let tier = thresholds.classify_text(&entry.predicted_gpa);
        let slot = map.entry(tier).or_insert((0, 0.0));
        slot.0 += 1;
        if let Ok(gpa) = entry.predicted_gpa.trim().parse::<f64>() {
            if !gpa.is_nan() {
                slot.1 += gpa;
            }
        }
    }

    let mut summaries: Vec<TierSummary> = map
        .into_iter()
        .map(|(tier, (count, total))| TierSummary {
            tier,
            count,
            avg_gpa: if count == 0 || tier == RiskTier::Unknown {
                0.0
            } else {
                total / count as f64
            },
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then(a.tier.label().cmp(b.tier.label())));
    summaries
}
