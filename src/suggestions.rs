use crate::risk::RiskThresholds;

const HIGH_TIER: [&str; 2] = [
    "Excellent performance — continue current study routines and peer mentoring.",
    "Maintain strong note-taking and time management.",
];

const MEDIUM_TIER: [&str; 2] = [
    "Moderate performance — increase focused study time and practice past papers.",
    "Attend tutorials and consider study groups.",
];

const LOW_TIER: [&str; 2] = [
    "Low performance — book an advisor meeting and consider tutoring.",
    "Improve attendance, create a study schedule and use practice problems.",
];

/// Two advisory lines for a GPA, using the risk tier boundaries.
///
/// A NaN GPA gets the low-tier advice.
pub fn suggestions_for(thresholds: &RiskThresholds, gpa: f64) -> Vec<String> {
    let lines = if gpa >= thresholds.high {
        HIGH_TIER
    } else if gpa >= thresholds.medium {
        MEDIUM_TIER
    } else {
        LOW_TIER
    };
    lines.iter().map(|line| line.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_two_lines() {
        let thresholds = RiskThresholds::default();
        for gpa in [0.0, 1.94, 2.5, 3.2, 4.0, 5.0, f64::NAN] {
            assert_eq!(suggestions_for(&thresholds, gpa).len(), 2);
        }
    }

    #[test]
    fn tier_text_follows_thresholds() {
        let thresholds = RiskThresholds::default();
        assert!(suggestions_for(&thresholds, 4.0)[0].starts_with("Excellent performance"));
        assert!(suggestions_for(&thresholds, 3.999)[0].starts_with("Moderate performance"));
        assert!(suggestions_for(&thresholds, 2.5)[0].starts_with("Moderate performance"));
        assert!(suggestions_for(&thresholds, 2.499)[0].starts_with("Low performance"));
        assert_eq!(
            suggestions_for(&thresholds, 1.0)[1],
            "Improve attendance, create a study schedule and use practice problems."
        );
    }
}
