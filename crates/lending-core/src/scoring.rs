//! Credit score bands and the score transition applied on payment events.
//!
//! Bands use inclusive lower bounds; the highest matching band wins:
//!
//! | Score     | Band       |
//! |-----------|------------|
//! | >= 800    | Excellent  |
//! | 700..=799 | Good       |
//! | 600..=699 | Regular    |
//! | 500..=599 | HighRisk   |
//! | < 500     | Delinquent |

use serde::{Deserialize, Serialize};

/// Discrete risk category derived from a credit score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreBand {
    #[serde(alias = "Inadimplente")]
    Delinquent,
    #[serde(alias = "Alto Risco")]
    HighRisk,
    Regular,
    #[serde(alias = "Bom")]
    Good,
    #[serde(alias = "Excelente")]
    Excellent,
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreBand::Excellent => write!(f, "Excellent"),
            ScoreBand::Good => write!(f, "Good"),
            ScoreBand::Regular => write!(f, "Regular"),
            ScoreBand::HighRisk => write!(f, "High Risk"),
            ScoreBand::Delinquent => write!(f, "Delinquent"),
        }
    }
}

const BAND_THRESHOLDS: [(u32, ScoreBand); 4] = [
    (800, ScoreBand::Excellent),
    (700, ScoreBand::Good),
    (600, ScoreBand::Regular),
    (500, ScoreBand::HighRisk),
];

/// Map a score to its band.
pub fn score_for_value(score: u32) -> ScoreBand {
    BAND_THRESHOLDS
        .iter()
        .find(|(floor, _)| score >= *floor)
        .map(|(_, band)| *band)
        .unwrap_or(ScoreBand::Delinquent)
}

/// Score after a registered payment under the default policy.
pub fn next_score_after_payment(score: u32) -> u32 {
    ScorePolicy::default().next_score(score)
}

/// Fixed-increment score rule applied on every registered payment.
///
/// A stand-in for a real risk model: every accepted payment adds
/// `increment` points, capped at `ceiling`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePolicy {
    #[serde(default = "default_increment")]
    pub increment: u32,
    #[serde(default = "default_ceiling")]
    pub ceiling: u32,
}

fn default_increment() -> u32 { 50 }
fn default_ceiling() -> u32 { 990 }

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            increment: default_increment(),
            ceiling: default_ceiling(),
        }
    }
}

impl ScorePolicy {
    pub fn next_score(&self, score: u32) -> u32 {
        score.saturating_add(self.increment).min(self.ceiling)
    }

    /// Apply the rule and describe the move between bands.
    pub fn transition(&self, score: u32) -> ScoreTransition {
        let current = self.next_score(score);
        ScoreTransition {
            previous_score: score,
            current_score: current,
            previous_band: score_for_value(score),
            current_band: score_for_value(current),
        }
    }
}

/// Score movement caused by one payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTransition {
    pub previous_score: u32,
    pub current_score: u32,
    pub previous_band: ScoreBand,
    pub current_band: ScoreBand,
}

impl ScoreTransition {
    pub fn band_changed(&self) -> bool {
        self.previous_band != self.current_band
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(score_for_value(990), ScoreBand::Excellent);
        assert_eq!(score_for_value(800), ScoreBand::Excellent);
        assert_eq!(score_for_value(799), ScoreBand::Good);
        assert_eq!(score_for_value(700), ScoreBand::Good);
        assert_eq!(score_for_value(699), ScoreBand::Regular);
        assert_eq!(score_for_value(600), ScoreBand::Regular);
        assert_eq!(score_for_value(599), ScoreBand::HighRisk);
        assert_eq!(score_for_value(500), ScoreBand::HighRisk);
        assert_eq!(score_for_value(499), ScoreBand::Delinquent);
        assert_eq!(score_for_value(0), ScoreBand::Delinquent);
    }

    #[test]
    fn test_next_score_increment_and_ceiling() {
        assert_eq!(next_score_after_payment(720), 770);
        assert_eq!(next_score_after_payment(950), 990);
        assert_eq!(next_score_after_payment(990), 990);
        assert_eq!(next_score_after_payment(u32::MAX), 990);
    }

    #[test]
    fn test_custom_policy() {
        let policy = ScorePolicy {
            increment: 10,
            ceiling: 850,
        };
        assert_eq!(policy.next_score(845), 850);
        assert_eq!(policy.next_score(100), 110);
    }

    #[test]
    fn test_policy_serde_defaults() {
        let policy: ScorePolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, ScorePolicy::default());
    }

    #[test]
    fn test_transition_crosses_band() {
        let t = ScorePolicy::default().transition(780);
        assert_eq!(t.current_score, 830);
        assert_eq!(t.previous_band, ScoreBand::Good);
        assert_eq!(t.current_band, ScoreBand::Excellent);
        assert!(t.band_changed());
    }

    #[test]
    fn test_bands_order_by_risk() {
        assert!(ScoreBand::Excellent > ScoreBand::Good);
        assert!(ScoreBand::HighRisk > ScoreBand::Delinquent);
    }
}
