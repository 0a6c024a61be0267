//! Centipawn loss and severity tiers.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::PunisherError;

/// Quality label for a single move, ordered by ascending loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Ok,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Inaccuracy => "INACCURACY",
            Severity::Mistake => "MISTAKE",
            Severity::Blunder => "BLUNDER",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OK" => Ok(Severity::Ok),
            "INACCURACY" => Ok(Severity::Inaccuracy),
            "MISTAKE" => Ok(Severity::Mistake),
            "BLUNDER" => Ok(Severity::Blunder),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Inclusive centipawn cutoffs for each tier above `OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub inaccuracy: u32,
    pub mistake: u32,
    pub blunder: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            inaccuracy: 50,
            mistake: 150,
            blunder: 300,
        }
    }
}

impl Thresholds {
    /// Build a threshold set, rejecting cutoffs that are not
    /// non-decreasing from inaccuracy to blunder.
    pub fn new(inaccuracy: u32, mistake: u32, blunder: u32) -> Result<Self, PunisherError> {
        if inaccuracy > mistake || mistake > blunder {
            return Err(PunisherError::InvalidThresholds {
                inaccuracy,
                mistake,
                blunder,
            });
        }
        Ok(Self {
            inaccuracy,
            mistake,
            blunder,
        })
    }
}

impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.inaccuracy, self.mistake, self.blunder)
    }
}

/// Parses `"inaccuracy,mistake,blunder"`, e.g. `"50,150,300"`.
impl FromStr for Thresholds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| {
                "thresholds must be three comma-separated integers like 50,150,300".to_string()
            })?;

        match parts.as_slice() {
            &[inaccuracy, mistake, blunder] => {
                Thresholds::new(inaccuracy, mistake, blunder).map_err(|e| e.to_string())
            }
            _ => Err("thresholds must be three comma-separated integers like 50,150,300".into()),
        }
    }
}

/// Centipawns the mover gave away: `max(0, before - after)`.
///
/// Both values must already be read from the mover's side. An improving
/// evaluation is clamped to zero.
pub fn compute_loss(before_cp: i32, after_cp: i32) -> u32 {
    if before_cp > after_cp {
        before_cp.abs_diff(after_cp)
    } else {
        0
    }
}

/// Map a loss to its tier. Highest tier is checked first and each cutoff
/// is inclusive.
pub fn classify(loss_cp: u32, thresholds: &Thresholds) -> Severity {
    if loss_cp >= thresholds.blunder {
        Severity::Blunder
    } else if loss_cp >= thresholds.mistake {
        Severity::Mistake
    } else if loss_cp >= thresholds.inaccuracy {
        Severity::Inaccuracy
    } else {
        Severity::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{MATE_EQUIVALENT, Score, normalize};

    #[test]
    fn test_default_tiers() {
        let t = Thresholds::default();
        assert_eq!(classify(0, &t), Severity::Ok);
        assert_eq!(classify(49, &t), Severity::Ok);
        assert_eq!(classify(50, &t), Severity::Inaccuracy);
        assert_eq!(classify(150, &t), Severity::Mistake);
        assert_eq!(classify(300, &t), Severity::Blunder);
        assert_eq!(classify(u32::MAX, &t), Severity::Blunder);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = Thresholds::new(20, 60, 120).unwrap();
        assert_eq!(classify(59, &t), Severity::Inaccuracy);
        assert_eq!(classify(60, &t), Severity::Mistake);
        assert_eq!(classify(119, &t), Severity::Mistake);
        assert_eq!(classify(120, &t), Severity::Blunder);
    }

    #[test]
    fn test_blunder_boundary_is_inclusive() {
        for t in [
            Thresholds::default(),
            Thresholds::new(1, 1, 1).unwrap(),
            Thresholds::new(0, 10, 11).unwrap(),
            Thresholds::new(5, 5, 900).unwrap(),
        ] {
            assert_eq!(classify(t.blunder, &t), Severity::Blunder);
            assert_ne!(classify(t.blunder - 1, &t), Severity::Blunder);
        }
    }

    #[test]
    fn test_monotone_in_loss() {
        let t = Thresholds::new(20, 60, 120).unwrap();
        let mut previous = Severity::Ok;
        for loss in 0..400 {
            let severity = classify(loss, &t);
            assert!(severity >= previous, "loss {loss} dropped to {severity}");
            previous = severity;
        }
    }

    #[test]
    fn test_out_of_order_thresholds_apply_literally() {
        let t = Thresholds {
            inaccuracy: 200,
            mistake: 150,
            blunder: 100,
        };
        assert_eq!(classify(120, &t), Severity::Blunder);
        assert_eq!(classify(99, &t), Severity::Ok);
    }

    #[test]
    fn test_rejects_non_monotonic() {
        assert!(matches!(
            Thresholds::new(200, 150, 100),
            Err(PunisherError::InvalidThresholds { .. })
        ));
        assert!(Thresholds::new(50, 50, 50).is_ok());
    }

    #[test]
    fn test_parse_thresholds() {
        assert_eq!(
            "20, 60,120".parse::<Thresholds>().unwrap(),
            Thresholds::new(20, 60, 120).unwrap()
        );
        assert!("50,150".parse::<Thresholds>().is_err());
        assert!("50,abc,300".parse::<Thresholds>().is_err());
        assert!("300,150,50".parse::<Thresholds>().is_err());
        assert_eq!(Thresholds::default().to_string(), "50,150,300");
    }

    #[test]
    fn test_loss() {
        assert_eq!(compute_loss(120, 80), 40);
        assert_eq!(compute_loss(50, 100), 0);
        assert_eq!(compute_loss(-30, -30), 0);
        assert_eq!(compute_loss(i32::MAX, i32::MIN), u32::MAX);
        assert_eq!(compute_loss(i32::MIN, i32::MAX), 0);
    }

    #[test]
    fn test_loss_matches_clamped_difference() {
        let values = [-10_000, -301, -1, 0, 1, 49, 150, 9_999, 10_000];
        for &a in &values {
            for &b in &values {
                let expected = (i64::from(a) - i64::from(b)).max(0);
                assert_eq!(i64::from(compute_loss(a, b)), expected);
            }
        }
    }

    #[test]
    fn test_mate_swing() {
        let before = normalize(Score::Mate(Some(3))).unwrap();
        let after = normalize(Score::Mate(Some(-2))).unwrap();
        let loss = compute_loss(before, after);
        assert_eq!(loss, 2 * MATE_EQUIVALENT as u32);
        assert_eq!(classify(loss, &Thresholds::default()), Severity::Blunder);
    }

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::Ok.to_string(), "OK");
        assert_eq!("blunder".parse::<Severity>().unwrap(), Severity::Blunder);
        assert!(Severity::Inaccuracy < Severity::Mistake);
        assert_eq!(
            serde_json::to_string(&Severity::Inaccuracy).unwrap(),
            "\"INACCURACY\""
        );
        assert_eq!(serde_json::to_string(&Severity::Ok).unwrap(), "\"OK\"");
    }
}
