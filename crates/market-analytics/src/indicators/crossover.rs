//! Moving-average crossover detection

use serde::{Deserialize, Serialize};

use crate::model::IndicatorPoint;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossDirection {
    /// Fast series moved above the slow one
    Golden,
    /// Fast series moved below the slow one
    Death,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crossover {
    pub timestamp: i64,
    pub direction: CrossDirection,
}

/// Find the points where `fast` crosses `slow`.
///
/// Both series must end on the same sample (as SMAs of one input do); the
/// longer one is trimmed from the front so the two line up. Pairs whose
/// timestamps disagree are skipped.
///
/// A cross is a change in the sign of `fast - slow`. Points where the two
/// series touch carry no sign, so touching and turning back is not a cross.
pub fn crossovers(fast: &[IndicatorPoint], slow: &[IndicatorPoint]) -> Vec<Crossover> {
    let len = fast.len().min(slow.len());
    let fast = &fast[fast.len() - len..];
    let slow = &slow[slow.len() - len..];

    let mut out = Vec::new();
    // true while fast was last strictly above slow
    let mut above: Option<bool> = None;

    for (f, s) in fast.iter().zip(slow) {
        if f.timestamp != s.timestamp {
            above = None;
            continue;
        }

        let diff = f.value - s.value;
        if diff == 0.0 || diff.is_nan() {
            continue;
        }

        let now_above = diff > 0.0;
        match above {
            Some(false) if now_above => {
                out.push(Crossover { timestamp: f.timestamp, direction: CrossDirection::Golden });
            }
            Some(true) if !now_above => {
                out.push(Crossover { timestamp: f.timestamp, direction: CrossDirection::Death });
            }
            _ => {}
        }
        above = Some(now_above);
    }

    out
}
