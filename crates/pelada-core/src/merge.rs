// Combining season datasets into one record per player.

use std::collections::HashMap;

use crate::player::{PlayerRecord, Skills};

/// Attendance-weighted average of two ratings. With no attendance on either
/// side, keeps the first non-zero rating. The result is always finite.
fn weighted(a: f64, weight_a: u32, b: f64, weight_b: u32) -> f64 {
    let total = f64::from(weight_a) + f64::from(weight_b);
    if total == 0.0 {
        return if a != 0.0 { a } else { b };
    }
    let (share_a, share_b) = (f64::from(weight_a) / total, f64::from(weight_b) / total);
    (a * share_a + b * share_b).clamp(f64::MIN, f64::MAX)
}

/// Merge two records for the same player; `later` is the more recent season.
///
/// Counts are summed, skills are attendance-weighted, the name keeps the
/// earlier spelling, and the position comes from the later season when set.
pub fn merge_pair(earlier: &PlayerRecord, later: &PlayerRecord) -> PlayerRecord {
    let (wa, wb) = (earlier.attendances, later.attendances);
    let skills: Skills = earlier
        .skills
        .zip_with(&later.skills, |a, b| weighted(a, wa, b, wb));

    PlayerRecord {
        name: if earlier.name.is_empty() {
            later.name.clone()
        } else {
            earlier.name.clone()
        },
        attendances: wa.saturating_add(wb),
        goals: earlier.goals.saturating_add(later.goals),
        saves: earlier.saves.saturating_add(later.saves),
        skills,
        position: if later.position.is_empty() {
            earlier.position.clone()
        } else {
            later.position.clone()
        },
    }
}

/// Fold season datasets left to right into a single dataset.
///
/// A single dataset is returned untouched. Otherwise records are keyed by
/// lowercased name; the output keeps the order in which names first appear.
pub fn merge_seasons(mut datasets: Vec<Vec<PlayerRecord>>) -> Vec<PlayerRecord> {
    if datasets.len() <= 1 {
        return datasets.pop().unwrap_or_default();
    }

    let mut merged: Vec<PlayerRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for player in datasets.into_iter().flatten() {
        let key = player.name.to_lowercase();
        match index.get(&key) {
            Some(&i) => {
                let combined = merge_pair(&merged[i], &player);
                merged[i] = combined;
            }
            None => {
                index.insert(key, merged.len());
                merged.push(player);
            }
        }
    }

    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
