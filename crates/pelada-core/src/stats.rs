// Derived numbers for the dashboard pages: KPI totals, rankings, ratings.

use std::cmp::Ordering;

use crate::player::PlayerRecord;

/// Overall rating: mean of the rated (non-zero) skills, rounded.
pub fn rating(player: &PlayerRecord) -> u32 {
    let rated: Vec<f64> = player
        .skills
        .values()
        .into_iter()
        .filter(|v| *v > 0.0)
        .collect();
    if rated.is_empty() {
        return 0;
    }
    (rated.iter().sum::<f64>() / rated.len() as f64).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub players: usize,
    pub goals: u64,
    pub attendances: u64,
}

/// Sums for the home page tiles. Goalkeepers' `goals` are included, as the
/// sheet does not separate them.
pub fn totals(players: &[PlayerRecord]) -> Totals {
    players.iter().fold(
        Totals {
            players: players.len(),
            ..Totals::default()
        },
        |acc, p| Totals {
            goals: acc.goals.saturating_add(u64::from(p.goals)),
            attendances: acc.attendances.saturating_add(u64::from(p.attendances)),
            ..acc
        },
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlights<'a> {
    pub top_scorer: Option<&'a PlayerRecord>,
    pub most_present: Option<&'a PlayerRecord>,
}

/// Lowercased name with Portuguese diacritics folded, so "Álvaro" sorts with
/// the a's.
fn sort_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

fn by_name(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    sort_key(&a.name)
        .cmp(&sort_key(&b.name))
        .then_with(|| a.name.cmp(&b.name))
}

/// Outfield players by goals, then attendance, then name.
pub fn goal_ranking(players: &[PlayerRecord]) -> Vec<&PlayerRecord> {
    let mut ranked: Vec<&PlayerRecord> = players.iter().filter(|p| !p.is_goalkeeper()).collect();
    ranked.sort_by(|a, b| {
        b.goals
            .cmp(&a.goals)
            .then(b.attendances.cmp(&a.attendances))
            .then_with(|| by_name(a, b))
    });
    ranked
}

/// Everyone by attendance, then goals, then name.
pub fn attendance_ranking(players: &[PlayerRecord]) -> Vec<&PlayerRecord> {
    let mut ranked: Vec<&PlayerRecord> = players.iter().collect();
    ranked.sort_by(|a, b| {
        b.attendances
            .cmp(&a.attendances)
            .then(b.goals.cmp(&a.goals))
            .then_with(|| by_name(a, b))
    });
    ranked
}

/// Goalkeepers with at least one difficult save (stored in `goals`).
pub fn goalkeeper_ranking(players: &[PlayerRecord]) -> Vec<&PlayerRecord> {
    let mut ranked: Vec<&PlayerRecord> = players
        .iter()
        .filter(|p| p.is_goalkeeper() && p.goals > 0)
        .collect();
    ranked.sort_by(|a, b| b.goals.cmp(&a.goals).then_with(|| by_name(a, b)));
    ranked
}

/// Players shown on the efficiency page.
pub const EFFICIENCY_LIMIT: usize = 10;

/// Outfield players who attended at least once, by goals per attendance,
/// best first. At most [`EFFICIENCY_LIMIT`] entries.
pub fn efficiency_ranking(players: &[PlayerRecord]) -> Vec<(&PlayerRecord, f64)> {
    let mut ranked: Vec<(&PlayerRecord, f64)> = players
        .iter()
        .filter(|p| !p.is_goalkeeper() && p.attendances > 0)
        .map(|p| (p, f64::from(p.goals) / f64::from(p.attendances)))
        .collect();
    ranked.sort_by(|(a, ra), (b, rb)| {
        rb.total_cmp(ra)
            .then(b.goals.cmp(&a.goals))
            .then_with(|| by_name(a, b))
    });
    ranked.truncate(EFFICIENCY_LIMIT);
    ranked
}

pub fn highlights(players: &[PlayerRecord]) -> Highlights<'_> {
    Highlights {
        top_scorer: goal_ranking(players).first().copied(),
        most_present: attendance_ranking(players).first().copied(),
    }
}

/// Alphabetical roster.
pub fn roster(players: &[PlayerRecord]) -> Vec<&PlayerRecord> {
    let mut sorted: Vec<&PlayerRecord> = players.iter().collect();
    sorted.sort_by(|a, b| by_name(a, b));
    sorted
}

pub fn find_player<'a>(players: &'a [PlayerRecord], name: &str) -> Option<&'a PlayerRecord> {
    let wanted = name.trim().to_lowercase();
    players.iter().find(|p| p.name.to_lowercase() == wanted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
