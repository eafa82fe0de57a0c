// Player records and the mapping from decoded sheet rows.
//
// The sheet headers are in Portuguese and some exist both accented and
// unaccented ("Finalização" / "Finalizacao"), so every field is looked up
// through an ordered list of accepted column names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::csv_decode::{decode, trim_header};

/// Canonical position code for goalkeepers.
pub const GOALKEEPER: &str = "GOL";

/// Spellings collapsed into [`GOALKEEPER`].
const GOALKEEPER_SYNONYMS: &[&str] = &["GOLEIRO", "GK", "G", "GOL"];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The six skill ratings, nominally 0-100. Zero means "unrated".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    pub pace: f64,
    pub finishing: f64,
    pub passing: f64,
    pub dribbling: f64,
    pub defense: f64,
    pub physical: f64,
}

impl Skills {
    pub fn values(&self) -> [f64; 6] {
        [
            self.pace,
            self.finishing,
            self.passing,
            self.dribbling,
            self.defense,
            self.physical,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.values().iter().sum()
    }

    /// Apply `f` to each pair of corresponding ratings.
    pub fn zip_with(&self, other: &Skills, f: impl Fn(f64, f64) -> f64) -> Skills {
        Skills {
            pace: f(self.pace, other.pace),
            finishing: f(self.finishing, other.finishing),
            passing: f(self.passing, other.passing),
            dribbling: f(self.dribbling, other.dribbling),
            defense: f(self.defense, other.defense),
            physical: f(self.physical, other.physical),
        }
    }
}

/// One player's statistics for a season (or merged across seasons).
///
/// For goalkeepers `goals` holds "difficult saves": the upstream sheet reuses
/// the column. Labelling is left to whoever displays the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub attendances: u32,
    pub goals: u32,
    #[serde(default)]
    pub saves: u32,
    pub skills: Skills,
    /// Uppercased position code; empty when the sheet has none.
    pub position: String,
}

impl PlayerRecord {
    pub fn is_goalkeeper(&self) -> bool {
        self.position == GOALKEEPER
    }

    /// A record carries real data iff it has a name and at least one of
    /// attendance, goals, or any skill rating. A goalkeeper whose only
    /// signal is a save count also passes.
    pub fn is_valid(&self) -> bool {
        if self.name.trim().is_empty() {
            return false;
        }
        !(self.attendances == 0 && self.goals == 0 && self.skills.sum() == 0.0)
            || self.saves > 0
    }
}

// ---------------------------------------------------------------------------
// Column synonyms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Attendances,
    Goals,
    Saves,
    Pace,
    Finishing,
    Passing,
    Dribbling,
    Defense,
    Physical,
    Position,
}

impl Field {
    const SKILLS: [Field; 6] = [
        Field::Pace,
        Field::Finishing,
        Field::Passing,
        Field::Dribbling,
        Field::Defense,
        Field::Physical,
    ];

    /// Accepted source column names, tried in order.
    fn columns(self) -> &'static [&'static str] {
        match self {
            Field::Name => &["Nome"],
            Field::Attendances => &["Presenças", "Presencas"],
            Field::Goals => &["Gols"],
            Field::Saves => &["DD", "Defesas", "Defesas Difíceis", "Defesas Dificeis"],
            Field::Pace => &["Ritmo"],
            Field::Finishing => &["Finalização", "Finalizacao"],
            Field::Passing => &["Passe"],
            Field::Dribbling => &["Drible"],
            Field::Defense => &["Defesa"],
            Field::Physical => &["Físico", "Fisico"],
            Field::Position => &["Posição", "Posicao"],
        }
    }
}

/// A data row keyed by trimmed header name.
struct KeyedRow<'a> {
    cells: HashMap<&'a str, &'a str>,
}

impl<'a> KeyedRow<'a> {
    fn new(header: &'a [String], row: &'a [String]) -> Self {
        let cells = header
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), row.get(i).map(String::as_str).unwrap_or("")))
            .collect();
        Self { cells }
    }

    /// The first non-empty value among the field's accepted columns, or "".
    fn get(&self, field: Field) -> &'a str {
        field
            .columns()
            .iter()
            .filter_map(|col| self.cells.get(col).copied())
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }

    fn number(&self, field: Field) -> f64 {
        parse_number(self.get(field))
    }
}

// ---------------------------------------------------------------------------
// Normalizers
// ---------------------------------------------------------------------------

/// Lenient numeric coercion: trims, accepts a comma decimal separator, and
/// yields 0 for empty, malformed, or non-finite input.
pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s.replacen(',', ".", 1).parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Round a coerced number into a count; negatives clamp to 0.
fn to_count(v: f64) -> u32 {
    v.round() as u32
}

/// Uppercase and trim a position, collapsing goalkeeper spellings.
pub fn normalize_position(raw: &str) -> String {
    let s = raw.trim().to_uppercase();
    if GOALKEEPER_SYNONYMS.contains(&s.as_str()) {
        GOALKEEPER.to_string()
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Map one decoded row onto a [`PlayerRecord`].
///
/// Returns `None` for rows without a name, and for rows where every count is
/// zero and no skill column holds anything at all.
pub fn map_row(header: &[String], row: &[String]) -> Option<PlayerRecord> {
    let keyed = KeyedRow::new(header, row);

    let name = keyed.get(Field::Name).trim().to_string();
    if name.is_empty() {
        return None;
    }

    let attendances = keyed.number(Field::Attendances);
    let goals = keyed.number(Field::Goals);
    let saves = keyed.number(Field::Saves);

    let has_skills = Field::SKILLS.iter().any(|f| !keyed.get(*f).is_empty());
    if !has_skills && attendances == 0.0 && goals == 0.0 && saves == 0.0 {
        return None;
    }

    Some(PlayerRecord {
        name,
        attendances: to_count(attendances),
        goals: to_count(goals),
        saves: to_count(saves),
        skills: Skills {
            pace: keyed.number(Field::Pace),
            finishing: keyed.number(Field::Finishing),
            passing: keyed.number(Field::Passing),
            dribbling: keyed.number(Field::Dribbling),
            defense: keyed.number(Field::Defense),
            physical: keyed.number(Field::Physical),
        },
        position: normalize_position(keyed.get(Field::Position)),
    })
}

/// Decode, map, and filter one season's CSV export into a season dataset.
pub fn parse_season(text: &str) -> Vec<PlayerRecord> {
    let rows = decode(text);
    let Some((header_row, data)) = rows.split_first() else {
        return Vec::new();
    };
    let header: Vec<String> = header_row.iter().map(|h| trim_header(h)).collect();

    let players: Vec<PlayerRecord> = data
        .iter()
        .filter_map(|row| map_row(&header, row))
        .filter(PlayerRecord::is_valid)
        .collect();

    debug!(
        rows = data.len(),
        players = players.len(),
        "parsed season sheet"
    );
    players
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    fn record(name: &str) -> PlayerRecord {
        PlayerRecord {
            name: name.into(),
            attendances: 0,
            goals: 0,
            saves: 0,
            skills: Skills::default(),
            position: String::new(),
        }
    }

    // -- Numeric coercion --

    #[test]
    fn comma_and_period_decimals_agree() {
        assert!((parse_number("12,5") - 12.5).abs() < f64::EPSILON);
        assert!((parse_number("12.5") - 12.5).abs() < f64::EPSILON);
        assert!((parse_number(" 7 ") - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_and_garbage_coerce_to_zero() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("   "), 0.0);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number("1,2,3"), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
        assert_eq!(parse_number("inf"), 0.0);
    }

    // -- Position normalization --

    #[test]
    fn goalkeeper_synonyms_collapse() {
        for raw in ["goleiro", "GK", " g ", "Gol"] {
            assert_eq!(normalize_position(raw), GOALKEEPER, "input {raw:?}");
        }
        assert_eq!(normalize_position(" meio "), "MEIO");
        assert_eq!(normalize_position(""), "");
    }

    // -- Row mapping --

    #[test]
    fn maps_full_row() {
        let h = header(&[
            "Nome", "Presenças", "Gols", "Ritmo", "Finalização", "Passe", "Drible", "Defesa",
            "Físico", "Posição",
        ]);
        let row = header(&["  Ana ", "10", "4", "80", "70,5", "60", "55", "40", "65", "ata"]);

        let p = map_row(&h, &row).unwrap();
        assert_eq!(p.name, "Ana");
        assert_eq!(p.attendances, 10);
        assert_eq!(p.goals, 4);
        assert_eq!(p.saves, 0);
        assert!((p.skills.finishing - 70.5).abs() < f64::EPSILON);
        assert!((p.skills.physical - 65.0).abs() < f64::EPSILON);
        assert_eq!(p.position, "ATA");
    }

    #[test]
    fn unaccented_aliases_are_used() {
        let h = header(&["Nome", "Presencas", "Finalizacao", "Fisico", "Posicao"]);
        let row = header(&["Bob", "3", "50", "45", "Goleiro"]);

        let p = map_row(&h, &row).unwrap();
        assert_eq!(p.attendances, 3);
        assert!((p.skills.finishing - 50.0).abs() < f64::EPSILON);
        assert!((p.skills.physical - 45.0).abs() < f64::EPSILON);
        assert!(p.is_goalkeeper());
    }

    #[test]
    fn accented_column_wins_over_alias() {
        let h = header(&["Nome", "Finalização", "Finalizacao", "Presencas"]);
        let row = header(&["Caio", "90", "10", "1"]);
        let p = map_row(&h, &row).unwrap();
        assert!((p.skills.finishing - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_accented_column_falls_back_to_alias() {
        let h = header(&["Nome", "Finalização", "Finalizacao", "Presencas"]);
        let row = header(&["Caio", "", "10", "1"]);
        let p = map_row(&h, &row).unwrap();
        assert!((p.skills.finishing - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn saves_aliases() {
        let h = header(&["Nome", "Presencas", "Defesas Difíceis", "Posição"]);
        let row = header(&["Dida", "5", "12", "GK"]);
        let p = map_row(&h, &row).unwrap();
        assert_eq!(p.saves, 12);

        let h = header(&["Nome", "DD"]);
        let row = header(&["Dida", "2"]);
        assert_eq!(map_row(&h, &row).unwrap().saves, 2);
    }

    #[test]
    fn short_row_pads_missing_fields() {
        let h = header(&["Nome", "Presencas", "Gols", "Ritmo"]);
        let row = header(&["Eva", "2"]);
        let p = map_row(&h, &row).unwrap();
        assert_eq!(p.attendances, 2);
        assert_eq!(p.goals, 0);
        assert_eq!(p.skills.pace, 0.0);
    }

    #[test]
    fn nameless_row_is_none() {
        let h = header(&["Nome", "Presencas"]);
        assert!(map_row(&h, &header(&["   ", "10"])).is_none());
    }

    #[test]
    fn empty_sheet_line_is_none() {
        let h = header(&["Nome", "Presencas", "Gols", "Ritmo"]);
        assert!(map_row(&h, &header(&["Fulano", "0", "", ""])).is_none());
    }

    #[test]
    fn present_skill_column_keeps_row_for_filter() {
        // A skill cell holding "0" counts as present; the filter decides.
        let h = header(&["Nome", "Presencas", "Gols", "Ritmo"]);
        let p = map_row(&h, &header(&["Fulano", "0", "0", "0"])).unwrap();
        assert!(!p.is_valid());
    }

    #[test]
    fn fractional_counts_round() {
        let h = header(&["Nome", "Presencas", "Gols"]);
        let p = map_row(&h, &header(&["Ana", "9,6", "-3"])).unwrap();
        assert_eq!(p.attendances, 10);
        assert_eq!(p.goals, 0);
    }

    // -- Validity filter --

    #[test]
    fn all_zero_record_rejected() {
        assert!(!record("Ghost").is_valid());
    }

    #[test]
    fn nameless_record_rejected() {
        let p = PlayerRecord {
            attendances: 5,
            ..record("  ")
        };
        assert!(!p.is_valid());
    }

    #[test]
    fn goalkeeper_with_only_saves_accepted() {
        let p = PlayerRecord {
            saves: 3,
            position: GOALKEEPER.into(),
            ..record("Dida")
        };
        assert!(p.is_valid());
    }

    #[test]
    fn any_signal_makes_record_valid() {
        assert!(PlayerRecord { attendances: 1, ..record("A") }.is_valid());
        assert!(PlayerRecord { goals: 1, ..record("B") }.is_valid());
        let rated = PlayerRecord {
            skills: Skills {
                defense: 30.0,
                ..Skills::default()
            },
            ..record("C")
        };
        assert!(rated.is_valid());
    }

    // -- Full season parse --

    #[test]
    fn parse_season_drops_ghost_rows() {
        let csv = "\
\u{feff}Nome,Presencas,Gols,Ritmo,Posicao\r
Ana,10,4,80,MEIO\r
,,,,\r
Fantasma,0,0,0,\r
Dida,8,6,,goleiro\r
";
        let players = parse_season(csv);
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Dida"]);
        assert!(players[1].is_goalkeeper());
    }

    #[test]
    fn parse_season_empty_text() {
        assert!(parse_season("").is_empty());
        assert!(parse_season("Nome,Gols\n").is_empty());
    }
}
