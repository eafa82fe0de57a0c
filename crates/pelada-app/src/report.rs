// Plain-text renderings of the dashboard pages, plus CSV export.

use std::fmt::Write as _;
use std::io;

use pelada_core::stats::{self, Totals};
use pelada_core::{PlayerRecord, SelectionOption};

/// Column order of the upstream sheet, so exports can be read back.
const EXPORT_HEADER: [&str; 11] = [
    "Nome", "Presencas", "Gols", "DD", "Ritmo", "Finalizacao", "Passe", "Drible", "Defesa",
    "Fisico", "Posicao",
];

fn position_label(p: &PlayerRecord) -> &str {
    if p.position.is_empty() {
        "-"
    } else {
        &p.position
    }
}

/// Label for the `goals` column; the sheet stores goalkeepers' difficult
/// saves there.
pub fn goals_label(p: &PlayerRecord) -> &'static str {
    if p.is_goalkeeper() {
        "difficult saves"
    } else {
        "goals"
    }
}

fn ranked_list(out: &mut String, ranked: &[&PlayerRecord], value: impl Fn(&PlayerRecord) -> u32) {
    let width = ranked.iter().map(|p| p.name.chars().count()).max().unwrap_or(0);
    for (i, p) in ranked.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<width$}  {:<5} {:>4}",
            i + 1,
            p.name,
            position_label(p),
            value(p),
        );
    }
}

fn limited<'a>(ranked: Vec<&'a PlayerRecord>, limit: Option<usize>) -> Vec<&'a PlayerRecord> {
    match limit {
        Some(n) => ranked.into_iter().take(n).collect(),
        None => ranked,
    }
}

/// Home page: KPI totals, highlights, and the goalkeeper leaders.
pub fn render_home(label: &str, players: &[PlayerRecord]) -> String {
    let Totals {
        players: count,
        goals,
        attendances,
    } = stats::totals(players);
    let highlights = stats::highlights(players);

    let mut out = String::new();
    let _ = writeln!(out, "{label}");
    let _ = writeln!(out, "Players: {count}   Goals: {goals}   Attendances: {attendances}");
    let _ = writeln!(out);
    match highlights.top_scorer {
        Some(p) => {
            let _ = writeln!(out, "Top scorer:   {} ({})", p.name, p.goals);
        }
        None => {
            let _ = writeln!(out, "Top scorer:   -");
        }
    }
    match highlights.most_present {
        Some(p) => {
            let _ = writeln!(out, "Most present: {} ({})", p.name, p.attendances);
        }
        None => {
            let _ = writeln!(out, "Most present: -");
        }
    }

    let keepers = limited(stats::goalkeeper_ranking(players), Some(2));
    if !keepers.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Goalkeepers (difficult saves)");
        ranked_list(&mut out, &keepers, |p| p.goals);
    }
    out
}

/// Goals page: outfield players only.
pub fn render_goals(label: &str, players: &[PlayerRecord], limit: Option<usize>) -> String {
    let ranked = stats::goal_ranking(players);
    let mut out = String::new();
    let _ = writeln!(out, "{label}: goals ({} players)", ranked.len());
    ranked_list(&mut out, &limited(ranked, limit), |p| p.goals);
    out
}

/// Attendance page: everyone.
pub fn render_attendance(label: &str, players: &[PlayerRecord], limit: Option<usize>) -> String {
    let ranked = stats::attendance_ranking(players);
    let mut out = String::new();
    let _ = writeln!(out, "{label}: attendance ({} players)", ranked.len());
    ranked_list(&mut out, &limited(ranked, limit), |p| p.attendances);
    out
}

/// Efficiency page: goals per attendance for outfield players.
pub fn render_efficiency(label: &str, players: &[PlayerRecord]) -> String {
    let ranked = stats::efficiency_ranking(players);
    let width = ranked.iter().map(|(p, _)| p.name.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(out, "{label}: goals per game (top {})", ranked.len());
    for (i, (p, per_game)) in ranked.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<width$}  {per_game:>5.2}  ({} in {})",
            i + 1,
            p.name,
            p.goals,
            p.attendances,
        );
    }
    out
}

/// Players page: alphabetical roster with overall ratings.
pub fn render_roster(label: &str, players: &[PlayerRecord]) -> String {
    let roster = stats::roster(players);
    let mut out = String::new();
    let _ = writeln!(out, "{label}: players ({})", roster.len());
    ranked_list(&mut out, &roster, stats::rating);
    out
}

/// Profile of one player: counts and the six skill ratings.
pub fn render_player(p: &PlayerRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", p.name, position_label(p));
    let _ = writeln!(out, "  attendances      {}", p.attendances);
    let _ = writeln!(out, "  {:<16} {}", goals_label(p), p.goals);
    if p.saves > 0 {
        let _ = writeln!(out, "  saves            {}", p.saves);
    }
    let _ = writeln!(out, "  rating           {}", stats::rating(p));

    let s = &p.skills;
    let skills = [
        ("pace", s.pace),
        ("finishing", s.finishing),
        ("passing", s.passing),
        ("dribbling", s.dribbling),
        ("defense", s.defense),
        ("physical", s.physical),
    ];
    for (name, value) in skills {
        let _ = writeln!(out, "  {name:<16} {value:.0}");
    }
    out
}

/// Seasons page: each selection with the time its cached dataset was last
/// written, if any.
pub fn render_seasons(options: &[(&SelectionOption, Option<String>)]) -> String {
    let width = options.iter().map(|(o, _)| o.value.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (option, updated_at) in options {
        let kind = if option.is_multi_season() {
            "combined"
        } else {
            "season"
        };
        let cached = updated_at.as_deref().unwrap_or("not cached");
        let _ = writeln!(
            out,
            "{:<width$}  {:<8}  {}  [{cached}]",
            option.value, kind, option.label
        );
    }
    out
}

/// Write players as CSV using the sheet's column names.
pub fn export_csv<W: io::Write>(writer: W, players: &[PlayerRecord]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADER)?;
    for p in players {
        let s = &p.skills;
        wtr.write_record([
            p.name.clone(),
            p.attendances.to_string(),
            p.goals.to_string(),
            p.saves.to_string(),
            s.pace.to_string(),
            s.finishing.to_string(),
            s.passing.to_string(),
            s.dribbling.to_string(),
            s.defense.to_string(),
            s.physical.to_string(),
            p.position.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
