use prettytable::{row, Table};

use bout_core::models::{Side, Zone};
use bout_core::stats::Outcome;
use bout_core::{FencerId, FencerStats, MatchListing, MatchSummary, TouchLine};

pub fn stats_tables(fencer: &str, stats: &FencerStats) -> Vec<Table> {
    let mut summary = Table::new();
    summary.set_titles(row![fencer, ""]);
    summary.add_row(row!["Matches", stats.total_matches]);
    summary.add_row(row!["Victories", stats.victories]);
    summary.add_row(row!["Defeats", stats.defeats]);
    summary.add_row(row!["Draws", stats.draws]);
    summary.add_row(row!["Victory ratio", format!("{}%", stats.victory_ratio)]);
    summary.add_row(row!["Touches given", stats.total_touches_given]);
    summary.add_row(row!["Touches received", stats.total_touches_received]);
    if stats.unattributed_touches > 0 {
        summary.add_row(row!["Unattributed touches", stats.unattributed_touches]);
    }

    let mut actions = Table::new();
    actions.set_titles(row!["Code", "Action", "Given", "Received", "Efficiency"]);
    for (code, efficiency) in &stats.action_efficiency {
        actions.add_row(row![
            code.as_str(),
            code.full_name(),
            stats.given(code),
            stats.received(code),
            format!("{efficiency}%")
        ]);
    }

    let mut zones = Table::new();
    zones.set_titles(row!["Zone", "Given", "Received"]);
    for zone in Zone::ALL {
        let given = stats.zone_distribution.get(&zone).copied().unwrap_or(0);
        let received = stats.zone_distribution_received.get(&zone).copied().unwrap_or(0);
        zones.add_row(row![zone.get(), given, received]);
    }

    vec![summary, actions, zones]
}

pub fn history_table(summaries: &[MatchSummary]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Date", "Opponent", "Score", "Result", "Touches"]);
    for s in summaries {
        let result = match s.outcome {
            Outcome::Victory => "V",
            Outcome::Defeat => "D",
            Outcome::Draw => "=",
        };
        table.add_row(row![
            s.date.format("%Y-%m-%d %H:%M"),
            &s.opponent,
            format!("{}-{}", s.own_score, s.opponent_score),
            result,
            s.touches
        ]);
    }
    table
}

/// Fencer names with their roster id, if they have one.
pub fn fencers_table(fencers: &[(String, Option<FencerId>)]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["No.", "Fencer", "Id"]);
    for (i, (name, id)) in fencers.iter().enumerate() {
        let id = id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        table.add_row(row![i + 1, name, id]);
    }
    table
}

pub fn matches_table(rows: &[MatchListing]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Id", "Date", "Red", "Score", "Green", "Winner", "Touches"]);
    for r in rows {
        table.add_row(row![
            r.match_id,
            r.date.format("%Y-%m-%d %H:%M"),
            &r.red,
            format!("{}-{}", r.red_score, r.green_score),
            &r.green,
            r.winner_name.as_deref().unwrap_or("Draw"),
            r.touches
        ]);
    }
    table
}

pub fn touch_table(lines: &[TouchLine]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["#", "Time", "Side", "Fencer", "Zone", "Action", "Code", "Score"]);
    for (i, t) in lines.iter().enumerate() {
        let side = t.side.map(Side::as_str).unwrap_or("?");
        let fencer = match (&t.fencer, t.double) {
            (Some(name), true) => format!("{name} (double)"),
            (Some(name), false) => name.clone(),
            (None, _) => "unknown".to_string(),
        };
        table.add_row(row![
            i + 1,
            t.timestamp.format("%H:%M:%S"),
            side,
            fencer,
            t.zone.get(),
            &t.action,
            t.code.as_str(),
            format!("{}-{}", t.score_after.red, t.score_after.green)
        ]);
    }
    table
}
