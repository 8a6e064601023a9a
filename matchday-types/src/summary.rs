//! Summary rendering for aggregated game records.

use std::fmt::Write as _;

use crate::game::{EventRecord, GameRecord};

/// Render one game record as the summary report.
///
/// Stats blocks list entries in stored (key) order. Events are sorted with
/// all before-halftime events first in increasing time order, then the
/// after-halftime events in increasing time order; ties keep arrival order.
pub fn render(record: &GameRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} vs {}", record.team_a, record.team_b);
    out.push_str("Game stats:\n");

    out.push_str("General stats:\n");
    for (key, value) in &record.general_stats {
        let _ = writeln!(out, "{}: {}", key, value);
    }

    let _ = writeln!(out, "{} stats:", record.team_a);
    for (key, value) in &record.team_a_stats {
        let _ = writeln!(out, "{}: {}", key, value);
    }

    let _ = writeln!(out, "{} stats:", record.team_b);
    for (key, value) in &record.team_b_stats {
        let _ = writeln!(out, "{}: {}", key, value);
    }

    out.push_str("Game event reports:\n");
    let mut events: Vec<&EventRecord> = record.events.iter().collect();
    events.sort_by(|a, b| {
        b.before_halftime
            .cmp(&a.before_halftime)
            .then_with(|| a.time.cmp(&b.time))
    });
    for event in events {
        let _ = writeln!(out, "{}-{}:", event.time, event.name);
        if !event.description.is_empty() {
            let _ = writeln!(out, "{}", event.description);
        }
    }

    out
}
