//! Per-channel, per-reporter aggregation of received game reports.

use std::collections::{BTreeMap, HashMap};

/// One event as recorded in a game's running log.
///
/// Immutable once appended; ordering is applied at render time only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub time: i64,
    pub before_halftime: bool,
    pub name: String,
    pub description: String,
}

/// Aggregated game state for one (channel, reporter) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRecord {
    /// Team names are set by the first report that carries them and never
    /// overwritten afterwards.
    pub team_a: String,
    pub team_b: String,
    pub general_stats: BTreeMap<String, String>,
    pub team_a_stats: BTreeMap<String, String>,
    pub team_b_stats: BTreeMap<String, String>,
    /// Append-only; never deduplicated or reordered in storage.
    pub events: Vec<EventRecord>,
}

/// All game records accumulated during a session, keyed by channel and
/// reporter. Distinct reporters on the same channel get distinct records.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    games: HashMap<(String, String), GameRecord>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one report into the record for (channel, reporter), creating it
    /// on first sight. Stats merge last-write-wins per key; the event is
    /// appended to the record's log.
    #[allow(clippy::too_many_arguments)]
    pub fn upsert(
        &mut self,
        channel: &str,
        reporter: &str,
        team_a: &str,
        team_b: &str,
        general: &BTreeMap<String, String>,
        team_a_updates: &BTreeMap<String, String>,
        team_b_updates: &BTreeMap<String, String>,
        event: EventRecord,
    ) {
        let record = self
            .games
            .entry((channel.to_string(), reporter.to_string()))
            .or_default();

        if record.team_a.is_empty() && !team_a.is_empty() {
            record.team_a = team_a.to_string();
        }
        if record.team_b.is_empty() && !team_b.is_empty() {
            record.team_b = team_b.to_string();
        }

        for (key, value) in general {
            record.general_stats.insert(key.clone(), value.clone());
        }
        for (key, value) in team_a_updates {
            record.team_a_stats.insert(key.clone(), value.clone());
        }
        for (key, value) in team_b_updates {
            record.team_b_stats.insert(key.clone(), value.clone());
        }

        record.events.push(event);
    }

    /// Read-only lookup for the summary path.
    pub fn record(&self, channel: &str, reporter: &str) -> Option<&GameRecord> {
        self.games
            .get(&(channel.to_string(), reporter.to_string()))
    }
}
