//! The structured body carried by game report frames.
//!
//! The body is line-oriented: five top-level `key: value` fields, then three
//! labeled update sections, then a free-text description section. Parsing is
//! a small state machine over an explicit section enumeration.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use log::debug;

use matchday_types::Event;

const GENERAL_LABEL: &str = "general game updates";
const TEAM_A_LABEL: &str = "team a updates";
const TEAM_B_LABEL: &str = "team b updates";
const DESCRIPTION_LABEL: &str = "description";

/// Current section while scanning a report body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    General,
    TeamA,
    TeamB,
    Description,
}

/// Parsed body of a game report message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportBody {
    /// The `user` field: identity of the reporting client.
    pub reporter: String,
    pub team_a: String,
    pub team_b: String,
    pub event_name: String,
    pub time: i64,
    pub before_halftime: bool,
    pub general_updates: BTreeMap<String, String>,
    pub team_a_updates: BTreeMap<String, String>,
    pub team_b_updates: BTreeMap<String, String>,
    pub description: String,
}

/// A section header line switches the scanning mode. The label may carry one
/// optional space before the colon; the value part must be empty.
fn section_for(line: &str) -> Option<Section> {
    let (key, rest) = line.split_once(':')?;
    if !rest.trim().is_empty() {
        return None;
    }
    match key.trim() {
        GENERAL_LABEL => Some(Section::General),
        TEAM_A_LABEL => Some(Section::TeamA),
        TEAM_B_LABEL => Some(Section::TeamB),
        DESCRIPTION_LABEL => Some(Section::Description),
        _ => None,
    }
}

fn parse_halftime(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}

impl ReportBody {
    /// Build an outbound report body for one event.
    pub fn from_event(reporter: &str, team_a: &str, team_b: &str, event: &Event) -> Self {
        Self {
            reporter: reporter.to_string(),
            team_a: team_a.to_string(),
            team_b: team_b.to_string(),
            event_name: event.name.clone(),
            time: event.time,
            before_halftime: event
                .general_updates
                .get("before halftime")
                .is_some_and(|v| parse_halftime(v)),
            general_updates: event.general_updates.clone(),
            team_a_updates: event.team_a_updates.clone(),
            team_b_updates: event.team_b_updates.clone(),
            description: event.description.clone(),
        }
    }

    /// Scan a report body. Malformed lines are skipped, never fatal: a
    /// colon-less line outside the description is dropped, and an
    /// unparseable `time` falls back to 0.
    pub fn parse(body: &str) -> Self {
        let mut parsed = ReportBody::default();
        let mut section = Section::None;
        let mut description_lines: Vec<&str> = Vec::new();

        for line in body.lines() {
            if let Some(next) = section_for(line) {
                section = next;
                continue;
            }

            if section == Section::Description {
                if !line.is_empty() {
                    description_lines.push(line);
                }
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                if !line.trim().is_empty() {
                    debug!("skipping report line without a colon: {:?}", line);
                }
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match section {
                Section::None => match key {
                    "user" => parsed.reporter = value.to_string(),
                    "team a" => parsed.team_a = value.to_string(),
                    "team b" => parsed.team_b = value.to_string(),
                    "event name" => parsed.event_name = value.to_string(),
                    "time" => parsed.time = value.parse().unwrap_or(0),
                    _ => {}
                },
                Section::General => {
                    if key == "before halftime" {
                        parsed.before_halftime = parse_halftime(value);
                    }
                    parsed.general_updates.insert(key.to_string(), value.to_string());
                }
                Section::TeamA => {
                    parsed.team_a_updates.insert(key.to_string(), value.to_string());
                }
                Section::TeamB => {
                    parsed.team_b_updates.insert(key.to_string(), value.to_string());
                }
                // Description lines were consumed above.
                Section::Description => {}
            }
        }

        parsed.description = description_lines.join("\n");
        parsed
    }

    /// Serialize to the wire shape. `parse` reproduces the result.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "user: {}", self.reporter);
        let _ = writeln!(out, "team a: {}", self.team_a);
        let _ = writeln!(out, "team b: {}", self.team_b);
        let _ = writeln!(out, "event name: {}", self.event_name);
        let _ = writeln!(out, "time: {}", self.time);

        let _ = writeln!(out, "{}:", GENERAL_LABEL);
        for (key, value) in &self.general_updates {
            let _ = writeln!(out, "{}:{}", key, value);
        }
        let _ = writeln!(out, "{}:", TEAM_A_LABEL);
        for (key, value) in &self.team_a_updates {
            let _ = writeln!(out, "{}:{}", key, value);
        }
        let _ = writeln!(out, "{}:", TEAM_B_LABEL);
        for (key, value) in &self.team_b_updates {
            let _ = writeln!(out, "{}:{}", key, value);
        }

        let _ = writeln!(out, "{}:", DESCRIPTION_LABEL);
        if !self.description.is_empty() {
            let _ = writeln!(out, "{}", self.description);
        }
        out
    }
}
