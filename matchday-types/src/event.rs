//! Match report files: the event source for the `report` command.
//!
//! A match file is a JSON document naming the two teams and carrying an
//! ordered list of game events, each with three key/value update maps and a
//! free-text description.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

/// One reported game event, in file order.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(rename = "event name")]
    pub name: String,
    /// Reporter-supplied game clock, not wall-clock time.
    #[serde(default)]
    pub time: i64,
    #[serde(rename = "general game updates", default, deserialize_with = "string_map")]
    pub general_updates: BTreeMap<String, String>,
    #[serde(rename = "team a updates", default, deserialize_with = "string_map")]
    pub team_a_updates: BTreeMap<String, String>,
    #[serde(rename = "team b updates", default, deserialize_with = "string_map")]
    pub team_b_updates: BTreeMap<String, String>,
    #[serde(default)]
    pub description: String,
}

/// A parsed match file: team names plus the ordered event list.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchFile {
    #[serde(rename = "team a")]
    pub team_a: String,
    #[serde(rename = "team b")]
    pub team_b: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Update maps may carry bare JSON scalars; store everything as strings.
fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key, scalar_to_string(value)))
        .collect())
}

fn scalar_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Error type for match file loading.
#[derive(Debug)]
pub enum EventFileError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl From<std::io::Error> for EventFileError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for EventFileError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl std::fmt::Display for EventFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for EventFileError {}

/// Load and parse a match file.
///
/// Events keep their file order; the caller decides what to do with them.
pub fn load_match_file(path: &Path) -> Result<MatchFile, EventFileError> {
    let contents = fs::read_to_string(path)?;
    let file = serde_json::from_str(&contents)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "team a": "Germany",
        "team b": "Japan",
        "events": [
            {
                "event name": "kickoff",
                "time": 0,
                "general game updates": {
                    "active": true,
                    "before halftime": "true",
                    "attendance": 62500
                },
                "team a updates": {"goals": 0},
                "team b updates": {"goals": 0},
                "description": "The game has started."
            },
            {
                "event name": "goal",
                "time": 38,
                "general game updates": {"before halftime": "true"},
                "team a updates": {"goals": 1},
                "team b updates": {},
                "description": "Header from the corner."
            }
        ]
    }"#;

    fn write_sample(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("events.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_match_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, SAMPLE);

        let file = load_match_file(&path).unwrap();
        assert_eq!(file.team_a, "Germany");
        assert_eq!(file.team_b, "Japan");
        assert_eq!(file.events.len(), 2);

        let kickoff = &file.events[0];
        assert_eq!(kickoff.name, "kickoff");
        assert_eq!(kickoff.time, 0);
        assert_eq!(kickoff.description, "The game has started.");
        assert_eq!(file.events[1].time, 38);
    }

    #[test]
    fn scalar_values_become_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, SAMPLE);

        let file = load_match_file(&path).unwrap();
        let general = &file.events[0].general_updates;
        assert_eq!(general.get("active").map(String::as_str), Some("true"));
        assert_eq!(general.get("attendance").map(String::as_str), Some("62500"));
        assert_eq!(
            file.events[0].team_a_updates.get("goals").map(String::as_str),
            Some("0")
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_match_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, EventFileError::Io(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "{ not json");
        let err = load_match_file(&path).unwrap_err();
        assert!(matches!(err, EventFileError::Json(_)));
    }
}
