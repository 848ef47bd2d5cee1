// Snapshot - Persisted JSON shape of the week store

use serde::Serialize;
use serde_json::Value;

use crate::domain::errors::DataCorruption;
use crate::domain::model::WeekRecord;

/// Everything the store persists.
///
/// Wire form: `{"current": WeekRecord, "history": [WeekRecord], "onboardingDone": bool}`.
/// Keys are additive only; unknown keys are ignored on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<WeekRecord>,
    pub history: Vec<WeekRecord>,
    pub onboarding_done: bool,
}

/// Result of a lenient decode: whatever survived plus what was dropped
#[derive(Debug, Default)]
pub struct DecodedSnapshot {
    pub snapshot: Snapshot,
    pub corruption: Vec<DataCorruption>,
}

impl Snapshot {
    /// Serialize to pretty JSON
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Decode section by section. A bad section (or a bad history entry)
    /// is dropped and reported instead of failing the whole load.
    pub fn decode(raw: &str) -> DecodedSnapshot {
        let mut decoded = DecodedSnapshot::default();

        let root = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                decoded.corruption.push(DataCorruption::new(
                    "snapshot",
                    format!("expected a JSON object, found {}", json_kind(&other)),
                ));
                return decoded;
            }
            Err(e) => {
                decoded
                    .corruption
                    .push(DataCorruption::new("snapshot", e.to_string()));
                return decoded;
            }
        };

        match root.get("current") {
            None | Some(Value::Null) => {}
            Some(value) => match serde_json::from_value::<WeekRecord>(value.clone()) {
                Ok(week) => decoded.snapshot.current = Some(week),
                Err(e) => decoded
                    .corruption
                    .push(DataCorruption::new("current", e.to_string())),
            },
        }

        match root.get("history") {
            None | Some(Value::Null) => {}
            Some(Value::Array(entries)) => {
                for (i, entry) in entries.iter().enumerate() {
                    match serde_json::from_value::<WeekRecord>(entry.clone()) {
                        Ok(week) => decoded.snapshot.history.push(week),
                        Err(e) => decoded.corruption.push(DataCorruption::new(
                            "history",
                            format!("entry {}: {}", i, e),
                        )),
                    }
                }
            }
            Some(other) => decoded.corruption.push(DataCorruption::new(
                "history",
                format!("expected an array, found {}", json_kind(other)),
            )),
        }

        match root.get("onboardingDone") {
            None | Some(Value::Null) => {}
            Some(Value::Bool(done)) => decoded.snapshot.onboarding_done = *done,
            Some(other) => decoded.corruption.push(DataCorruption::new(
                "onboardingDone",
                format!("expected a boolean, found {}", json_kind(other)),
            )),
        }

        decoded
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
