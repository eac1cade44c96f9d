//! JSON conversion
//!
//! Records are written as a pretty-printed array of objects with the keys
//! `name`, `frames_per_direction`, `animation_speed` and `triggers`. Trigger
//! frames become string keys since JSON objects cannot be keyed by integers.

use crate::{Error, Result};
use animdata_core::{ActionTriggers, Record};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::io::{Read, Write};

#[derive(serde::Serialize)]
struct JsonRecord<'a> {
    name: &'a str,
    frames_per_direction: u32,
    animation_speed: u32,
    triggers: JsonTriggers<'a>,
}

/// Serializes triggers in ascending frame order rather than string key order
struct JsonTriggers<'a>(&'a ActionTriggers);

impl Serialize for JsonTriggers<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (frame, code) in self.0 {
            map.serialize_entry(&frame.to_string(), &code)?;
        }
        map.end()
    }
}

impl<'a> From<&'a Record> for JsonRecord<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            name: record.cof_name(),
            frames_per_direction: record.frames_per_direction(),
            animation_speed: record.animation_speed(),
            triggers: JsonTriggers(record.triggers()),
        }
    }
}

/// Converts records to a pretty-printed JSON array
pub fn records_to_json(records: &[Record]) -> Result<String> {
    let json: Vec<JsonRecord> = records.iter().map(JsonRecord::from).collect();
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Writes records as a pretty-printed JSON array
pub fn write_json<W: Write>(records: &[Record], mut writer: W) -> Result<()> {
    writer.write_all(records_to_json(records)?.as_bytes())?;
    Ok(())
}

/// Parses records from a JSON array
pub fn records_from_json(json: &str) -> Result<Vec<Record>> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    records_from_values(&values)
}

/// Reads records from a JSON array
pub fn read_json<R: Read>(reader: R) -> Result<Vec<Record>> {
    let values: Vec<Value> = serde_json::from_reader(reader)?;
    records_from_values(&values)
}

fn records_from_values(values: &[Value]) -> Result<Vec<Record>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Record::from_plain_map(value).map_err(|source| Error::JsonRecord { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use animdata_core::ValidationError;

    const VALID_JSON: &str = r#"[
  {
    "name": "AWS1HTH",
    "frames_per_direction": 9,
    "animation_speed": 7,
    "triggers": {
      "0": 3,
      "1": 2,
      "2": 1
    }
  },
  {
    "name": "AXS1HTH",
    "frames_per_direction": 256,
    "animation_speed": 256,
    "triggers": {
      "9": 1,
      "10": 2,
      "143": 3
    }
  }
]"#;

    fn valid_records() -> Vec<Record> {
        vec![
            Record::new(
                "AWS1HTH",
                9,
                7,
                ActionTriggers::from_pairs([(0, 3), (1, 2), (2, 1)]).unwrap(),
            )
            .unwrap(),
            Record::new(
                "AXS1HTH",
                256,
                256,
                ActionTriggers::from_pairs([(9, 1), (10, 2), (143, 3)]).unwrap(),
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_to_json() {
        assert_eq!(records_to_json(&valid_records()).unwrap(), VALID_JSON);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(records_from_json(VALID_JSON).unwrap(), valid_records());
        assert_eq!(read_json(VALID_JSON.as_bytes()).unwrap(), valid_records());
    }

    #[test]
    fn test_empty() {
        assert_eq!(records_to_json(&[]).unwrap(), "[]");
        assert!(records_from_json("[]").unwrap().is_empty());
    }

    #[test]
    fn test_empty_triggers() {
        let records = vec![Record::new("0DNUHTH", 0, 192, ActionTriggers::new()).unwrap()];
        let json = records_to_json(&records).unwrap();
        assert!(json.contains(r#""triggers": {}"#));
        assert_eq!(records_from_json(&json).unwrap(), records);
    }

    #[test]
    fn test_invalid_record_reports_index() {
        let json = r#"[
            {"name": "AWS1HTH", "frames_per_direction": 1, "animation_speed": 1, "triggers": {}},
            {"name": "AWS1HTH", "frames_per_direction": 1, "animation_speed": 1, "triggers": {"3": 4}}
        ]"#;

        match records_from_json(json).unwrap_err() {
            Error::JsonRecord { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, ValidationError::CodeOutOfRange(4));
            }
            err => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn test_not_an_array() {
        assert!(matches!(
            records_from_json(r#"{"name": "AWS1HTH"}"#),
            Err(Error::Json(_))
        ));
    }
}
