//! Checks and transformations over whole record lists

use crate::Record;
use log::warn;
use std::collections::HashSet;

/// Sorts records by COF name in ascending byte order. The sort is stable.
pub fn sort_by_name(records: &mut [Record]) {
    records.sort_by(|a, b| a.cof_name().cmp(b.cof_name()));
}

/// Returns each COF name that appears more than once, logging a warning for
/// every repeated entry
pub fn find_duplicate_names(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for record in records {
        let name = record.cof_name();
        if !seen.insert(name) {
            warn!("Duplicate entry found: {}", name);
            if !duplicates.iter().any(|d: &String| d == name) {
                duplicates.push(name.to_string());
            }
        }
    }
    duplicates
}

/// Drops every record whose COF name was already seen, keeping the first
pub fn dedupe_by_name(records: &mut Vec<Record>) {
    let mut seen = HashSet::new();
    records.retain(|record| seen.insert(record.cof_name().to_string()));
}

/// Returns trigger frames that lie at or past `frames_per_direction`.
///
/// The game never reaches such frames, so the triggers have no effect. This is
/// reported as a warning, not an error.
pub fn check_trigger_bounds(record: &Record) -> Vec<u8> {
    let unreachable: Vec<u8> = record
        .triggers()
        .frames()
        .filter(|&frame| u32::from(frame) >= record.frames_per_direction())
        .collect();

    for frame in &unreachable {
        warn!(
            "Record {}: trigger frame {} may have no effect because it is same or greater than frames_per_direction ({})",
            record.cof_name(),
            frame,
            record.frames_per_direction()
        );
    }
    unreachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionTriggers;

    fn record(name: &str, frames: u32) -> Record {
        Record::new(name, frames, 0, ActionTriggers::new()).unwrap()
    }

    #[test]
    fn test_sort_is_stable() {
        let mut records = vec![record("ZZS2HTH", 1), record("00A1HTH", 2), record("ZZS2HTH", 3)];
        sort_by_name(&mut records);

        let order: Vec<_> = records
            .iter()
            .map(|r| (r.cof_name(), r.frames_per_direction()))
            .collect();
        assert_eq!(order, [("00A1HTH", 2), ("ZZS2HTH", 1), ("ZZS2HTH", 3)]);
    }

    #[test]
    fn test_duplicates() {
        let mut records = vec![
            record("BVS1HTH", 9),
            record("AWS1HTH", 1),
            record("BVS1HTH", 17),
            record("BVS1HTH", 20),
        ];
        assert_eq!(find_duplicate_names(&records), ["BVS1HTH"]);

        dedupe_by_name(&mut records);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].frames_per_direction(), 9);
        assert_eq!(records[1].cof_name(), "AWS1HTH");
        assert!(find_duplicate_names(&records).is_empty());
    }

    #[test]
    fn test_trigger_bounds() {
        let mut record = record("AWS1HTH", 5);
        record.triggers_mut().set(4, 1).unwrap();
        assert!(check_trigger_bounds(&record).is_empty());

        record.triggers_mut().set(5, 2).unwrap();
        record.triggers_mut().set(100, 3).unwrap();
        assert_eq!(check_trigger_bounds(&record), [5, 100]);
    }
}
