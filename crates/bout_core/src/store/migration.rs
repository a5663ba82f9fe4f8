use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use super::error::StoreError;
use super::record::StoredMatch;
use super::repository::MatchStore;
use crate::models::Match;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    /// Already in the store.
    pub skipped: usize,
    /// Dropped while merging because an earlier record had the same id.
    pub duplicates: usize,
    /// Records without a usable id that were given one.
    pub renumbered: usize,
}

/// Legacy lists merged into one, with what the merge dropped or changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyMerge {
    pub matches: Vec<Match>,
    pub duplicates: usize,
    pub renumbered: usize,
}

/// Keys the scoring pages kept match lists under, oldest first.
pub const LEGACY_LIST_KEYS: [&str; 2] = ["matches", "gameHistory"];

/// Splits a legacy export into its match lists.
///
/// Accepts a bare array, or an object holding the lists under
/// [`LEGACY_LIST_KEYS`]. A store document is read through its `matches`.
pub fn legacy_sources(value: Value) -> Result<Vec<Vec<StoredMatch>>, StoreError> {
    match value {
        Value::Array(_) => Ok(vec![serde_json::from_value(value)?]),
        Value::Object(mut map) => {
            let mut sources = Vec::new();
            for key in LEGACY_LIST_KEYS {
                match map.remove(key) {
                    Some(Value::Null) | None => {}
                    Some(list) => sources.push(serde_json::from_value(list)?),
                }
            }
            Ok(sources)
        }
        _ => Err(StoreError::Corrupted),
    }
}

/// Merges several legacy match lists into one, in source order.
///
/// Records sharing an id with an earlier one are dropped. Records with a
/// missing or non-numeric id are never treated as duplicates: each gets a
/// fresh id from its date in milliseconds, bumped past every id already
/// taken. The numbering only depends on the sources, so importing the same
/// export twice yields the same ids.
pub fn merge_legacy(sources: Vec<Vec<StoredMatch>>) -> LegacyMerge {
    let mut taken: HashSet<u64> =
        sources.iter().flatten().filter_map(StoredMatch::stored_id).collect();
    let mut seen = HashSet::new();
    let mut merged = LegacyMerge::default();

    for (source, records) in sources.into_iter().enumerate() {
        let mut dropped = 0usize;
        for record in records {
            let mut m = record.decode();
            match record.stored_id() {
                Some(id) => {
                    if !seen.insert(id) {
                        dropped += 1;
                        continue;
                    }
                }
                None => {
                    let mut id = m.date.timestamp_millis().max(1) as u64;
                    while !taken.insert(id) {
                        id += 1;
                    }
                    tracing::debug!(source, raw_id = ?record.id, match_id = id, "legacy match given a fresh id");
                    m.id = id;
                    merged.renumbered += 1;
                }
            }
            merged.matches.push(m);
        }
        if dropped > 0 {
            tracing::debug!(source, dropped, "duplicate legacy matches dropped");
        }
        merged.duplicates += dropped;
    }
    merged
}

/// Appends every match whose id the store does not hold yet.
pub fn import_into<S: MatchStore + ?Sized>(
    store: &mut S,
    matches: Vec<Match>,
) -> Result<ImportReport, StoreError> {
    let snapshot = store.snapshot()?;
    let mut known: HashSet<u64> = snapshot.matches.iter().map(|m| m.id).collect();
    let mut revision = snapshot.revision;
    let mut report = ImportReport::default();

    for m in matches {
        if !known.insert(m.id) {
            report.skipped += 1;
            continue;
        }
        if let Err(e) = m.validate() {
            tracing::warn!(match_id = m.id, error = %e, "imported match is inconsistent");
        }
        revision = store.append_match_at(revision, m)?;
        report.imported += 1;
    }

    tracing::info!(imported = report.imported, skipped = report.skipped, "matches imported");
    Ok(report)
}

/// Merges legacy lists and appends the result to `store`.
pub fn import_legacy<S: MatchStore + ?Sized>(
    store: &mut S,
    sources: Vec<Vec<StoredMatch>>,
) -> Result<ImportReport, StoreError> {
    let merged = merge_legacy(sources);
    let mut report = import_into(store, merged.matches)?;
    report.duplicates = merged.duplicates;
    report.renumbered = merged.renumbered;
    tracing::info!(
        imported = report.imported,
        skipped = report.skipped,
        duplicates = report.duplicates,
        renumbered = report.renumbered,
        "legacy import finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn legacy(value: serde_json::Value) -> Vec<StoredMatch> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let matches = legacy(json!([
            { "id": 1, "redFencer": "Alice", "greenFencer": "Bob", "redScore": 5, "greenScore": 3 },
            { "id": 2, "redFencer": "Alice", "greenFencer": "Carol", "redScore": 1, "greenScore": 5 }
        ]));
        let game_history = legacy(json!([
            { "id": 2, "redFencer": "Someone", "greenFencer": "Else" },
            { "id": 3, "redFencer": "Bob", "greenFencer": "Carol", "redScore": 2, "greenScore": 2 }
        ]));

        let merged = merge_legacy(vec![matches, game_history]);
        let ids: Vec<u64> = merged.matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(merged.matches[1].red.name, "Alice");
        assert_eq!((merged.duplicates, merged.renumbered), (1, 0));
    }

    #[test]
    fn test_records_without_numeric_id_are_all_kept() {
        let records = legacy(json!([
            { "date": "2024-03-01T10:00:00.000Z", "redFencer": "Alice", "greenFencer": "Bob",
              "redScore": 5, "greenScore": 3 },
            { "date": "2024-03-01T10:00:00.000Z", "redFencer": "Carol", "greenFencer": "Dan",
              "redScore": 2, "greenScore": 5 },
            { "id": "abc", "redFencer": "Eve", "greenFencer": "Frank", "redScore": 1, "greenScore": 0 }
        ]));

        let merged = merge_legacy(vec![records.clone()]);
        assert_eq!(merged.matches.len(), 3);
        assert_eq!((merged.duplicates, merged.renumbered), (0, 3));
        let ids: HashSet<u64> = merged.matches.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&0));
        // Same date, so the second record is bumped past the first.
        assert_eq!(merged.matches[0].id, 1_709_287_200_000);
        assert_eq!(merged.matches[1].id, 1_709_287_200_001);

        let mut store = MemoryStore::new();
        let report = import_legacy(&mut store, vec![records.clone()]).unwrap();
        assert_eq!(report, ImportReport { imported: 3, skipped: 0, duplicates: 0, renumbered: 3 });
        let names: Vec<String> = store.list_matches().unwrap().iter().map(|m| m.red.name.clone()).collect();
        assert_eq!(names, vec!["Alice", "Carol", "Eve"]);

        // A second import of the same export numbers identically and adds nothing.
        let again = import_legacy(&mut store, vec![records]).unwrap();
        assert_eq!((again.imported, again.skipped), (0, 3));
    }

    #[test]
    fn test_fresh_ids_avoid_real_ids() {
        let records = legacy(json!([
            { "date": "1970-01-01T00:00:00.001Z", "redFencer": "Alice", "greenFencer": "Bob" },
            { "id": 1, "redFencer": "Carol", "greenFencer": "Dan" }
        ]));
        let merged = merge_legacy(vec![records]);
        let ids: Vec<u64> = merged.matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_legacy_sources_shapes() {
        let bare = legacy_sources(json!([{ "id": 1 }])).unwrap();
        assert_eq!(bare.len(), 1);

        let keyed = legacy_sources(json!({
            "gameHistory": [{ "id": 2 }],
            "matches": [{ "id": 1 }, { "id": 3 }],
            "settings": {}
        }))
        .unwrap();
        let ids: Vec<Vec<u64>> = keyed.iter().map(|s| s.iter().map(StoredMatch::id).collect()).collect();
        assert_eq!(ids, vec![vec![1, 3], vec![2]]);

        assert!(matches!(legacy_sources(json!(42)), Err(StoreError::Corrupted)));
    }

    #[test]
    fn test_import_skips_known_ids() {
        let mut store = MemoryStore::new();
        let first = merge_legacy(vec![legacy(json!([
            { "id": 1, "redFencer": "Alice", "greenFencer": "Bob" }
        ]))]);
        let report = import_into(&mut store, first.matches).unwrap();
        assert_eq!((report.imported, report.skipped), (1, 0));

        let again = merge_legacy(vec![legacy(json!([
            { "id": 1, "redFencer": "Alice", "greenFencer": "Bob" },
            { "id": 9, "redFencer": "Alice", "greenFencer": "Dan" }
        ]))]);
        let report = import_into(&mut store, again.matches).unwrap();
        assert_eq!((report.imported, report.skipped), (1, 1));
        assert_eq!(store.list_matches().unwrap().len(), 2);
    }
}
