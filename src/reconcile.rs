//! Reconciliation engine
//!
//! Classifies every game known to either side of a comparison: the registry's
//! local view and the authoritative status list from the backend. Games are
//! matched on `(console_id, name)`.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::model::{CompareRecord, CompareStatus, CompletionStatus, ConsoleId, ConsoleSource, Game};

/// One side's view of a game's completion status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub console_id: ConsoleId,
    pub console_name: String,
    pub name: String,
    pub status: CompletionStatus,
}

impl StatusEntry {
    fn key(&self) -> (ConsoleId, &str) {
        (self.console_id, self.name.as_str())
    }
}

impl From<&Game> for StatusEntry {
    fn from(game: &Game) -> Self {
        Self {
            console_id: game.console_id,
            console_name: game.console_name.clone(),
            name: game.title.clone(),
            status: game.completion_status,
        }
    }
}

/// Diff `local` against `remote`, producing one record per distinct key.
///
/// Local order comes first, then remote-only entries in remote order. A key
/// repeated on one side counts once, first occurrence winning.
pub fn reconcile(
    source: ConsoleSource,
    local: &[StatusEntry],
    remote: &[StatusEntry],
) -> Vec<CompareRecord> {
    let mut remote_by_key: HashMap<(ConsoleId, &str), &StatusEntry> =
        HashMap::with_capacity(remote.len());
    for entry in remote {
        remote_by_key.entry(entry.key()).or_insert(entry);
    }

    let mut seen = HashSet::with_capacity(local.len());
    let mut records = Vec::with_capacity(local.len().max(remote.len()));

    for entry in local {
        if !seen.insert(entry.key()) {
            continue;
        }
        records.push(match remote_by_key.get(&entry.key()) {
            Some(theirs) if theirs.status == entry.status => {
                record(source, entry, CompareStatus::Ok, Some(entry.status), Some(theirs.status))
            }
            Some(theirs) => record(
                source,
                entry,
                CompareStatus::CompletionStatusDifferent,
                Some(entry.status),
                Some(theirs.status),
            ),
            None => record(source, entry, CompareStatus::NotInDatabase, Some(entry.status), None),
        });
    }

    for entry in remote {
        if !seen.insert(entry.key()) {
            continue;
        }
        records.push(record(source, entry, CompareStatus::NotInLocal, None, Some(entry.status)));
    }

    records
}

fn record(
    source: ConsoleSource,
    entry: &StatusEntry,
    status: CompareStatus,
    local_status: Option<CompletionStatus>,
    remote_status: Option<CompletionStatus>,
) -> CompareRecord {
    CompareRecord {
        source,
        console_id: entry.console_id,
        console_name: entry.console_name.clone(),
        name: entry.name.clone(),
        status,
        local_status,
        remote_status,
    }
}

/// Case-insensitive name ordering, falling back to the raw names.
fn by_name(a: &CompareRecord, b: &CompareRecord) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Latest reconciliation results, one full record set per source.
///
/// Each pass replaces the previous set for its source.
#[derive(Debug, Clone, Default)]
pub struct CompareBook {
    records: HashMap<ConsoleSource, Vec<CompareRecord>>,
}

impl CompareBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the records of a pass, returning the ones they replace.
    pub fn replace(
        &mut self,
        source: ConsoleSource,
        records: Vec<CompareRecord>,
    ) -> Option<Vec<CompareRecord>> {
        self.records.insert(source, records)
    }

    pub fn get(&self, source: ConsoleSource) -> Option<&[CompareRecord]> {
        self.records.get(&source).map(Vec::as_slice)
    }

    pub fn sources(&self) -> Vec<ConsoleSource> {
        ConsoleSource::ALL
            .into_iter()
            .filter(|s| self.records.contains_key(s))
            .collect()
    }

    /// Bucketed view across every stored source.
    pub fn summary(&self) -> CompareSummary {
        CompareSummary::from_records(
            ConsoleSource::ALL
                .iter()
                .filter_map(|s| self.records.get(s))
                .flatten(),
        )
    }

    /// Bucketed view of one source.
    pub fn summary_for(&self, source: ConsoleSource) -> CompareSummary {
        CompareSummary::from_records(self.records.get(&source).into_iter().flatten())
    }
}

/// Reconciliation results grouped for presentation.
///
/// `OK` records are only counted. The other buckets are sorted by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareSummary {
    pub ok_count: usize,
    pub status_different: Vec<CompareRecord>,
    pub not_in_local: Vec<CompareRecord>,
    pub not_in_database: Vec<CompareRecord>,
}

impl CompareSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CompareRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.status {
                CompareStatus::Ok => summary.ok_count += 1,
                CompareStatus::CompletionStatusDifferent => {
                    summary.status_different.push(record.clone())
                }
                CompareStatus::NotInLocal => summary.not_in_local.push(record.clone()),
                CompareStatus::NotInDatabase => summary.not_in_database.push(record.clone()),
            }
        }
        summary.status_different.sort_by(by_name);
        summary.not_in_local.sort_by(by_name);
        summary.not_in_database.sort_by(by_name);
        summary
    }

    /// Records needing attention.
    pub fn mismatch_count(&self) -> usize {
        self.status_different.len() + self.not_in_local.len() + self.not_in_database.len()
    }

    pub fn total(&self) -> usize {
        self.ok_count + self.mismatch_count()
    }
}
