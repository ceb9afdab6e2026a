//! Idempotent merge of freshly derived movements into a persisted collection.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use super::types::{IdentityKey, MergeError, MovementRecord};

/// Result of a merge: the full collection a sink should persist, and how much of it is new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
  pub records: Vec<MovementRecord>,
  pub added: usize,
}

impl MergeOutcome {
  /// True when nothing new was found; callers skip persisting entirely.
  pub fn is_unchanged(&self) -> bool {
    self.added == 0
  }
}

/// Merge `incoming` into `existing`.
///
/// Incoming records are deduplicated by identity (the last duplicate wins,
/// keeping the position of the first), records already present in `existing`
/// are dropped, and the union is stably sorted by timestamp. When nothing
/// survives, `existing` is returned untouched with `added == 0`.
///
/// Every incoming timestamp must parse, even for records that turn out to be
/// duplicates. Existing timestamps are only parsed when a sort is needed.
pub fn merge(
  existing: Vec<MovementRecord>,
  incoming: Vec<MovementRecord>,
) -> Result<MergeOutcome, MergeError> {
  for record in &incoming {
    record.parsed_timestamp()?;
  }

  let new_indices: Vec<usize> = {
    // Indices into `incoming` of one representative per identity, in first-seen order
    let mut representatives: Vec<usize> = Vec::with_capacity(incoming.len());
    let mut positions: HashMap<IdentityKey<'_>, usize> = HashMap::with_capacity(incoming.len());
    for (index, record) in incoming.iter().enumerate() {
      match positions.entry(record.identity()) {
        Entry::Occupied(slot) => representatives[*slot.get()] = index,
        Entry::Vacant(slot) => {
          slot.insert(representatives.len());
          representatives.push(index);
        }
      }
    }

    let known: HashSet<IdentityKey<'_>> = existing.iter().map(MovementRecord::identity).collect();
    representatives
      .into_iter()
      .filter(|&index| !known.contains(&incoming[index].identity()))
      .collect()
  };

  if new_indices.is_empty() {
    return Ok(MergeOutcome {
      records: existing,
      added: 0,
    });
  }

  let mut slots: Vec<Option<MovementRecord>> = incoming.into_iter().map(Some).collect();
  let new_records: Vec<MovementRecord> = new_indices
    .iter()
    .filter_map(|&index| slots[index].take())
    .collect();
  let added = new_records.len();

  let mut keyed = existing
    .into_iter()
    .chain(new_records)
    .map(|record| Ok((record.parsed_timestamp()?, record)))
    .collect::<Result<Vec<_>, MergeError>>()?;
  // sort_by_key is stable: equal timestamps keep their input order
  keyed.sort_by_key(|(timestamp, _)| *timestamp);

  Ok(MergeOutcome {
    records: keyed.into_iter().map(|(_, record)| record).collect(),
    added,
  })
}
