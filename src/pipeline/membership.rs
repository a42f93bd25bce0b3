//! Universe membership of a query
//!
//! A query is in an insurer's universe when one of the insurer's
//! UNIVERSE_COVERAGE rows names it: either the normalized row name equals
//! the normalized query, or the row's recall set shares a code with the
//! query's recall set. Metadata and unclassified rows never count.

use crate::alias::{normalize, AliasIndex, CandidateSet};
use crate::universe::{RawCoverageRow, UniverseLockRecord};

/// The universe row a query resolved to.
#[derive(Debug, Clone, Copy)]
pub struct UniverseMatch<'a> {
    pub row: &'a RawCoverageRow,
    pub record: &'a UniverseLockRecord,
}

/// Finds the universe row for `query`. Exact name matches win over recall
/// overlap; within each kind the first row in input order wins.
pub fn find_universe_row<'a>(
    index: &AliasIndex,
    query: &str,
    query_recall: &CandidateSet,
    rows: &'a [RawCoverageRow],
    records: &'a [UniverseLockRecord],
) -> Option<UniverseMatch<'a>> {
    let key = normalize(query);
    let universe = || {
        rows.iter()
            .zip(records.iter())
            .filter(|(_, record)| record.is_universe())
    };

    if !key.is_empty() {
        if let Some((row, record)) = universe().find(|(row, _)| normalize(&row.raw_name) == key) {
            return Some(UniverseMatch { row, record });
        }
    }
    if query_recall.is_empty() {
        return None;
    }
    universe()
        .find(|(row, _)| index.recall(&row.raw_name).intersects(query_recall))
        .map(|(row, record)| UniverseMatch { row, record })
}
