//! Required comparison slots
//!
//! A slot is a field of the matched universe row that must be present for
//! a comparison to be complete.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::universe::{RawCoverageRow, UniverseLockRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredSlot {
    /// Parsed won amount
    Amount,
    /// Row category text
    Category,
    /// Source page number
    Page,
}

impl RequiredSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredSlot::Amount => "amount",
            RequiredSlot::Category => "category",
            RequiredSlot::Page => "page",
        }
    }

    pub fn is_present(&self, row: &RawCoverageRow, record: &UniverseLockRecord) -> bool {
        match self {
            RequiredSlot::Amount => record.amount_won.is_some(),
            RequiredSlot::Category => row
                .category
                .as_deref()
                .map(|c| !c.trim().is_empty())
                .unwrap_or(false),
            RequiredSlot::Page => row.page > 0,
        }
    }
}

impl fmt::Display for RequiredSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequiredSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amount" => Ok(RequiredSlot::Amount),
            "category" => Ok(RequiredSlot::Category),
            "page" => Ok(RequiredSlot::Page),
            other => Err(format!("unknown required slot '{}'", other)),
        }
    }
}

/// Slots from `required` that the row lacks, in the given order.
pub fn missing_slots(
    required: &[RequiredSlot],
    row: &RawCoverageRow,
    record: &UniverseLockRecord,
) -> Vec<RequiredSlot> {
    required
        .iter()
        .copied()
        .filter(|slot| !slot.is_present(row, record))
        .collect()
}
