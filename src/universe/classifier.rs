//! Metadata row classifier
//!
//! Keyword families are applied in fixed priority: customer/contract
//! metadata, then table headers, then summaries/totals. The first family
//! that matches marks the row as metadata. Output is a pure function of the
//! input rows; re-running on unchanged rows reproduces it exactly.

use super::amount::parse_amount;
use super::types::{LockClass, RawCoverageRow, UniverseLockRecord};

/// A named, ordered list of metadata keywords.
#[derive(Debug, Clone)]
pub struct KeywordFamily {
    pub name: &'static str,
    pub keywords: Vec<&'static str>,
}

impl KeywordFamily {
    fn find(&self, stripped: &str) -> Option<&'static str> {
        self.keywords
            .iter()
            .copied()
            .find(|kw| stripped.contains(&strip_whitespace(kw)))
    }
}

#[derive(Debug, Clone)]
pub struct MetaRowClassifier {
    families: Vec<KeywordFamily>,
}

impl Default for MetaRowClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaRowClassifier {
    pub fn new() -> Self {
        Self {
            families: vec![
                KeywordFamily {
                    name: "customer_meta",
                    keywords: vec![
                        "피보험자", "계약자", "수익자", "보험기간", "납입기간", "납입주기",
                        "가입나이", "생년월일", "성별", "증권번호", "상품명", "만기",
                    ],
                },
                KeywordFamily {
                    name: "table_header",
                    keywords: vec![
                        "담보명", "보장명", "가입금액", "보험료(원)", "구분", "보장내용",
                        "납기/만기",
                    ],
                },
                KeywordFamily {
                    name: "summary_total",
                    keywords: vec!["합계", "총보험료", "소계", "합산", "월납보험료", "보험료합계"],
                },
            ],
        }
    }

    pub fn families(&self) -> &[KeywordFamily] {
        &self.families
    }

    /// Classifies rows, one record per row, in input order.
    pub fn classify(&self, rows: &[RawCoverageRow]) -> Vec<UniverseLockRecord> {
        rows.iter().map(|r| self.classify_row(r)).collect()
    }

    /// Classifies a single row.
    pub fn classify_row(&self, row: &RawCoverageRow) -> UniverseLockRecord {
        let amount_won = row.raw_amount_text.as_deref().and_then(parse_amount);

        if let Some((family, keyword)) = self.match_meta(row) {
            return UniverseLockRecord {
                row_ref: row.row_ref(),
                lock_class: LockClass::NonUniverseMeta,
                lock_reason: format!("{}:{}", family, keyword),
                amount_won,
            };
        }

        match amount_won {
            Some(won) => UniverseLockRecord {
                row_ref: row.row_ref(),
                lock_class: LockClass::UniverseCoverage,
                lock_reason: format!("amount:{}", won),
                amount_won,
            },
            None => UniverseLockRecord {
                row_ref: row.row_ref(),
                lock_class: LockClass::Unclassified,
                lock_reason: "no_amount".into(),
                amount_won: None,
            },
        }
    }

    fn match_meta(&self, row: &RawCoverageRow) -> Option<(&'static str, &'static str)> {
        let name = strip_whitespace(&row.raw_name);
        let category = row.category.as_deref().map(strip_whitespace);

        for family in &self.families {
            if let Some(kw) = family.find(&name) {
                return Some((family.name, kw));
            }
            if let Some(kw) = category.as_deref().and_then(|c| family.find(c)) {
                return Some((family.name, kw));
            }
        }
        None
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
