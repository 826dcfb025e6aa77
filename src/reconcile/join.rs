//! Pre-match stages: contributor scoping, legacy fallback, red-tag counting, eligibility and
//! the outer join on `item_code`.
//!
//! Every stage takes its input by value or by shared reference and returns a new value; none
//! of them mutates a table in place.

use std::collections::{BTreeMap, HashSet};

use crate::matching::is_placeholder;
use crate::types::Value;

use super::tables::{ClientRecord, ImplementationRecord};

/// Why an implementation row is kept out of matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Manufacturer is still the placeholder after legacy fallback.
    Placeholder,
    /// Item code, manufacturer or part number is missing.
    Incomplete,
}

/// Result of [`scope_to_contributors`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scoped {
    pub records: Vec<ImplementationRecord>,
    /// Rows (before scoping) created by an on-site contributor.
    pub created_items: usize,
    /// Rows removed because their last modifier is not on site.
    pub dropped: usize,
}

/// Keep only rows last modified by one of `contributors`.
///
/// An empty contributor list disables scoping and counts no created items.
pub fn scope_to_contributors(records: Vec<ImplementationRecord>, contributors: &[String]) -> Scoped {
    if contributors.is_empty() {
        return Scoped {
            records,
            created_items: 0,
            dropped: 0,
        };
    }

    let on_site: HashSet<&str> = contributors.iter().map(String::as_str).collect();
    let is_on_site = |v: &Value| v.present().is_some_and(|v| on_site.contains(&*v.coerce_text()));

    let created_items = records.iter().filter(|r| is_on_site(&r.created_by)).count();
    let before = records.len();
    let records: Vec<_> = records.into_iter().filter(|r| is_on_site(&r.modified_by)).collect();

    Scoped {
        dropped: before - records.len(),
        records,
        created_items,
    }
}

/// Replace a placeholder manufacturer with the row's legacy manufacturer, when there is one.
///
/// Returns the new rows and how many were rewritten.
pub fn apply_legacy_fallback(
    records: Vec<ImplementationRecord>,
    placeholder: &str,
) -> (Vec<ImplementationRecord>, usize) {
    let mut applied = 0;
    let records = records
        .into_iter()
        .map(|mut r| {
            if is_placeholder(&r.manufacturer, placeholder) && !r.legacy_manufacturer.is_null() {
                r.manufacturer = r.legacy_manufacturer.clone();
                applied += 1;
            }
            r
        })
        .collect();
    (records, applied)
}

/// A row is red-tagged when its description mentions "red tag", its part number mentions
/// "tbd" (both case-insensitive) or its manufacturer is the placeholder.
pub fn is_red_tag(record: &ImplementationRecord, placeholder: &str) -> bool {
    contains_ci(&record.description, "red tag")
        || contains_ci(&record.mnp, "tbd")
        || is_placeholder(&record.manufacturer, placeholder)
}

pub fn count_red_tags(records: &[ImplementationRecord], placeholder: &str) -> usize {
    records.iter().filter(|r| is_red_tag(r, placeholder)).count()
}

pub fn exclusion(record: &ImplementationRecord, placeholder: &str) -> Option<Exclusion> {
    if is_placeholder(&record.manufacturer, placeholder) {
        Some(Exclusion::Placeholder)
    } else if record.item_code.is_none() || record.manufacturer.is_null() || record.mnp.is_null() {
        Some(Exclusion::Incomplete)
    } else {
        None
    }
}

/// Case-insensitive substring test on the cell's text. `Null` never matches.
pub(crate) fn contains_ci(value: &Value, needle: &str) -> bool {
    value.present().is_some_and(|v| {
        v.coerce_text()
            .to_lowercase()
            .contains(&needle.to_lowercase())
    })
}

/// One row of the outer join. Either side may be absent, never both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedRecord<'a> {
    pub item_code: &'a str,
    pub client: Option<&'a ClientRecord>,
    pub implementation: Option<&'a ImplementationRecord>,
    /// Set when the implementation side exists but must not be matched.
    pub exclusion: Option<Exclusion>,
}

impl JoinedRecord<'_> {
    /// Implementation side usable for matching.
    pub fn matchable_implementation(&self) -> Option<&ImplementationRecord> {
        match self.exclusion {
            Some(_) => None,
            None => self.implementation,
        }
    }
}

/// Outer join on item code, ordered by item code.
///
/// Rows without an item code on either side take no part. Repeated codes pair every client
/// row with every implementation row for that code.
pub fn outer_join<'a>(
    client: &'a [ClientRecord],
    implementation: &'a [ImplementationRecord],
    placeholder: &str,
) -> Vec<JoinedRecord<'a>> {
    type Sides<'a> = (Vec<&'a ClientRecord>, Vec<&'a ImplementationRecord>);
    let mut by_code: BTreeMap<&'a str, Sides<'a>> = BTreeMap::new();

    for c in client {
        if let Some(code) = c.item_code.as_deref() {
            by_code.entry(code).or_default().0.push(c);
        }
    }
    for i in implementation {
        if let Some(code) = i.item_code.as_deref() {
            by_code.entry(code).or_default().1.push(i);
        }
    }

    let joined_row = |item_code: &'a str,
                      client: Option<&'a ClientRecord>,
                      implementation: Option<&'a ImplementationRecord>| JoinedRecord {
        item_code,
        client,
        implementation,
        exclusion: implementation.and_then(|i| exclusion(i, placeholder)),
    };

    let mut out = Vec::new();
    for (code, (clients, impls)) in by_code {
        match (clients.is_empty(), impls.is_empty()) {
            (false, true) => out.extend(clients.into_iter().map(|c| joined_row(code, Some(c), None))),
            (true, false) => out.extend(impls.into_iter().map(|i| joined_row(code, None, Some(i)))),
            _ => {
                for c in &clients {
                    for i in &impls {
                        out.push(joined_row(code, Some(*c), Some(*i)));
                    }
                }
            }
        }
    }
    out
}
