//! Aggregate counts and percentages for a reconciliation run.
//!
//! Every count is a plain sum over rows, so partial tallies can be merged in any order
//! ([`MatchTally::merge`]) and the result does not depend on how rows were scheduled.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::matching::{is_placeholder, round1, MNP_MATCH};
use crate::types::Value;

use super::join::contains_ci;
use super::result::ResultRow;
use super::tables::{ClientRecord, ImplementationRecord};

/// Statistics for one run.
///
/// Percentages are on a 0..=100 scale with one decimal; a zero denominator yields `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationStats {
    /// Rows in the client catalog.
    pub client_items: usize,
    /// Implementation rows after contributor scoping.
    pub implementation_items: usize,
    /// `client_items - implementation_items`; negative when the implementation side is larger.
    pub remaining_items: i64,
    /// Implementation rows created by an on-site contributor, counted before scoping.
    pub created_items: usize,
    /// Scoped implementation rows flagged by [`super::join::is_red_tag`].
    pub red_tags: usize,
    /// Rows on either side with no item code; they never join.
    pub rows_missing_item_code: usize,
    /// Result rows without any verdict.
    pub excluded_from_matching: usize,

    /// Client rows with a manufacturer other than the placeholder.
    pub known_manufacturer_client: usize,
    pub known_manufacturer_client_pct: f64,
    /// Implementation rows with a manufacturer other than the placeholder, after legacy
    /// fallback.
    pub known_manufacturer_implementation: usize,
    /// Known implementation manufacturers as a share of the client catalog.
    pub known_manufacturer_provided_pct: f64,
    /// Known implementation manufacturers as a share of the implementation catalog.
    pub known_manufacturer_implementation_pct: f64,

    /// Client rows with a part number that does not mention `tbd`.
    pub known_mnp_client: usize,
    pub known_mnp_client_pct: f64,
    /// Implementation rows with a part number that does not mention `tbd`.
    pub known_mnp_implementation: usize,
    /// Known implementation part numbers as a share of the client catalog.
    pub known_mnp_implementation_pct: f64,

    /// Rows with manufacturer verdict `1`.
    pub manufacturer_matches: usize,
    /// Matches over `implementation_items + created_items`.
    pub manufacturer_match_rate: f64,
    /// Rows with a part-number verdict of exactly `100`.
    pub mnp_matches: usize,
    /// Matches over `implementation_items + created_items`.
    pub mnp_match_rate: f64,
    /// Compared but not matching: the remaining manufacturer work.
    pub manufacturer_unmatched: usize,
    /// Compared but not a full part-number match.
    pub mnp_unmatched: usize,
}

impl ReconciliationStats {
    /// Flatten into metric name -> value, for renderers that should not know the struct.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("client_items", self.client_items as f64),
            ("implementation_items", self.implementation_items as f64),
            ("remaining_items", self.remaining_items as f64),
            ("created_items", self.created_items as f64),
            ("red_tags", self.red_tags as f64),
            ("rows_missing_item_code", self.rows_missing_item_code as f64),
            ("excluded_from_matching", self.excluded_from_matching as f64),
            ("known_manufacturer_client", self.known_manufacturer_client as f64),
            ("known_manufacturer_client_pct", self.known_manufacturer_client_pct),
            ("known_manufacturer_implementation", self.known_manufacturer_implementation as f64),
            ("known_manufacturer_provided_pct", self.known_manufacturer_provided_pct),
            ("known_manufacturer_implementation_pct", self.known_manufacturer_implementation_pct),
            ("known_mnp_client", self.known_mnp_client as f64),
            ("known_mnp_client_pct", self.known_mnp_client_pct),
            ("known_mnp_implementation", self.known_mnp_implementation as f64),
            ("known_mnp_implementation_pct", self.known_mnp_implementation_pct),
            ("manufacturer_matches", self.manufacturer_matches as f64),
            ("manufacturer_match_rate", self.manufacturer_match_rate),
            ("mnp_matches", self.mnp_matches as f64),
            ("mnp_match_rate", self.mnp_match_rate),
            ("manufacturer_unmatched", self.manufacturer_unmatched as f64),
            ("mnp_unmatched", self.mnp_unmatched as f64),
        ])
    }
}

/// Verdict counts over result rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchTally {
    /// Manufacturer verdict `1`.
    pub manufacturer_matches: usize,
    /// Manufacturer verdict `0`.
    pub manufacturer_unmatched: usize,
    /// Part-number verdict `100`.
    pub mnp_matches: usize,
    /// Any other part-number verdict.
    pub mnp_unmatched: usize,
    /// Rows without either verdict.
    pub excluded: usize,
}

impl MatchTally {
    pub fn add(mut self, row: &ResultRow) -> Self {
        match row.manufacturer_match {
            Some(1) => self.manufacturer_matches += 1,
            Some(_) => self.manufacturer_unmatched += 1,
            None => {}
        }
        match row.mnp_match {
            Some(v) if v == MNP_MATCH => self.mnp_matches += 1,
            Some(_) => self.mnp_unmatched += 1,
            None => {}
        }
        if row.manufacturer_match.is_none() && row.mnp_match.is_none() {
            self.excluded += 1;
        }
        self
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            manufacturer_matches: self.manufacturer_matches + other.manufacturer_matches,
            manufacturer_unmatched: self.manufacturer_unmatched + other.manufacturer_unmatched,
            mnp_matches: self.mnp_matches + other.mnp_matches,
            mnp_unmatched: self.mnp_unmatched + other.mnp_unmatched,
            excluded: self.excluded + other.excluded,
        }
    }

    pub fn of(rows: &[ResultRow]) -> Self {
        rows.iter().fold(Self::default(), Self::add)
    }
}

/// Everything [`aggregate`] needs besides the verdict tally.
pub(crate) struct Inputs<'a> {
    pub client: &'a [ClientRecord],
    /// Scoped, post-fallback, pre-filter implementation rows.
    pub implementation: &'a [ImplementationRecord],
    pub created_items: usize,
    pub red_tags: usize,
    pub placeholder: &'a str,
}

pub(crate) fn aggregate(inputs: &Inputs<'_>, tally: MatchTally) -> ReconciliationStats {
    let client_items = inputs.client.len();
    let implementation_items = inputs.implementation.len();
    let known_manufacturer = |v: &Value| is_known_manufacturer(v, inputs.placeholder);

    let known_manufacturer_client = inputs
        .client
        .iter()
        .filter(|r| known_manufacturer(&r.manufacturer))
        .count();
    let known_manufacturer_implementation = inputs
        .implementation
        .iter()
        .filter(|r| known_manufacturer(&r.manufacturer))
        .count();
    let known_mnp_client = inputs.client.iter().filter(|r| is_known_mnp(&r.mnp)).count();
    let known_mnp_implementation = inputs.implementation.iter().filter(|r| is_known_mnp(&r.mnp)).count();

    let rows_missing_item_code = inputs.client.iter().filter(|r| r.item_code.is_none()).count()
        + inputs.implementation.iter().filter(|r| r.item_code.is_none()).count();

    let rate_base = implementation_items + inputs.created_items;

    ReconciliationStats {
        client_items,
        implementation_items,
        remaining_items: client_items as i64 - implementation_items as i64,
        created_items: inputs.created_items,
        red_tags: inputs.red_tags,
        rows_missing_item_code,
        excluded_from_matching: tally.excluded,

        known_manufacturer_client,
        known_manufacturer_client_pct: percent(known_manufacturer_client, client_items),
        known_manufacturer_implementation,
        known_manufacturer_provided_pct: percent(known_manufacturer_implementation, client_items),
        known_manufacturer_implementation_pct: percent(known_manufacturer_implementation, implementation_items),

        known_mnp_client,
        known_mnp_client_pct: percent(known_mnp_client, client_items),
        known_mnp_implementation,
        known_mnp_implementation_pct: percent(known_mnp_implementation, client_items),

        manufacturer_matches: tally.manufacturer_matches,
        manufacturer_match_rate: percent(tally.manufacturer_matches, rate_base),
        mnp_matches: tally.mnp_matches,
        mnp_match_rate: percent(tally.mnp_matches, rate_base),
        manufacturer_unmatched: tally.manufacturer_unmatched,
        mnp_unmatched: tally.mnp_unmatched,
    }
}

fn is_known_manufacturer(value: &Value, placeholder: &str) -> bool {
    !value.is_null() && !is_placeholder(value, placeholder)
}

fn is_known_mnp(value: &Value) -> bool {
    !value.is_null() && !contains_ci(value, "tbd")
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(manufacturer_match: Option<u8>, mnp_match: Option<f64>) -> ResultRow {
        ResultRow {
            item_code: "1".to_string(),
            manufacturer_client: Value::Null,
            manufacturer_implementation: Value::Null,
            manufacturer_match,
            mnp_client: Value::Null,
            mnp_implementation: Value::Null,
            mnp_match,
        }
    }

    #[test]
    fn tally_counts_each_family_independently() {
        let rows = vec![
            row(Some(1), Some(100.0)),
            row(Some(0), Some(0.0)),
            row(Some(1), None),
            row(None, Some(83.3)),
            row(None, None),
        ];
        let tally = MatchTally::of(&rows);
        assert_eq!(
            tally,
            MatchTally {
                manufacturer_matches: 2,
                manufacturer_unmatched: 1,
                mnp_matches: 1,
                mnp_unmatched: 2,
                excluded: 1,
            }
        );
    }

    #[test]
    fn tally_merge_is_order_independent() {
        let rows: Vec<ResultRow> = (0..9)
            .map(|i| {
                let manufacturer = if i % 3 == 0 { None } else { Some((i % 2) as u8) };
                let mnp = if i % 4 == 0 { 100.0 } else { 10.0 };
                row(manufacturer, Some(mnp))
            })
            .collect();
        let whole = MatchTally::of(&rows);
        let (a, b) = rows.split_at(4);
        assert_eq!(MatchTally::of(a).merge(MatchTally::of(b)), whole);
        assert_eq!(MatchTally::of(b).merge(MatchTally::of(a)), whole);
    }

    #[test]
    fn percent_rounds_and_guards_zero() {
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(5, 0), 0.0);
        assert_eq!(percent(4, 4), 100.0);
        assert_eq!(percent(1, 16), 6.2);
        assert_eq!(percent(3, 16), 18.8);
    }

    #[test]
    fn known_values_exclude_placeholders_and_nulls() {
        let tbd = "TBD - To Be Determined";
        assert!(is_known_manufacturer(&Value::text("Acme"), tbd));
        assert!(!is_known_manufacturer(&Value::text(tbd), tbd));
        assert!(!is_known_manufacturer(&Value::Null, tbd));
        assert!(is_known_mnp(&Value::Int64(42)));
        assert!(!is_known_mnp(&Value::text("TBD-1")));
        assert!(!is_known_mnp(&Value::Null));
    }

    #[test]
    fn to_map_exposes_every_metric() {
        let stats = aggregate(
            &Inputs {
                client: &[],
                implementation: &[],
                created_items: 0,
                red_tags: 0,
                placeholder: "TBD",
            },
            MatchTally::default(),
        );
        let map = stats.to_map();
        assert_eq!(map.len(), 22);
        assert!(map.values().all(|v| *v == 0.0));
    }
}
