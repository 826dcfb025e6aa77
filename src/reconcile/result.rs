//! Per-item result rows and their tabular form.

use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::tables::{
    ITEM_CODE, MANUFACTURER_CLIENT, MANUFACTURER_IMPLEMENTATION, MNP_CLIENT, MNP_IMPLEMENTATION,
};

pub const MANUFACTURER_MATCH: &str = "manufacturer_match";
pub const MNP_MATCH: &str = "mnp_match";

/// One reconciled item.
///
/// Values are the original cells (the implementation manufacturer after legacy fallback);
/// normalized forms are never kept. A `None` verdict means the field was not compared.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub item_code: String,
    pub manufacturer_client: Value,
    pub manufacturer_implementation: Value,
    /// `1` match, `0` no match.
    pub manufacturer_match: Option<u8>,
    pub mnp_client: Value,
    pub mnp_implementation: Value,
    /// `100`/`0` under a binary policy, raw similarity otherwise.
    pub mnp_match: Option<f64>,
}

/// All reconciled items, ordered by item code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows for one item code (several when the code repeats in an input).
    pub fn rows_for<'a>(&'a self, item_code: &'a str) -> impl Iterator<Item = &'a ResultRow> + 'a {
        self.rows.iter().filter(move |r| r.item_code == item_code)
    }

    /// Column layout of [`ResultTable::to_dataset`].
    pub fn schema() -> Schema {
        Schema::new(vec![
            Field::new(ITEM_CODE, DataType::Utf8),
            Field::new(MANUFACTURER_CLIENT, DataType::Utf8),
            Field::new(MANUFACTURER_IMPLEMENTATION, DataType::Utf8),
            Field::new(MANUFACTURER_MATCH, DataType::Int64),
            Field::new(MNP_CLIENT, DataType::Utf8),
            Field::new(MNP_IMPLEMENTATION, DataType::Utf8),
            Field::new(MNP_MATCH, DataType::Float64),
        ])
    }

    /// Render as a [`DataSet`] for a writer/renderer. Missing verdicts become `Null`.
    pub fn to_dataset(&self) -> DataSet {
        let rows = self
            .rows
            .iter()
            .map(|r| {
                vec![
                    Value::text(r.item_code.as_str()),
                    r.manufacturer_client.clone(),
                    r.manufacturer_implementation.clone(),
                    r.manufacturer_match
                        .map(|v| Value::Int64(i64::from(v)))
                        .unwrap_or(Value::Null),
                    r.mnp_client.clone(),
                    r.mnp_implementation.clone(),
                    r.mnp_match.map(Value::Float64).unwrap_or(Value::Null),
                ]
            })
            .collect();
        DataSet::new(Self::schema(), rows)
    }
}
