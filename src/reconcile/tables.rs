//! Logical input schemas and typed row views.
//!
//! Column selection and renaming happen upstream; by the time a [`DataSet`] reaches the
//! reconciler it must use the column names below. Column order does not matter and extra
//! columns are ignored.

use crate::error::{ReconError, ReconResult};
use crate::types::{DataSet, Value};

pub const ITEM_CODE: &str = "item_code";
pub const MANUFACTURER_CLIENT: &str = "manufacturer_client";
pub const MNP_CLIENT: &str = "mnp_client";
pub const MANUFACTURER_IMPLEMENTATION: &str = "manufacturer_implementation";
pub const MNP_IMPLEMENTATION: &str = "mnp_implementation";
pub const LEGACY_MANUFACTURER: &str = "legacy_manufacturer";
pub const DESCRIPTION: &str = "description";
pub const MODIFIED_BY: &str = "modified_by";
pub const CREATED_BY: &str = "created_by";

/// One row of the client catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    /// Join key as text; `None` when the cell was empty.
    pub item_code: Option<String>,
    pub manufacturer: Value,
    pub mnp: Value,
}

/// One row of the implementation catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplementationRecord {
    /// Join key as text; `None` when the cell was empty.
    pub item_code: Option<String>,
    pub manufacturer: Value,
    pub mnp: Value,
    pub legacy_manufacturer: Value,
    pub description: Value,
    pub modified_by: Value,
    pub created_by: Value,
}

/// Read the client table, failing if a required column is missing.
pub fn client_records(dataset: &DataSet) -> ReconResult<Vec<ClientRecord>> {
    let item = require_column(dataset, "client", ITEM_CODE)?;
    let manufacturer = require_column(dataset, "client", MANUFACTURER_CLIENT)?;
    let mnp = require_column(dataset, "client", MNP_CLIENT)?;

    Ok((0..dataset.row_count())
        .map(|row| ClientRecord {
            item_code: item_code_text(dataset.value(row, item)),
            manufacturer: dataset.value(row, manufacturer).clone(),
            mnp: dataset.value(row, mnp).clone(),
        })
        .collect())
}

/// Read the implementation table.
///
/// `require_contributors` makes `modified_by`/`created_by` mandatory; otherwise every
/// optional column missing from the schema reads as `Null`.
pub fn implementation_records(
    dataset: &DataSet,
    require_contributors: bool,
) -> ReconResult<Vec<ImplementationRecord>> {
    let item = require_column(dataset, "implementation", ITEM_CODE)?;
    let manufacturer = require_column(dataset, "implementation", MANUFACTURER_IMPLEMENTATION)?;
    let mnp = require_column(dataset, "implementation", MNP_IMPLEMENTATION)?;
    let legacy = dataset.schema.index_of(LEGACY_MANUFACTURER);
    let description = dataset.schema.index_of(DESCRIPTION);
    let (modified_by, created_by) = if require_contributors {
        (
            Some(require_column(dataset, "implementation", MODIFIED_BY)?),
            Some(require_column(dataset, "implementation", CREATED_BY)?),
        )
    } else {
        (
            dataset.schema.index_of(MODIFIED_BY),
            dataset.schema.index_of(CREATED_BY),
        )
    };

    let optional = |row: usize, col: Option<usize>| match col {
        Some(col) => dataset.value(row, col).clone(),
        None => Value::Null,
    };

    Ok((0..dataset.row_count())
        .map(|row| ImplementationRecord {
            item_code: item_code_text(dataset.value(row, item)),
            manufacturer: dataset.value(row, manufacturer).clone(),
            mnp: dataset.value(row, mnp).clone(),
            legacy_manufacturer: optional(row, legacy),
            description: optional(row, description),
            modified_by: optional(row, modified_by),
            created_by: optional(row, created_by),
        })
        .collect())
}

fn require_column(dataset: &DataSet, side: &str, column: &str) -> ReconResult<usize> {
    dataset
        .schema
        .index_of(column)
        .ok_or_else(|| ReconError::SchemaMismatch {
            message: format!(
                "{side} table is missing required column '{column}'. columns={:?}",
                dataset.schema.field_names().collect::<Vec<_>>()
            ),
        })
}

fn item_code_text(value: &Value) -> Option<String> {
    value.present().map(|v| v.coerce_text().into_owned())
}
