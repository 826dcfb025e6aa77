//! `mnp-reconcile` checks whether two independently maintained item catalogs agree on
//! manufacturer name and manufacturer part number (MNP).
//!
//! A "client" catalog and an "implementation" catalog are joined on `item_code`. Because the
//! two sources disagree on spelling, punctuation, casing and placeholder values, fields are
//! normalized first and then compared with tolerant rules:
//!
//! - **manufacturer**: the client's words must overlap the implementation's words
//!   ([`matching::manufacturer_matches`])
//! - **MNP**: aligned-prefix similarity with a cutoff, 75% by default
//!   ([`matching::mnp_similarity`], [`matching::MnpPolicy`])
//!
//! Reading spreadsheets, picking columns and rendering reports stay with the caller: the
//! crate takes two in-memory [`types::DataSet`]s and returns a [`reconcile::ResultTable`] plus
//! [`reconcile::ReconciliationStats`].
//!
//! ## Input schema
//!
//! | table          | required columns                                               | optional columns                                           |
//! |----------------|----------------------------------------------------------------|------------------------------------------------------------|
//! | client         | `item_code`, `manufacturer_client`, `mnp_client`               |                                                            |
//! | implementation | `item_code`, `manufacturer_implementation`, `mnp_implementation` | `legacy_manufacturer`, `description`, `modified_by`, `created_by` |
//!
//! Cells may be text, numbers or [`types::Value::Null`]; every cell is coerced to text before
//! it is normalized.
//!
//! ## Quick example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mnp_reconcile::execution::{ExecutionOptions, StdErrExecutionObserver};
//! use mnp_reconcile::reconcile::{reconcile, ReconOptions, ReconPolicy, StdErrObserver};
//! use mnp_reconcile::types::DataSet;
//!
//! # fn main() -> Result<(), mnp_reconcile::ReconError> {
//! let client = DataSet::from_text_rows(
//!     &["item_code", "manufacturer_client", "mnp_client"],
//!     &[
//!         vec![Some("1001"), Some("Acme-Co."), Some("AB-123")],
//!         vec![Some("1002"), Some("Globex"), Some("TBD")],
//!     ],
//! );
//! let implementation = DataSet::from_text_rows(
//!     &["item_code", "manufacturer_implementation", "mnp_implementation"],
//!     &[vec![Some("1001"), Some("ACME CO INTERNATIONAL"), Some("AB123X")]],
//! );
//!
//! let options = ReconOptions {
//!     policy: ReconPolicy::default(),
//!     execution: Some(ExecutionOptions::default()),
//!     observer: Some(Arc::new(StdErrObserver)),
//!     execution_observer: Some(Arc::new(StdErrExecutionObserver)),
//! };
//! let out = reconcile(&client, &implementation, &options)?;
//!
//! assert_eq!(out.results.row_count(), 2);
//! assert_eq!(out.stats.manufacturer_matches, 1);
//! assert_eq!(out.stats.remaining_items, 1);
//! for (metric, value) in out.stats.to_map() {
//!     println!("{metric}: {value}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema + in-memory dataset types
//! - [`normalize`]: word-set and single-token normalizers
//! - [`matching`]: manufacturer and MNP comparison rules
//! - [`reconcile`]: join, filtering, per-row matching and statistics
//! - [`execution`]: parallel, order-preserving per-row execution
//! - [`error`]: error types

pub mod error;
pub mod execution;
pub mod matching;
pub mod normalize;
pub mod reconcile;
pub mod types;

pub use error::{ReconError, ReconResult};
