//! Per-record comparison rules.
//!
//! Manufacturers are compared as token sets ([`manufacturer_matches`]); part numbers are
//! compared position by position ([`mnp_similarity`]) and then collapsed into a verdict by an
//! [`MnpPolicy`].
//!
//! The `*_verdict` helpers add the "absent" branch on top: when either side of a field is
//! missing the verdict is `None` (not evaluated), which callers count as "no match".

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize_to_token, normalize_to_words};
use crate::types::Value;

/// Default similarity cutoff (percent) for a part-number match.
pub const MNP_MATCH_THRESHOLD: f64 = 75.0;

/// Verdict stored for a part-number pair that passes the cutoff.
pub const MNP_MATCH: f64 = 100.0;

/// Verdict stored for a part-number pair that fails the cutoff.
pub const MNP_NO_MATCH: f64 = 0.0;

/// True iff at least one client word appears among the implementation words.
///
/// Containment is checked client-in-implementation only. Empty sets never match.
pub fn manufacturer_matches(client: &BTreeSet<String>, implementation: &BTreeSet<String>) -> bool {
    client.iter().any(|w| implementation.contains(w))
}

/// Aligned-prefix similarity of two normalized part numbers, as a percentage with one
/// decimal.
///
/// Characters are compared at equal positions up to the shorter length; the count of equal
/// positions is divided by the *longer* length. Two empty tokens have no defined ratio and
/// score `0.0`.
///
/// ```rust
/// use mnp_reconcile::matching::mnp_similarity;
///
/// assert_eq!(mnp_similarity("AB123", "AB123X"), 83.3);
/// assert_eq!(mnp_similarity("X123", "123"), 0.0);
/// ```
pub fn mnp_similarity(client: &str, implementation: &str) -> f64 {
    let a: Vec<char> = client.chars().collect();
    let b: Vec<char> = implementation.chars().collect();

    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }

    let equal = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    round1(equal as f64 / longest as f64 * 100.0)
}

/// True iff [`mnp_similarity`] reaches [`MNP_MATCH_THRESHOLD`].
pub fn mnp_matches(client: &str, implementation: &str) -> bool {
    mnp_similarity(client, implementation) >= MNP_MATCH_THRESHOLD
}

/// How a part-number similarity becomes the stored verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MnpPolicy {
    /// `Some(t)`: store [`MNP_MATCH`] when similarity >= `t`, else [`MNP_NO_MATCH`].
    /// `None`: store the raw rounded similarity.
    pub threshold: Option<f64>,
}

impl MnpPolicy {
    /// Binary pass/fail at `threshold` percent.
    pub fn binary(threshold: f64) -> Self {
        Self {
            threshold: Some(threshold),
        }
    }

    /// Raw similarity passthrough.
    pub fn raw() -> Self {
        Self { threshold: None }
    }

    /// Map an already computed similarity to a verdict.
    pub fn verdict_for_similarity(&self, similarity: f64) -> f64 {
        match self.threshold {
            None => similarity,
            Some(t) if similarity >= t => MNP_MATCH,
            Some(_) => MNP_NO_MATCH,
        }
    }

    /// Compare two normalized part numbers under this policy.
    pub fn verdict(&self, client: &str, implementation: &str) -> f64 {
        self.verdict_for_similarity(mnp_similarity(client, implementation))
    }
}

impl Default for MnpPolicy {
    fn default() -> Self {
        Self::binary(MNP_MATCH_THRESHOLD)
    }
}

/// Manufacturer verdict for one joined record: `Some(1)` match, `Some(0)` no match, `None`
/// when either side is absent.
///
/// A client value equal to `placeholder` is never tokenized; it scores `Some(0)`.
pub fn manufacturer_verdict(
    client: Option<&Value>,
    implementation: Option<&Value>,
    placeholder: &str,
) -> Option<u8> {
    let (client, implementation) = (client?.present()?, implementation?.present()?);
    if is_placeholder(client, placeholder) {
        return Some(0);
    }
    let hit = manufacturer_matches(
        &normalize_to_words(client),
        &normalize_to_words(implementation),
    );
    Some(u8::from(hit))
}

/// Part-number verdict for one joined record; `None` when either side is absent.
pub fn mnp_verdict(
    client: Option<&Value>,
    implementation: Option<&Value>,
    policy: &MnpPolicy,
) -> Option<f64> {
    let (client, implementation) = (client?.present()?, implementation?.present()?);
    Some(policy.verdict(
        &normalize_to_token(client),
        &normalize_to_token(implementation),
    ))
}

/// Exact comparison against the placeholder sentinel (text cells only).
pub fn is_placeholder(value: &Value, placeholder: &str) -> bool {
    matches!(value, Value::Utf8(s) if s == placeholder)
}

/// Round to one decimal, half-to-even on the exact binary value (`6.25` gives `6.2`).
///
/// Float formatting rounds the exact value, which multiplying by ten and calling
/// [`f64::round`] does not.
pub(crate) fn round1(v: f64) -> f64 {
    format!("{v:.1}").parse().unwrap_or(v)
}
