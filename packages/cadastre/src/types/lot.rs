//! Consolidated lots and lot groups, the output of the aggregation stage.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder displayed when no quote-part fragment was extracted for a lot.
pub const UNKNOWN_QUOTE_PART: &str = "Inconnue(s)";

/// Separator used when joining quote-part fragments for display.
pub const QUOTE_PART_SEPARATOR: &str = " | ";

/// A canonicalized owner: trimmed name and address.
///
/// Serialized field names match the extraction wire format so the synthesis
/// payload round-trips the same vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Trimmed full name (may be empty when only an address was extracted).
    #[serde(rename = "nomComplet")]
    pub name: String,

    /// Trimmed address (may be empty when only a name was extracted).
    #[serde(rename = "adresse")]
    pub address: String,
}

impl Owner {
    /// Create an owner from already-trimmed parts.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// A deduplicated lot with merged quote-part fragments.
///
/// `section`, `plan` and `lot` keep the original document text for display;
/// the canonical comparison keys live in the private identity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedLot {
    /// Lot number as it appeared in the source document.
    pub lot: String,

    /// Section as it appeared in the source document.
    pub section: String,

    /// Plan number as it appeared in the source document.
    pub plan: String,

    /// Owners in canonical sort order, fixed at creation and never re-sorted
    /// on merge.
    #[serde(rename = "proprietaires")]
    pub owners: Vec<Owner>,

    /// Distinct quote-part fragments in first-seen order.
    #[serde(rename = "quoteParts")]
    pub quote_parts: Vec<String>,

    /// `quote_parts` joined with `" | "`, or `"Inconnue(s)"` when none were
    /// found.
    #[serde(rename = "quotePartAggregated")]
    pub quote_part_display: String,

    #[serde(skip)]
    pub(crate) lot_key: String,

    #[serde(skip)]
    pub(crate) owner_signature: String,
}

impl ConsolidatedLot {
    /// Identity key of this lot within its group: canonical lot number plus
    /// the owner-set signature. Two lots in one group never share it.
    pub fn identity_key(&self) -> (&str, &str) {
        (&self.lot_key, &self.owner_signature)
    }

    /// Append a quote-part fragment, ignoring blanks and duplicates, and
    /// refresh the display string.
    pub(crate) fn push_quote_part(&mut self, quote_part: &str) {
        if quote_part.is_empty() || self.quote_parts.iter().any(|q| q == quote_part) {
            return;
        }
        self.quote_parts.push(quote_part.to_string());
        self.quote_part_display = self.quote_parts.join(QUOTE_PART_SEPARATOR);
    }
}

/// All consolidated lots sharing one `(section, plan)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotGroup {
    /// Canonical section key (trimmed, uppercased).
    pub section: String,

    /// Canonical plan key (leading zeros stripped; `"N/A"` when absent).
    pub plan: String,

    /// Lots in first-seen order.
    pub lots: Vec<ConsolidatedLot>,
}

/// Aggregation output: group key (`"SECTION-PLAN"`) to group, preserving
/// first-insertion order. Rebuilt from scratch on every analysis run.
pub type AggregationResult = IndexMap<String, LotGroup>;

#[cfg(test)]
mod tests {
    use super::*;

    fn lot_with_quote_parts(parts: &[&str]) -> ConsolidatedLot {
        let quote_parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
        let display = if quote_parts.is_empty() {
            UNKNOWN_QUOTE_PART.to_string()
        } else {
            quote_parts.join(QUOTE_PART_SEPARATOR)
        };
        ConsolidatedLot {
            lot: "15".to_string(),
            section: "CN".to_string(),
            plan: "32".to_string(),
            owners: vec![],
            quote_parts,
            quote_part_display: display,
            lot_key: "15".to_string(),
            owner_signature: String::new(),
        }
    }

    #[test]
    fn test_push_quote_part_deduplicates() {
        let mut lot = lot_with_quote_parts(&["A"]);
        lot.push_quote_part("A");
        assert_eq!(lot.quote_parts, vec!["A"]);
        assert_eq!(lot.quote_part_display, "A");
    }

    #[test]
    fn test_push_quote_part_ignores_empty() {
        let mut lot = lot_with_quote_parts(&[]);
        lot.push_quote_part("");
        assert!(lot.quote_parts.is_empty());
        assert_eq!(lot.quote_part_display, UNKNOWN_QUOTE_PART);
    }

    #[test]
    fn test_push_quote_part_refreshes_display() {
        let mut lot = lot_with_quote_parts(&["A"]);
        lot.push_quote_part("B");
        assert_eq!(lot.quote_part_display, "A | B");
    }
}
