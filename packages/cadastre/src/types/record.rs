//! Raw extraction records, as returned by the extraction collaborator.
//!
//! Field names mirror the JSON contract of the extraction output for French
//! property statements ("relevés de propriété"). Every field may be missing
//! or empty: these records are noisy candidates, not validated data. The
//! filter and aggregation stages decide what survives.

use serde::{Deserialize, Serialize};

/// A property owner as extracted from a source document.
///
/// Both fields are optional: extraction regularly finds one without the
/// other, and entries where both are blank are dropped during owner-set
/// canonicalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOwner {
    /// Full name of the owner.
    #[serde(rename = "nomComplet", default)]
    pub full_name: Option<String>,

    /// Postal address of the owner.
    #[serde(rename = "adresse", default)]
    pub address: Option<String>,
}

impl RawOwner {
    /// Create an owner with both fields set.
    pub fn new(full_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            full_name: Some(full_name.into()),
            address: Some(address.into()),
        }
    }
}

/// Owners as they appear on the wire: a sequence, a single object, or absent.
///
/// The extraction collaborator is allowed to produce any of the three shapes.
/// They are normalized into one sequence via [`OwnersField::into_vec`]
/// immediately after deserialization so that nothing downstream ever branches
/// on shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnersField {
    /// An ordered sequence of owners.
    Many(Vec<RawOwner>),
    /// A single owner object.
    One(RawOwner),
    /// No owner information at all.
    Missing,
}

impl Default for OwnersField {
    fn default() -> Self {
        OwnersField::Missing
    }
}

impl OwnersField {
    /// Coerce the wire shape into a canonical sequence.
    ///
    /// Absent becomes the empty sequence; a single object becomes a
    /// one-element sequence; a sequence passes through unchanged.
    pub fn into_vec(self) -> Vec<RawOwner> {
        match self {
            OwnersField::Many(owners) => owners,
            OwnersField::One(owner) => vec![owner],
            OwnersField::Missing => Vec::new(),
        }
    }

    /// Borrowing variant of [`OwnersField::into_vec`].
    pub fn to_vec(&self) -> Vec<RawOwner> {
        self.clone().into_vec()
    }
}

impl From<Vec<RawOwner>> for OwnersField {
    fn from(owners: Vec<RawOwner>) -> Self {
        OwnersField::Many(owners)
    }
}

impl From<RawOwner> for OwnersField {
    fn from(owner: RawOwner) -> Self {
        OwnersField::One(owner)
    }
}

/// One raw candidate row extracted from a source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Alphabetic cadastral section code (e.g. "CR").
    #[serde(rename = "La section (Sec)", default)]
    pub section: Option<String>,

    /// Parcel number within the section (e.g. "282").
    #[serde(rename = "Le numéro de plan (N° Plan)", default)]
    pub plan_number: Option<String>,

    /// Lot number, when the document labels one.
    #[serde(rename = "Le numéro de lot", default)]
    pub lot_number: Option<String>,

    /// Fractional/area share descriptor (e.g. "HA A CA 3 36").
    #[serde(rename = "La quote-part (C Part)", default)]
    pub quote_part: Option<String>,

    /// Owners attached to this row, in any of the accepted wire shapes.
    #[serde(rename = "Les propriétaires (nom + adresse complète)", default)]
    pub owners: OwnersField,

    /// Sometimes present in extraction output; carried through but unused by
    /// the engine.
    #[serde(
        rename = "L'adresse du bien",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub property_address: Option<String>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the section.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Set the plan number.
    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan_number = Some(plan.into());
        self
    }

    /// Set the lot number.
    pub fn with_lot(mut self, lot: impl Into<String>) -> Self {
        self.lot_number = Some(lot.into());
        self
    }

    /// Set the quote-part.
    pub fn with_quote_part(mut self, quote_part: impl Into<String>) -> Self {
        self.quote_part = Some(quote_part.into());
        self
    }

    /// Set the owners field from any accepted shape.
    pub fn with_owners(mut self, owners: impl Into<OwnersField>) -> Self {
        self.owners = owners.into();
        self
    }
}
