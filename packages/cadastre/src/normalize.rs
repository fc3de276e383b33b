//! Canonical comparison keys for sections, plans, lots, and owner sets.
//!
//! Extraction output is noisy: the same parcel shows up as `"032"` in one
//! document and `"32"` in another, sections arrive with stray whitespace, and
//! owner lists come in arbitrary order. Every key used for filtering or
//! grouping goes through these total functions so that equality means the
//! same thing everywhere.

use crate::types::lot::Owner;
use crate::types::record::RawOwner;

/// Canonical section form: trimmed and uppercased. Empty stays empty.
pub fn normalize_section(section: &str) -> String {
    section.trim().to_uppercase()
}

/// Canonical plan form: trimmed, with leading `0`s stripped (`"032"` ≡ `"32"`).
///
/// An all-zero or empty plan normalizes to the empty string. The aggregation
/// stage substitutes `"N/A"` at grouping time; the filter stage compares the
/// stripped form directly and must not substitute.
pub fn normalize_plan(plan: &str) -> String {
    plan.trim().trim_start_matches('0').to_string()
}

/// Canonical lot identity: trimmed and uppercased.
///
/// Used only for identity comparison; display always keeps the original
/// document text.
pub fn normalize_lot_key(lot: &str) -> String {
    lot.trim().to_uppercase()
}

/// Canonicalize an owner set: drop blank entries, trim the rest, sort, and
/// fingerprint.
///
/// Entries whose trimmed name AND trimmed address are both empty are
/// extraction noise and are dropped. Survivors are sorted by uppercased name,
/// with the uppercased address as tiebreak, and the signature is the join of
/// `NAME|ADDRESS` fragments with `;` in sorted order.
///
/// Two owner sets that differ only in input order (or in the
/// single-vs-sequence wire shape) produce the same sorted sequence and the
/// same signature; this is what makes deduplication across documents work.
pub fn canonicalize_owners(raw: &[RawOwner]) -> (Vec<Owner>, String) {
    let mut owners: Vec<Owner> = raw
        .iter()
        .filter_map(|owner| {
            let name = owner.full_name.as_deref().unwrap_or("").trim();
            let address = owner.address.as_deref().unwrap_or("").trim();
            if name.is_empty() && address.is_empty() {
                None
            } else {
                Some(Owner::new(name, address))
            }
        })
        .collect();

    owners.sort_by(|a, b| {
        a.name
            .to_uppercase()
            .cmp(&b.name.to_uppercase())
            .then_with(|| a.address.to_uppercase().cmp(&b.address.to_uppercase()))
    });

    let signature = owner_signature(&owners);
    (owners, signature)
}

/// Signature of an already-canonicalized owner sequence.
pub(crate) fn owner_signature(owners: &[Owner]) -> String {
    owners
        .iter()
        .map(|owner| format!("{}|{}", owner.name.to_uppercase(), owner.address.to_uppercase()))
        .collect::<Vec<_>>()
        .join(";")
}
