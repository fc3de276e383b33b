//! Grouping and deduplication of filtered records into consolidated lots.

use indexmap::IndexMap;

use crate::normalize::{canonicalize_owners, normalize_lot_key, normalize_plan, normalize_section};
use crate::types::lot::{AggregationResult, ConsolidatedLot, LotGroup, UNKNOWN_QUOTE_PART};
use crate::types::record::RawRecord;

/// Group key substitute for records with no plan number.
const MISSING_PLAN_KEY: &str = "N/A";

/// Group records by `(section, plan)` and deduplicate lots within each group.
///
/// For each record, in input order:
/// - records with an empty section or lot number are extraction noise and are
///   skipped (whitespace-only counts as empty);
/// - the group is looked up (or created) under `SECTIONKEY-PLANKEY`, with
///   `"N/A"` standing in for an absent plan; group order is first-insertion
///   order;
/// - within the group, a lot with the same canonical lot number and the same
///   owner-set signature absorbs the record's quote-part fragment; otherwise
///   a new lot is appended, keeping the original document text for display.
///
/// Records identical in `(section, plan, lot, owner set)` thus merge into one
/// lot carrying every distinct quote-part; a difference in any of those four
/// produces a distinct lot.
//
// TODO: rows that carry a section and plan but no lot number are dropped
// here; consider routing them to a diagnostics bucket instead of discarding.
pub fn aggregate(records: Vec<RawRecord>) -> AggregationResult {
    let mut groups: AggregationResult = IndexMap::new();

    for record in records {
        let lot_display = record.lot_number.as_deref().unwrap_or("");
        let lot_key = normalize_lot_key(lot_display);
        if lot_key.is_empty() {
            continue;
        }

        let section_display = record.section.as_deref().unwrap_or("");
        let section_key = normalize_section(section_display);
        if section_key.is_empty() {
            continue;
        }

        let plan_display = record.plan_number.as_deref().unwrap_or("");
        let mut plan_key = normalize_plan(plan_display);
        if plan_key.is_empty() {
            plan_key = MISSING_PLAN_KEY.to_string();
        }

        let (owners, owner_signature) = canonicalize_owners(&record.owners.to_vec());
        let group_key = format!("{section_key}-{plan_key}");

        let group = groups.entry(group_key).or_insert_with(|| LotGroup {
            section: section_key,
            plan: plan_key,
            lots: Vec::new(),
        });

        let quote_part = record
            .quote_part
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_string();

        let existing = group
            .lots
            .iter_mut()
            .find(|lot| lot.lot_key == lot_key && lot.owner_signature == owner_signature);

        match existing {
            Some(lot) => lot.push_quote_part(&quote_part),
            None => {
                let quote_part_display = if quote_part.is_empty() {
                    UNKNOWN_QUOTE_PART.to_string()
                } else {
                    quote_part.clone()
                };
                let quote_parts = if quote_part.is_empty() {
                    Vec::new()
                } else {
                    vec![quote_part]
                };
                group.lots.push(ConsolidatedLot {
                    lot: lot_display.to_string(),
                    section: section_display.to_string(),
                    plan: plan_display.to_string(),
                    owners,
                    quote_parts,
                    quote_part_display,
                    lot_key,
                    owner_signature,
                });
            }
        }
    }

    groups
}

/// Flatten the grouped result into a single lot list, preserving group order
/// then lot order.
pub fn flatten_lots(groups: &AggregationResult) -> Vec<ConsolidatedLot> {
    groups
        .values()
        .flat_map(|group| group.lots.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::{OwnersField, RawOwner};
    use proptest::prelude::*;

    fn record(section: &str, plan: &str, lot: &str, quote_part: &str) -> RawRecord {
        RawRecord::new()
            .with_section(section)
            .with_plan(plan)
            .with_lot(lot)
            .with_quote_part(quote_part)
    }

    #[test]
    fn test_merges_quote_parts_for_identical_identity() {
        let owner = RawOwner::new("Dupont Jean", "1 Rue X");
        let records = vec![
            record("CN", "032", "15", "A").with_owners(owner.clone()),
            record("CN", "32", "15", "B").with_owners(vec![owner]),
        ];

        let groups = aggregate(records);
        assert_eq!(groups.len(), 1);
        let group = &groups["CN-32"];
        assert_eq!(group.lots.len(), 1);
        assert_eq!(group.lots[0].quote_parts, vec!["A", "B"]);
        assert_eq!(group.lots[0].quote_part_display, "A | B");
    }

    #[test]
    fn test_distinct_owner_sets_make_distinct_lots() {
        let records = vec![
            record("CN", "32", "15", "A").with_owners(RawOwner::new("Dupont Jean", "1 Rue X")),
            record("CN", "32", "15", "B").with_owners(RawOwner::new("Martin Paul", "2 Rue Y")),
        ];

        let groups = aggregate(records);
        let group = &groups["CN-32"];
        assert_eq!(group.lots.len(), 2);
        assert_ne!(group.lots[0].identity_key(), group.lots[1].identity_key());
    }

    #[test]
    fn test_drops_record_without_lot_number() {
        let records = vec![
            record("CN", "12", "", "A"),
            RawRecord::new().with_section("CN").with_plan("12"),
            record("CN", "12", "  ", "B"),
        ];
        assert!(aggregate(records).is_empty());
    }

    #[test]
    fn test_drops_record_without_section() {
        let records = vec![RawRecord::new().with_plan("12").with_lot("7")];
        assert!(aggregate(records).is_empty());
    }

    #[test]
    fn test_missing_plan_groups_under_na() {
        let records = vec![record("CN", "", "7", ""), record("CN", "0", "8", "")];
        let groups = aggregate(records);
        assert_eq!(groups.len(), 1);
        let group = &groups["CN-N/A"];
        assert_eq!(group.plan, "N/A");
        assert_eq!(group.lots.len(), 2);
    }

    #[test]
    fn test_empty_quote_part_yields_placeholder() {
        let groups = aggregate(vec![record("CN", "32", "15", "  ")]);
        let lot = &groups["CN-32"].lots[0];
        assert!(lot.quote_parts.is_empty());
        assert_eq!(lot.quote_part_display, UNKNOWN_QUOTE_PART);
    }

    #[test]
    fn test_duplicate_quote_part_not_repeated() {
        let records = vec![
            record("CN", "32", "15", "A"),
            record("CN", "32", "15", "A"),
            record("CN", "32", "15", " A "),
        ];
        let groups = aggregate(records);
        assert_eq!(groups["CN-32"].lots[0].quote_parts, vec!["A"]);
    }

    #[test]
    fn test_display_keeps_original_text() {
        let groups = aggregate(vec![record(" cn ", "032", " 15a ", "")]);
        let lot = &groups["CN-32"].lots[0];
        assert_eq!(lot.section, " cn ");
        assert_eq!(lot.plan, "032");
        assert_eq!(lot.lot, " 15a ");
    }

    #[test]
    fn test_group_insertion_order_is_preserved() {
        let records = vec![
            record("CN", "44", "1", ""),
            record("CN", "32", "2", ""),
            record("CE", "7", "3", ""),
            record("CN", "44", "4", ""),
        ];
        let groups = aggregate(records);
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec!["CN-44", "CN-32", "CE-7"]);
    }

    #[test]
    fn test_owner_order_does_not_split_lots() {
        let a = RawOwner::new("Gallot/Michel", "9 Av Maurice Ravel");
        let b = RawOwner::new("Gallot/André", "9 Av Maurice Ravel");
        let records = vec![
            record("CN", "32", "15", "A").with_owners(vec![a.clone(), b.clone()]),
            record("CN", "32", "15", "B").with_owners(vec![b, a]),
        ];
        let groups = aggregate(records);
        assert_eq!(groups["CN-32"].lots.len(), 1);
    }

    #[test]
    fn test_flatten_preserves_group_then_lot_order() {
        let records = vec![
            record("CN", "44", "1", ""),
            record("CE", "7", "3", ""),
            record("CN", "44", "2", ""),
        ];
        let groups = aggregate(records);
        let lots: Vec<_> = flatten_lots(&groups).iter().map(|l| l.lot.clone()).collect();
        assert_eq!(lots, vec!["1", "2", "3"]);
    }

    fn record_strategy() -> impl Strategy<Value = RawRecord> {
        let small = "[ 0a-cA-C]{0,4}";
        (
            proptest::option::of(small),
            proptest::option::of(small),
            proptest::option::of(small),
            proptest::option::of(small),
        )
            .prop_map(|(section, plan, lot, quote_part)| RawRecord {
                section,
                plan_number: plan,
                lot_number: lot,
                quote_part,
                owners: OwnersField::Missing,
                property_address: None,
            })
    }

    proptest! {
        /// Aggregating the same input twice yields identical results: same
        /// group keys, same lot identity keys, same quote-part sets.
        #[test]
        fn prop_aggregation_is_idempotent(
            records in proptest::collection::vec(record_strategy(), 0..20)
        ) {
            let first = aggregate(records.clone());
            let second = aggregate(records);
            prop_assert_eq!(first, second);
        }
    }
}
