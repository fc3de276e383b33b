//! Section / plan filtering of raw extraction records.

use crate::normalize::{normalize_plan, normalize_section};
use crate::types::record::RawRecord;

/// Parse the free-text plan filter into a normalized whitelist.
///
/// Comma-separated tokens are trimmed, empty tokens dropped, then leading
/// zeros stripped — in that order, so a lone `"0"` survives as the empty
/// string and matches records whose plan also normalizes to empty.
pub fn parse_plan_filter(plan_filter: &str) -> Vec<String> {
    plan_filter
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.trim_start_matches('0').to_string())
        .collect()
}

/// Keep records matching the required section and, when a plan whitelist is
/// given, one of its plans.
///
/// A record passes iff its section field is non-empty, its normalized section
/// equals the normalized `section`, and either the plan whitelist is empty or
/// the record's normalized plan is on it. The order of surviving records is
/// preserved; the function is pure.
pub fn filter_records(
    records: Vec<RawRecord>,
    section: &str,
    plan_filter: &str,
) -> Vec<RawRecord> {
    let required_section = normalize_section(section);
    let plan_list = parse_plan_filter(plan_filter);

    records
        .into_iter()
        .filter(|record| {
            let record_section = record.section.as_deref().unwrap_or("");
            if record_section.is_empty() {
                return false;
            }
            if normalize_section(record_section) != required_section {
                return false;
            }
            if plan_list.is_empty() {
                return true;
            }
            let record_plan = normalize_plan(record.plan_number.as_deref().unwrap_or(""));
            plan_list.contains(&record_plan)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(section: &str, plan: &str) -> RawRecord {
        RawRecord::new().with_section(section).with_plan(plan)
    }

    #[test]
    fn test_section_filter_is_case_insensitive_and_trimmed() {
        let records = vec![record(" cn ", "32"), record("CE", "32")];
        let kept = filter_records(records, "CN", "");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].section.as_deref(), Some(" cn "));
    }

    #[test]
    fn test_missing_section_is_dropped() {
        let records = vec![RawRecord::new().with_plan("32"), record("CN", "32")];
        let kept = filter_records(records, "CN", "");
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_plan_leading_zero_equivalence_both_ways() {
        // Filter "032" matches record plan "32".
        let kept = filter_records(vec![record("CN", "32")], "CN", "032");
        assert_eq!(kept.len(), 1);

        // Filter "32" matches record plan "032".
        let kept = filter_records(vec![record("CN", "032")], "CN", "32");
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_plan_whitelist_excludes_other_plans() {
        let records = vec![record("CN", "32"), record("CN", "44")];
        let kept = filter_records(records, "CN", "32");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].plan_number.as_deref(), Some("32"));
    }

    #[test]
    fn test_empty_plan_filter_keeps_all_plans() {
        let records = vec![record("CN", "32"), record("CN", "44"), record("CN", "")];
        let kept = filter_records(records, "CN", "  ,  ,");
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_parse_plan_filter_tokens() {
        assert_eq!(parse_plan_filter("032, 44 ,,7"), vec!["32", "44", "7"]);
        assert!(parse_plan_filter("").is_empty());
        assert!(parse_plan_filter(" , ").is_empty());
        // A lone "0" stays on the list as the empty string.
        assert_eq!(parse_plan_filter("0"), vec![""]);
    }

    #[test]
    fn test_order_of_survivors_is_preserved() {
        let records = vec![record("CN", "3"), record("CN", "1"), record("CN", "2")];
        let kept = filter_records(records, "CN", "");
        let plans: Vec<_> = kept
            .iter()
            .map(|r| r.plan_number.as_deref().unwrap())
            .collect();
        assert_eq!(plans, vec!["3", "1", "2"]);
    }
}
