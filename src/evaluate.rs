use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::matching::{token_sort_similarity, DuplicateGroup};
use crate::TARGET_EVAL;

/// Mean token-sort similarity over every unordered pair of member names,
/// across all groups with at least two members. Groups of size one
/// contribute no pairs; with no pairs at all the result is 0.
pub fn average_pairwise_name_similarity(groups: &[DuplicateGroup]) -> f64 {
    let mut total = 0u64;
    let mut pairs = 0u64;

    for group in groups {
        let names: Vec<&str> = group.members.iter().map(|m| m.name_norm.as_str()).collect();
        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                total += token_sort_similarity(names[i], names[j]) as u64;
                pairs += 1;
            }
        }
    }

    if pairs == 0 {
        return 0.0;
    }
    total as f64 / pairs as f64
}

/// Fraction of the table covered by emitted groups, as a percentage:
/// distinct record ids in any group over total records. Empty input is 0,
/// not a division fault.
pub fn duplicate_coverage(groups: &[DuplicateGroup], total_records: usize) -> f64 {
    if total_records == 0 {
        return 0.0;
    }

    let covered: HashSet<usize> = groups.iter().flat_map(|g| g.ids.iter().copied()).collect();
    covered.len() as f64 / total_records as f64 * 100.0
}

/// Average fraction of members disagreeing with their group's dominant
/// blocking key. Per group with two or more members the key is `domain` when
/// every member has one, otherwise `phone_norm`; the fraction is measured
/// against the statistical mode of that key. Groups agreeing perfectly
/// contribute 0; with no qualifying groups the result is 0.
pub fn key_consistency_error(groups: &[DuplicateGroup]) -> f64 {
    let mut total_error = 0.0;
    let mut qualifying = 0usize;

    for group in groups {
        if group.len() < 2 {
            continue;
        }

        let keys: Vec<String> = if group.members.iter().all(|m| m.domain.is_some()) {
            group
                .members
                .iter()
                .map(|m| m.domain.clone().unwrap_or_default())
                .collect()
        } else {
            group.members.iter().map(|m| m.phone_norm.clone()).collect()
        };

        let mode = match mode_value(&keys) {
            Some(m) => m,
            None => continue,
        };

        let disagreeing = keys.iter().filter(|k| **k != mode).count();
        total_error += disagreeing as f64 / keys.len() as f64;
        qualifying += 1;
    }

    if qualifying == 0 {
        return 0.0;
    }

    let error = total_error / qualifying as f64;
    debug!(
        target: TARGET_EVAL,
        "Key-consistency error {:.4} over {} qualifying groups", error, qualifying
    );
    error
}

/// Statistical mode; ties break on the lexicographically smallest value so
/// the metric is deterministic.
fn mode_value(values: &[String]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then_with(|| b_val.cmp(a_val))
        })
        .map(|(val, _)| val.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{find_duplicate_groups, MatchConfig};
    use crate::normalize::normalize_record;
    use crate::schema::RawRecord;

    fn record(
        id: usize,
        name: &str,
        domain: Option<&str>,
        phone: Option<&str>,
    ) -> crate::normalize::NormalizedRecord {
        normalize_record(RawRecord {
            id,
            company_name: Some(name.to_string()),
            website_domain: domain.map(str::to_string),
            primary_phone: phone.map(str::to_string),
            main_street: None,
            main_street_number: None,
            main_city: None,
            main_postcode: None,
            main_country: None,
        })
    }

    fn groups_for(records: Vec<crate::normalize::NormalizedRecord>) -> Vec<DuplicateGroup> {
        find_duplicate_groups(&records, &MatchConfig::new())
    }

    #[test]
    fn test_average_similarity_identical_names() {
        let groups = groups_for(vec![
            record(0, "Acme Inc", Some("example.com"), None),
            record(1, "ACME", Some("example.com"), None),
        ]);
        assert_eq!(average_pairwise_name_similarity(&groups), 100.0);
    }

    #[test]
    fn test_average_similarity_no_pairs_is_zero() {
        let groups = groups_for(vec![record(0, "Acme", None, None)]);
        assert_eq!(average_pairwise_name_similarity(&groups), 0.0);
    }

    #[test]
    fn test_coverage_bounds() {
        let groups = groups_for(vec![
            record(0, "Acme", Some("example.com"), None),
            record(1, "Beta", None, None),
        ]);
        let coverage = duplicate_coverage(&groups, 2);
        assert!((0.0..=100.0).contains(&coverage));
        // Every record lands in some group, singleton or not.
        assert_eq!(coverage, 100.0);
    }

    #[test]
    fn test_coverage_empty_input() {
        assert_eq!(duplicate_coverage(&[], 0), 0.0);
    }

    #[test]
    fn test_key_consistency_perfect_agreement() {
        // Mixed-case spellings of one domain normalize to one key.
        let groups = groups_for(vec![
            record(0, "Acme", Some("Example.com"), None),
            record(1, "Acme Co", Some("example.com"), None),
            record(2, "Acme Corp", Some("http://www.EXAMPLE.com"), None),
        ]);
        assert_eq!(key_consistency_error(&groups), 0.0);
    }

    #[test]
    fn test_key_consistency_falls_back_to_phone() {
        let groups = groups_for(vec![
            record(0, "Acme", None, Some("+1 555 123 4567")),
            record(1, "Acme", None, Some("+1 (555) 123-4567")),
        ]);
        // No domains, so the phone key is consulted; both normalize equal.
        assert_eq!(key_consistency_error(&groups), 0.0);
    }

    #[test]
    fn test_key_consistency_no_qualifying_groups() {
        let groups = groups_for(vec![record(0, "Acme", None, None)]);
        assert_eq!(key_consistency_error(&groups), 0.0);
    }

    #[test]
    fn test_mode_tie_breaks_deterministically() {
        let values = vec!["b".to_string(), "a".to_string()];
        assert_eq!(mode_value(&values), Some("a".to_string()));
    }
}
