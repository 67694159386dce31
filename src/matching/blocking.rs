use std::collections::HashMap;
use tracing::debug;

use crate::normalize::NormalizedRecord;
use crate::TARGET_MATCH;

/// Hash-backed equivalence partitions over the exact blocking keys. Built in
/// a single O(n) pass so the clustering loop never rescans the table.
///
/// Records without a domain never enter the domain partition, and records
/// with an empty `phone_norm` never enter the phone partition; grouping
/// every phone-less record under one empty key would cluster unrelated
/// companies.
#[derive(Debug)]
pub struct BlockIndex {
    by_domain: HashMap<String, Vec<usize>>,
    by_phone: HashMap<String, Vec<usize>>,
}

impl BlockIndex {
    pub fn build(records: &[NormalizedRecord]) -> Self {
        let mut by_domain: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_phone: HashMap<String, Vec<usize>> = HashMap::new();

        for record in records {
            if let Some(domain) = &record.domain {
                if !domain.is_empty() {
                    by_domain.entry(domain.clone()).or_default().push(record.id());
                }
            }
            if !record.phone_norm.is_empty() {
                by_phone
                    .entry(record.phone_norm.clone())
                    .or_default()
                    .push(record.id());
            }
        }

        debug!(
            target: TARGET_MATCH,
            "Built block index: {} domain blocks, {} phone blocks over {} records",
            by_domain.len(),
            by_phone.len(),
            records.len()
        );

        BlockIndex { by_domain, by_phone }
    }

    /// All record ids sharing exactly this non-empty normalized domain.
    pub fn domain_block(&self, domain: &str) -> &[usize] {
        self.by_domain.get(domain).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All record ids sharing exactly this non-empty normalized phone.
    pub fn phone_block(&self, phone: &str) -> &[usize] {
        self.by_phone.get(phone).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_record;
    use crate::schema::RawRecord;

    fn record(id: usize, domain: Option<&str>, phone: Option<&str>) -> NormalizedRecord {
        normalize_record(RawRecord {
            id,
            company_name: Some(format!("Company {}", id)),
            website_domain: domain.map(str::to_string),
            primary_phone: phone.map(str::to_string),
            main_street: None,
            main_street_number: None,
            main_city: None,
            main_postcode: None,
            main_country: None,
        })
    }

    #[test]
    fn test_domain_blocks_group_equal_keys() {
        let records = vec![
            record(0, Some("Example.com"), None),
            record(1, Some("http://www.example.com/page"), None),
            record(2, Some("other.org"), None),
        ];
        let index = BlockIndex::build(&records);
        assert_eq!(index.domain_block("example.com"), &[0, 1]);
        assert_eq!(index.domain_block("other.org"), &[2]);
        assert!(index.domain_block("missing.com").is_empty());
    }

    #[test]
    fn test_absent_domains_form_no_block() {
        let records = vec![record(0, None, None), record(1, None, None)];
        let index = BlockIndex::build(&records);
        assert!(index.domain_block("").is_empty());
    }

    #[test]
    fn test_phone_blocks_group_equal_keys() {
        let records = vec![
            record(0, None, Some("+1 555-123-4567")),
            record(1, None, Some("+1 (555) 123 4567")),
            record(2, None, Some("+49 30 901820")),
        ];
        let index = BlockIndex::build(&records);
        assert_eq!(index.phone_block("+15551234567"), &[0, 1]);
        assert_eq!(index.phone_block("+4930901820"), &[2]);
    }

    #[test]
    fn test_empty_phone_is_never_a_key() {
        let records = vec![
            record(0, None, None),
            record(1, None, Some("")),
            record(2, None, Some("no digits")),
        ];
        let index = BlockIndex::build(&records);
        assert!(index.phone_block("").is_empty());
    }
}
