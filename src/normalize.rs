use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::schema::RawRecord;
use crate::TARGET_NORMALIZE;

// Legal-entity suffixes stripped from company names before comparison,
// matched as whole words with an optional trailing comma.
const LEGAL_SUFFIXES: &str = r"\b(ltd|inc|llc|gmbh|pty|plc|co|corp)\b,?";

// Second-level public suffixes where the registrable domain keeps three
// labels instead of two (example.co.uk, not co.uk).
const MULTI_LABEL_SUFFIXES: [&str; 22] = [
    "co.uk", "org.uk", "ac.uk", "gov.uk", "me.uk", "co.jp", "ne.jp", "or.jp", "com.au", "net.au",
    "org.au", "co.nz", "org.nz", "com.br", "com.mx", "com.cn", "com.sg", "com.hk", "co.in",
    "co.za", "com.tr", "com.ar",
];

lazy_static! {
    static ref LEGAL_SUFFIX_RE: Regex = Regex::new(LEGAL_SUFFIXES).unwrap();
    static ref SUFFIX_SET: HashSet<&'static str> = MULTI_LABEL_SUFFIXES.iter().copied().collect();
}

/// A record with its derived comparison keys. Normalization is a pure
/// function of the raw fields: byte-identical raw values always produce
/// identical keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub raw: RawRecord,
    pub domain: Option<String>,
    pub name_norm: String,
    pub phone_norm: String,
    pub address_norm: String,
}

impl NormalizedRecord {
    pub fn id(&self) -> usize {
        self.raw.id
    }
}

/// Extract the registrable domain (`<domain>.<public_suffix>`, lower-cased)
/// from a URL or bare hostname. Subdomains, scheme, path and query are
/// ignored. Absent, empty or purely numeric input yields `None`; any other
/// parse irregularity degrades to a lower-cased best-effort string rather
/// than an error.
pub fn normalize_domain(url: Option<&str>) -> Option<String> {
    let raw = url?.trim();
    if raw.is_empty() || raw.parse::<f64>().is_ok() {
        return None;
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    match Url::parse(&with_scheme) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => Some(registrable_domain(&host.to_lowercase())),
            // Scheme-only or otherwise host-less input: keep what we got.
            None => Some(raw.to_lowercase()),
        },
        Err(_) => Some(raw.to_lowercase()),
    }
}

/// Reduce a lower-cased host to its registrable domain: the last two labels,
/// or the last three when the final two form a known second-level public
/// suffix. IP addresses and single-label hosts pass through unchanged.
fn registrable_domain(host: &str) -> String {
    if is_ip_address(host) {
        return host.to_string();
    }

    let labels: Vec<&str> = host
        .trim_matches('.')
        .split('.')
        .filter(|l| !l.is_empty())
        .collect();

    if labels.len() <= 2 {
        return labels.join(".");
    }

    let last_two = format!("{}.{}", labels[labels.len() - 2], labels[labels.len() - 1]);
    if SUFFIX_SET.contains(last_two.as_str()) {
        labels[labels.len() - 3..].join(".")
    } else {
        last_two
    }
}

fn is_ip_address(host: &str) -> bool {
    if host.split('.').count() == 4 && host.split('.').all(|part| part.parse::<u8>().is_ok()) {
        return true;
    }
    host.contains(':')
}

/// Canonicalize a company name for comparison: lower-case, trim, strip
/// legal-entity suffixes as whole words, re-trim. `None` normalizes to the
/// empty string.
pub fn normalize_name(name: Option<&str>) -> String {
    let lowered = match name {
        Some(n) => n.to_lowercase(),
        None => return String::new(),
    };
    LEGAL_SUFFIX_RE
        .replace_all(lowered.trim(), "")
        .trim()
        .to_string()
}

/// Canonicalize a phone number. A `+`-prefixed value whose digits form a
/// plausible international number is formatted as E.164 (`+` followed by
/// 8-15 digits, no separators); everything else degrades to the decimal
/// digits of the raw string. `None` normalizes to the empty string so that
/// phone-less records never share a blocking key.
pub fn normalize_phone(phone: Option<&str>) -> String {
    let raw = match phone {
        Some(p) => p.trim(),
        None => return String::new(),
    };

    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if raw.starts_with('+') && (8..=15).contains(&digits.len()) {
        return format!("+{}", digits);
    }

    digits
}

/// Concatenate the five address parts (street, street number, city,
/// postcode, country) in fixed order, lower-cased and trimmed. Missing parts
/// become empty strings. Reserved for future blocking keys; matching does
/// not consult it yet.
pub fn normalize_address(record: &RawRecord) -> String {
    let part = |field: &Option<String>| field.clone().unwrap_or_default();

    [
        part(&record.main_street),
        part(&record.main_street_number),
        part(&record.main_city),
        part(&record.main_postcode),
        part(&record.main_country),
    ]
    .join(" ")
    .to_lowercase()
    .trim()
    .to_string()
}

/// Derive all comparison keys for one record.
pub fn normalize_record(raw: RawRecord) -> NormalizedRecord {
    let domain = normalize_domain(raw.website_domain.as_deref());
    let name_norm = normalize_name(raw.company_name.as_deref());
    let phone_norm = normalize_phone(raw.primary_phone.as_deref());
    let address_norm = normalize_address(&raw);

    NormalizedRecord {
        raw,
        domain,
        name_norm,
        phone_norm,
        address_norm,
    }
}

/// Normalize a whole table of records.
pub fn normalize_table(records: Vec<RawRecord>) -> Vec<NormalizedRecord> {
    let normalized: Vec<NormalizedRecord> = records.into_iter().map(normalize_record).collect();

    debug!(
        target: TARGET_NORMALIZE,
        "Normalized {} records ({} with domain, {} with phone)",
        normalized.len(),
        normalized.iter().filter(|r| r.domain.is_some()).count(),
        normalized.iter().filter(|r| !r.phone_norm.is_empty()).count()
    );

    normalized
}
