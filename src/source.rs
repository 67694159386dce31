use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::{RawTable, REQUIRED_COLUMNS};

/// Supplies the rectangular input table. Interactive selection, file-format
/// breadth and anything else presentation-flavored lives behind this seam,
/// not in the matching core.
pub trait DataSource {
    fn load(&self) -> Result<RawTable>;
}

/// Reads a JSON file containing an array of flat objects, one per company
/// record. The column set is the union of keys across all objects; rows
/// missing a key get an absent cell.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DataSource for JsonFileSource {
    fn load(&self) -> Result<RawTable> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read input file {}", self.path.display()))?;
        let parsed: Value = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {} as JSON", self.path.display()))?;

        let rows = match parsed {
            Value::Array(rows) => rows,
            _ => bail!("expected a JSON array of records in {}", self.path.display()),
        };

        // A zero-record file carries no column information; treat it as an
        // empty table over the required schema so empty input stays valid.
        if rows.is_empty() {
            return Ok(RawTable {
                columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
                rows: vec![],
            });
        }

        let mut columns: BTreeSet<String> = BTreeSet::new();
        for row in &rows {
            match row {
                Value::Object(fields) => columns.extend(fields.keys().cloned()),
                other => bail!("expected JSON objects as records, found {}", other),
            }
        }
        let columns: Vec<String> = columns.into_iter().collect();

        let table_rows = rows
            .into_iter()
            .map(|row| {
                let fields = match row {
                    Value::Object(fields) => fields,
                    _ => unreachable!("non-object rows rejected above"),
                };
                columns
                    .iter()
                    .map(|col| fields.get(col).and_then(cell_to_string))
                    .collect()
            })
            .collect();

        Ok(RawTable {
            columns,
            rows: table_rows,
        })
    }
}

fn cell_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        // Nested structures carry no comparable field value.
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Hands back a table built in memory. Used by tests and embedders that
/// already hold their records.
pub struct InMemorySource {
    table: RawTable,
}

impl InMemorySource {
    pub fn new(table: RawTable) -> Self {
        Self { table }
    }
}

impl DataSource for InMemorySource {
    fn load(&self) -> Result<RawTable> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_json(json: &str) -> Result<RawTable> {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let dir = std::env::temp_dir();
        let path = dir.join(format!(
            "castor-source-test-{}-{}.json",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&path, json).unwrap();
        let result = JsonFileSource::new(&path).load();
        let _ = fs::remove_file(&path);
        result
    }

    #[test]
    fn test_loads_array_of_objects() {
        let table = load_json(
            r#"[
                {"company_name": "Acme", "website_domain": "example.com"},
                {"company_name": "Beta", "primary_phone": "+1 555 123 4567"}
            ]"#,
        )
        .unwrap();

        assert_eq!(table.rows.len(), 2);
        assert!(table.columns.contains(&"company_name".to_string()));
        assert!(table.columns.contains(&"primary_phone".to_string()));

        let name_idx = table.columns.iter().position(|c| c == "company_name").unwrap();
        assert_eq!(table.rows[0][name_idx].as_deref(), Some("Acme"));
    }

    #[test]
    fn test_null_and_numeric_cells() {
        let table = load_json(
            r#"[{"company_name": null, "website_domain": 12345, "primary_phone": "x"}]"#,
        )
        .unwrap();

        let domain_idx = table
            .columns
            .iter()
            .position(|c| c == "website_domain")
            .unwrap();
        let name_idx = table.columns.iter().position(|c| c == "company_name").unwrap();
        assert_eq!(table.rows[0][domain_idx].as_deref(), Some("12345"));
        assert_eq!(table.rows[0][name_idx], None);
    }

    #[test]
    fn test_empty_array_is_valid_empty_table() {
        let table = load_json("[]").unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.columns.len(), REQUIRED_COLUMNS.len());
    }

    #[test]
    fn test_non_array_input_is_rejected() {
        assert!(load_json(r#"{"company_name": "Acme"}"#).is_err());
    }

    #[test]
    fn test_loaded_table_missing_column_fails_downstream() {
        // A file that never mentions primary_phone yields a table the
        // pipeline rejects before normalizing anything.
        let table = load_json(
            r#"[{"company_name": "Acme", "website_domain": "example.com",
                 "main_street": null, "main_street_number": null, "main_city": null,
                 "main_postcode": null, "main_country": null}]"#,
        )
        .unwrap();
        let err = crate::pipeline::run(&table, &crate::matching::MatchConfig::new()).unwrap_err();
        assert!(err.to_string().contains("primary_phone"));
    }

    #[test]
    fn test_in_memory_source_round_trips() {
        let table = RawTable {
            columns: vec!["company_name".to_string()],
            rows: vec![vec![Some("Acme".to_string())]],
        };
        let loaded = InMemorySource::new(table.clone()).load().unwrap();
        assert_eq!(loaded.columns, table.columns);
        assert_eq!(loaded.rows.len(), 1);
    }
}
