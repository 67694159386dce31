use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Columns every input table must carry. Absence of any one of these is a
/// configuration error, reported before a single row is normalized.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "company_name",
    "website_domain",
    "primary_phone",
    "main_street",
    "main_street_number",
    "main_city",
    "main_postcode",
    "main_country",
];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("required column '{column}' is missing from the input table")]
    MissingColumn { column: String },
}

/// A rectangular input table: column names plus rows of optional cell values.
/// Cells are `None` where the source had no value for that column.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// One company row, projected out of a [`RawTable`] through a resolved
/// [`Schema`]. The `id` is the row's position in the source table and is the
/// stable identifier used throughout matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: usize,
    pub company_name: Option<String>,
    pub website_domain: Option<String>,
    pub primary_phone: Option<String>,
    pub main_street: Option<String>,
    pub main_street_number: Option<String>,
    pub main_city: Option<String>,
    pub main_postcode: Option<String>,
    pub main_country: Option<String>,
}

/// Column-name-to-index mapping, resolved once at ingestion.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    company_name: usize,
    website_domain: usize,
    primary_phone: usize,
    main_street: usize,
    main_street_number: usize,
    main_city: usize,
    main_postcode: usize,
    main_country: usize,
}

impl Schema {
    /// Resolve the required columns against an actual column list, failing
    /// with the first missing column.
    pub fn resolve(columns: &[String]) -> Result<Self, SchemaError> {
        let find = |name: &str| -> Result<usize, SchemaError> {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| SchemaError::MissingColumn {
                    column: name.to_string(),
                })
        };

        Ok(Schema {
            company_name: find("company_name")?,
            website_domain: find("website_domain")?,
            primary_phone: find("primary_phone")?,
            main_street: find("main_street")?,
            main_street_number: find("main_street_number")?,
            main_city: find("main_city")?,
            main_postcode: find("main_postcode")?,
            main_country: find("main_country")?,
        })
    }
}

impl RawTable {
    /// Validate the schema and project every row into a [`RawRecord`].
    /// Rows shorter than the column list are padded with `None`.
    pub fn records(&self) -> Result<Vec<RawRecord>, SchemaError> {
        let schema = Schema::resolve(&self.columns)?;

        let cell = |row: &Vec<Option<String>>, idx: usize| row.get(idx).cloned().flatten();

        Ok(self
            .rows
            .iter()
            .enumerate()
            .map(|(id, row)| RawRecord {
                id,
                company_name: cell(row, schema.company_name),
                website_domain: cell(row, schema.website_domain),
                primary_phone: cell(row, schema.primary_phone),
                main_street: cell(row, schema.main_street),
                main_street_number: cell(row, schema.main_street_number),
                main_city: cell(row, schema.main_city),
                main_postcode: cell(row, schema.main_postcode),
                main_country: cell(row, schema.main_country),
            })
            .collect())
    }
}
