//! Category catalog for guided generation.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;

/// One `category / subcategory / item` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub category: String,
    pub subcategory: String,
    pub item: String,
}

impl CategoryEntry {
    fn new(category: &str, subcategory: &str, item: &str) -> Self {
        Self {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            item: item.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct CatalogCsvRow {
    #[serde(rename = "Category", default)]
    category: String,
    #[serde(rename = "Sub-Category", default)]
    subcategory: String,
    #[serde(rename = "Item", default)]
    item: String,
}

/// Categories guided batches draw from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CategoryEntry>,
}

impl Catalog {
    /// Small catalog used when no CSV is configured.
    pub fn builtin() -> Self {
        let entries = [
            ("Hardware", "Computer", "Laptop"),
            ("Hardware", "Computer", "Desktop"),
            ("Hardware", "Peripherals", "Monitor"),
            ("Hardware", "Peripherals", "Keyboard/Mouse"),
            ("Hardware", "Printer", "Label Printer"),
            ("Network", "Connectivity", "VPN"),
            ("Network", "Connectivity", "Wi-Fi"),
            ("Point of Sale", "POS Terminal", ""),
            ("Point of Sale", "EFTPOS", ""),
            ("Software", "ERP", "Framework"),
            ("Software", "Email", "Outlook"),
            ("Software", "Installation", ""),
            ("Access", "Accounts", "New User"),
            ("Access", "Accounts", "Password Reset"),
            ("Access", "Shared Drive", ""),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(c, s, i)| CategoryEntry::new(c, s, i))
                .collect(),
        }
    }

    /// Load a CSV with `Category`, `Sub-Category` and `Item` columns.
    ///
    /// Headers and values are trimmed; rows without a category are skipped.
    pub fn from_csv_path(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(path).map_err(|e| CatalogError::CsvRead {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        Self::from_reader(file, path)
    }

    /// Load from any reader; `origin` is used in errors.
    pub fn from_reader(reader: impl Read, origin: &Path) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        for result in reader.deserialize::<CatalogCsvRow>() {
            let row = result.map_err(|e| CatalogError::CsvRead {
                path: origin.to_path_buf(),
                source: e,
            })?;
            if row.category.is_empty() {
                continue;
            }
            entries.push(CategoryEntry {
                category: row.category,
                subcategory: row.subcategory,
                item: row.item,
            });
        }

        if entries.is_empty() {
            return Err(CatalogError::Empty {
                path: origin.to_path_buf(),
            });
        }
        tracing::debug!(path = %origin.display(), entries = entries.len(), "loaded category catalog");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
