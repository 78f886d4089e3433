//! Search result types.

use csv::{Terminator, WriterBuilder};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::{CatalogError, CatalogResult};

use super::state::{DisplayBy, ExportFormat};

/// One row produced by the store, keyed by `table.column`.
///
/// Cells keep the order in which the store produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column` to `value`, replacing any existing cell.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, column: impl Into<String>, value: Value) -> Self {
        self.insert(column, value);
        self
    }

    /// Returns the value of `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    /// Iterates cells in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// A "did-you-mean" candidate.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Suggestion {
    /// Normalized candidate name.
    pub candidate: String,
    /// Edit distance to the typed query.
    pub distance: usize,
}

/// One page of results.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResultPage {
    /// Rows of this page.
    pub rows: Vec<Row>,
    /// Matches across all pages.
    pub total: u64,
    /// Zero-based page number.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Number of pages; zero when nothing matched.
    pub total_pages: u64,
    /// Row grouping used.
    pub display_by: DisplayBy,
    /// Name suggestions, closest first.
    pub suggestions: Vec<Suggestion>,
    /// Human-readable description of the criteria applied.
    pub label: String,
}

/// Every matching row, flattened for export.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExportTable {
    /// Requested format.
    pub format: ExportFormat,
    /// Header, in canonical export order.
    pub columns: Vec<String>,
    /// One cell per column.
    pub rows: Vec<Vec<Value>>,
    /// Name suggestions, closest first.
    pub suggestions: Vec<Suggestion>,
    /// Description of the criteria applied.
    pub label: String,
}

impl ExportTable {
    /// Renders the table as CSV with a header line and CRLF line endings.
    pub fn to_csv(&self) -> CatalogResult<String> {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(cell_text))?;
        }
        let bytes = writer.into_inner().map_err(|e| CatalogError::Export {
            message: e.error().to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| CatalogError::Export {
            message: e.to_string(),
        })
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join("|"),
        other => other.to_string(),
    }
}

/// What a search produced.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A window of the result set.
    Page(ResultPage),
    /// The full result set flattened for export.
    Export(ExportTable),
}

impl SearchOutcome {
    /// Total number of matches reported by the search.
    pub fn total(&self) -> u64 {
        match self {
            SearchOutcome::Page(page) => page.total,
            SearchOutcome::Export(table) => table.rows.len() as u64,
        }
    }

    /// Name suggestions.
    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            SearchOutcome::Page(page) => &page.suggestions,
            SearchOutcome::Export(table) => &table.suggestions,
        }
    }

    /// Description of the criteria applied.
    pub fn label(&self) -> &str {
        match self {
            SearchOutcome::Page(page) => &page.label,
            SearchOutcome::Export(table) => &table.label,
        }
    }
}
