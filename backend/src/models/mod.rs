//! In-memory tables.
//!
//! A [`Table`] is an ordered header plus ordered rows, each row a
//! column-name → cell map. Column names keep their original case; lookups
//! from a parsed function go through [`Table::resolve_column`], which matches
//! case-insensitively.

use serde::Serialize;
use std::collections::HashMap;

/// One data row: column name → cell value.
pub type Row = HashMap<String, String>;

/// A table read from a CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Column names in file order.
    pub headers: Vec<String>,
    /// Rows in file order.
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from string slices, mostly for tests and examples.
    ///
    /// ```
    /// use lookupmask::Table;
    ///
    /// let table = Table::from_records(&["id", "name"], &[&["1", "Ann"]]);
    /// assert_eq!(table.rows[0]["name"], "Ann");
    /// ```
    pub fn from_records(headers: &[&str], records: &[&[&str]]) -> Self {
        let mut table = Self::new(headers.iter().map(|h| h.to_string()).collect());
        for record in records {
            table.push_record(record.iter().map(|c| c.to_string()));
        }
        table
    }

    /// Append a row given its cells in header order.
    ///
    /// Missing trailing cells become empty strings; extra cells are dropped.
    pub fn push_record<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut cells = cells.into_iter();
        let row = self
            .headers
            .iter()
            .map(|header| (header.clone(), cells.next().unwrap_or_default()))
            .collect();
        self.rows.push(row);
    }

    /// Find the stored header matching `name` case-insensitively.
    pub fn resolve_column(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .find(|h| h.trim().to_lowercase() == wanted)
            .map(String::as_str)
    }

    /// Resolve several names at once, keeping their order.
    pub fn resolve_columns(&self, names: &[String]) -> Vec<Option<String>> {
        names
            .iter()
            .map(|name| self.resolve_column(name).map(str::to_string))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cell value of `row` for an already resolved column; missing → `""`.
pub fn cell<'a>(row: &'a Row, column: Option<&str>) -> &'a str {
    column
        .and_then(|c| row.get(c))
        .map(String::as_str)
        .unwrap_or("")
}

/// Result of a join: header plus positional rows, ready to be written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
