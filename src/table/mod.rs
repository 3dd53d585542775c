// src/table/mod.rs

use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, instrument};

use crate::wire::{WireColumn, WireDocument, WireRow};

static ABSENT: Cell = Cell::Absent;

/// One cell as it came off the wire. No coercion between kinds happens here.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing cell, `null` cell, or a cell without a value.
    Absent,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Cell::Absent,
            Some(Value::String(s)) => Cell::Text(s),
            Some(Value::Bool(b)) => Cell::Bool(b),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) => Cell::Number(f),
                None => Cell::Text(n.to_string()),
            },
            // arrays/objects are not expected in a query feed; keep their text
            Some(other) => Cell::Text(other.to_string()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }

    /// String form of the value, `None` when absent.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Absent => None,
            Cell::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Cell::Number(n) => Some(Cow::Owned(n.to_string())),
            Cell::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        }
    }
}

/// Absent cells render as the empty string.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

/// A row addressed by ordinal position; labels live on the owning [`Table`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    cells: Vec<Cell>,
}

impl TableRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Cell at `index`, or [`Cell::Absent`] past the end of the row.
    pub fn cell(&self, index: usize) -> &Cell {
        self.cells.get(index).unwrap_or(&ABSENT)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Ordered header plus ordered rows. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<TableRow>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<TableRow>) -> Self {
        Self { header, rows }
    }

    /// Column names exactly as declared; may contain empty or repeated names.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Key of the column at `index`: its name, or `col_<index>` when the name is empty or the
    /// position lies beyond the header.
    pub fn column_key(&self, index: usize) -> Cow<'_, str> {
        match self.header.get(index) {
            Some(name) if !name.is_empty() => Cow::Borrowed(name.as_str()),
            _ => Cow::Owned(format!("col_{}", index)),
        }
    }

    /// `(key, cell)` pairs of a row, covering every declared column and any extra cells.
    pub fn record<'a>(
        &'a self,
        row: &'a TableRow,
    ) -> impl Iterator<Item = (Cow<'a, str>, &'a Cell)> + 'a {
        let width = self.header.len().max(row.len());
        (0..width).map(move |i| (self.column_key(i), row.cell(i)))
    }

    /// Label-keyed lookup. With repeated names the right-most column wins.
    pub fn value<'a>(&'a self, row: &'a TableRow, key: &str) -> &'a Cell {
        let width = self.header.len().max(row.len());
        (0..width)
            .rev()
            .find(|&i| self.column_key(i) == key)
            .map(|i| row.cell(i))
            .unwrap_or(&ABSENT)
    }
}

fn column_name(col: &WireColumn) -> String {
    [&col.label, &col.id]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .cloned()
        .unwrap_or_default()
}

fn build_row(row: WireRow) -> TableRow {
    TableRow::new(
        row.c
            .into_iter()
            .map(|cell| Cell::from_value(cell.and_then(|c| c.v)))
            .collect(),
    )
}

/// Turn a decoded document into a [`Table`]. Never fails: malformed cells become absent.
#[instrument(level = "debug", skip(doc))]
pub fn build(doc: WireDocument) -> Table {
    let wire = doc.table.unwrap_or_default();
    let header: Vec<String> = wire.cols.iter().map(column_name).collect();
    let rows: Vec<TableRow> = wire.rows.into_iter().map(build_row).collect();
    debug!(columns = header.len(), rows = rows.len(), "built table");
    Table::new(header, rows)
}
