// src/matcher/mod.rs

use tracing::{debug, instrument};

use crate::table::{Cell, Table, TableRow};

/// Normalised identifier: trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    needle: String,
}

impl MatchQuery {
    pub fn new(identifier: &str) -> Self {
        Self {
            needle: identifier.trim().to_lowercase(),
        }
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Absent cells never match, and neither does an empty query.
    pub fn matches(&self, cell: &Cell) -> bool {
        if self.needle.is_empty() {
            return false;
        }
        cell.as_text()
            .is_some_and(|text| text.trim().to_lowercase() == self.needle)
    }
}

/// Every row holding a cell equal to the query in any column, in table order.
#[instrument(level = "debug", skip(table), fields(needle = query.needle()))]
pub fn match_rows<'a>(table: &'a Table, query: &MatchQuery) -> Vec<&'a TableRow> {
    let matched: Vec<&TableRow> = table
        .rows()
        .iter()
        .filter(|row| row.cells().iter().any(|cell| query.matches(cell)))
        .collect();
    debug!(
        matched = matched.len(),
        scanned = table.rows().len(),
        "matched rows"
    );
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sample() -> Table {
        Table::new(
            vec!["Name".into(), "Code".into(), "Alt".into()],
            vec![
                TableRow::new(vec![text("Ann"), text("ABC123"), Cell::Absent]),
                TableRow::new(vec![text("Bob"), text("XYZ9"), text("abc123")]),
                TableRow::new(vec![text("Cy"), Cell::Number(42.0), Cell::Bool(true)]),
                TableRow::new(vec![text("abc123 "), text("abc123"), text("ABC123")]),
            ],
        )
    }

    #[test]
    fn test_match_ignores_case_and_whitespace() {
        let table = sample();
        for q in ["abc123", " ABC123 ", "Abc123"] {
            let rows = match_rows(&table, &MatchQuery::new(q));
            assert_eq!(rows.len(), 3, "query {:?}", q);
            assert_eq!(rows[0].cell(0), &text("Ann"));
            assert_eq!(rows[1].cell(0), &text("Bob"));
        }
    }

    #[test]
    fn test_row_with_repeated_hits_counts_once() {
        let table = sample();
        let rows = match_rows(&table, &MatchQuery::new("abc123"));
        assert_eq!(rows.last().unwrap().cell(0), &text("abc123 "));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_non_text_cells_match_their_string_form() {
        let table = sample();
        assert_eq!(match_rows(&table, &MatchQuery::new("42")).len(), 1);
        assert_eq!(match_rows(&table, &MatchQuery::new("TRUE")).len(), 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        let table = sample();
        assert!(match_rows(&table, &MatchQuery::new("nobody")).is_empty());
        assert!(match_rows(&Table::default(), &MatchQuery::new("abc123")).is_empty());
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let table = Table::new(
            vec!["a".into()],
            vec![TableRow::new(vec![text("   ")]), TableRow::new(vec![Cell::Absent])],
        );
        assert!(MatchQuery::new("  ").is_empty());
        assert!(match_rows(&table, &MatchQuery::new("  ")).is_empty());
    }
}
