// src/remap/mod.rs

pub mod number;

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

use crate::error::ConfigError;
use crate::table::{Cell, TableRow};

pub use number::{extract_number, format_grouped, NumberLocale};

/// Rendering of a value that has no data.
pub const ABSENT_MARKER: &str = "—";

/// A single spreadsheet column letter, `A` to `Z`.
///
/// Only single-letter columns are addressable, so at most the first 26 columns of a sheet can be
/// remapped. Multi-letter columns (`AA`, ...) are rejected when the column spec is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnLetter(u8);

impl ColumnLetter {
    pub fn new(letter: char) -> Result<Self, ConfigError> {
        if letter.is_ascii_alphabetic() {
            Ok(Self(letter.to_ascii_uppercase() as u8))
        } else {
            Err(ConfigError::InvalidColumnLetter(letter.to_string()))
        }
    }

    /// 0-based ordinal: `A` is 0, `Z` is 25.
    pub fn index(self) -> usize {
        (self.0 - b'A') as usize
    }

    pub fn as_char(self) -> char {
        self.0 as char
    }
}

impl FromStr for ColumnLetter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::new(letter),
            _ => Err(ConfigError::InvalidColumnLetter(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ColumnLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// How a remapped value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldFormat {
    /// The cell's string form.
    #[default]
    Plain,
    /// First number in the cell, rendered with locale grouping; falls back to the string form.
    Grouped,
}

impl FromStr for FieldFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(FieldFormat::Plain),
            "grouped" | "number" => Ok(FieldFormat::Grouped),
            _ => Err(ConfigError::UnknownColumnFormat(s.trim().to_string())),
        }
    }
}

/// One `(letter, output name)` pair of a [`ColumnLetterSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub letter: ColumnLetter,
    pub name: String,
    pub format: FieldFormat,
}

impl FieldSpec {
    pub fn new(letter: ColumnLetter, name: impl Into<String>) -> Self {
        Self {
            letter,
            name: name.into(),
            format: FieldFormat::Plain,
        }
    }

    pub fn grouped(mut self) -> Self {
        self.format = FieldFormat::Grouped;
        self
    }
}

/// Ordered column-letter → output-field mapping. Output field order always follows this list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLetterSpec {
    fields: Vec<FieldSpec>,
}

impl ColumnLetterSpec {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        if fields.is_empty() {
            return Err(ConfigError::EmptyColumnSpec);
        }
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::EmptyFieldName(field.letter.as_char()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::DuplicateFieldName(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// Parse `LETTER=Name[:format]` entries separated by `;`, e.g. `D=Rank;J=TP:grouped`.
    /// Output names therefore cannot contain `;` or `:`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let mut fields = Vec::new();
        for entry in spec.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (letter, rest) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedColumnEntry(entry.to_string()))?;
            let letter: ColumnLetter = letter.parse()?;
            let (name, format) = match rest.rsplit_once(':') {
                Some((name, format)) => (name, format.parse::<FieldFormat>()?),
                None => (rest, FieldFormat::Plain),
            };
            fields.push(FieldSpec {
                letter,
                name: name.trim().to_string(),
                format,
            });
        }
        Self::new(fields)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

impl Default for ColumnLetterSpec {
    /// The dashboard's columns: D, G, J, P, R, S, T, U, W. Only `J` (TP) is grouped.
    fn default() -> Self {
        let field = |letter: u8, name: &str| FieldSpec::new(ColumnLetter(letter), name);
        Self {
            fields: vec![
                field(b'D', "Rank"),
                field(b'G', "Role"),
                field(b'J', "TP").grouped(),
                field(b'P', "Điểm trung bình chuyên môn"),
                field(b'R', "Technical"),
                field(b'S', "Trial"),
                field(b'T', "Sư Phạm"),
                field(b'U', "Điểm đánh giá"),
                field(b'W', "Đánh giá"),
            ],
        }
    }
}

/// A remapped, display-normalised value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Text(String),
    Number { value: f64, display: String },
    Absent,
}

impl ResolvedValue {
    pub fn display(&self) -> &str {
        match self {
            ResolvedValue::Text(s) => s.as_str(),
            ResolvedValue::Number { display, .. } => display.as_str(),
            ResolvedValue::Absent => ABSENT_MARKER,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ResolvedValue::Absent)
    }

    fn from_cell(cell: &Cell, format: FieldFormat, locale: &NumberLocale) -> Self {
        let Some(text) = cell.as_text() else {
            return ResolvedValue::Absent;
        };
        match format {
            FieldFormat::Grouped => match extract_number(&text) {
                Some(value) => ResolvedValue::Number {
                    value,
                    display: format_grouped(value, locale),
                },
                None => ResolvedValue::Text(text.into_owned()),
            },
            FieldFormat::Plain => ResolvedValue::Text(text.into_owned()),
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

impl Serialize for ResolvedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display())
    }
}

/// Output row keyed by output field name, in column-spec order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedRow {
    fields: Vec<(String, ResolvedValue)>,
}

impl ResolvedRow {
    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ResolvedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Re-project `row` by column letter. Positions at or past the end of `header` are absent,
/// whatever the row holds there. Never fails.
pub fn remap(
    row: &TableRow,
    header: &[String],
    spec: &ColumnLetterSpec,
    locale: &NumberLocale,
) -> ResolvedRow {
    let fields = spec
        .fields()
        .iter()
        .map(|field| {
            let index = field.letter.index();
            let value = if index < header.len() {
                ResolvedValue::from_cell(row.cell(index), field.format, locale)
            } else {
                ResolvedValue::Absent
            };
            trace!(letter = %field.letter, index, name = %field.name, value = %value, "remapped");
            (field.name.clone(), value)
        })
        .collect();
    ResolvedRow { fields }
}
