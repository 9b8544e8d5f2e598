//! Map parsed rows onto the fixed record schema.
//!
//! Row 0 is the header. Header cells are normalized and looked up in
//! [`COLUMN_MAP`]; unknown columns are ignored. Values are trimmed, the BAC
//! column is cleaned, and rows without a family name are dropped.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Field, Record};

/// Normalized sheet header → schema field.
///
/// Both `E_MAIL` and `EMAIL` are accepted for the email column.
pub const COLUMN_MAP: &[(&str, Field)] = &[
    ("BAC", Field::Bac),
    ("NOM", Field::Nom),
    ("PRENOM", Field::Prenom),
    ("TEL", Field::Tel),
    ("E_MAIL", Field::Email),
    ("EMAIL", Field::Email),
    ("CELL", Field::Cell),
    ("DATENAISS", Field::DateNaiss),
    ("LIEUNAISS", Field::LieuNaiss),
    ("SEXE", Field::Sexe),
    ("VILLE", Field::Ville),
    ("PAYS", Field::Pays),
    ("PR", Field::Pr),
    ("ETUDES", Field::Etudes),
    ("PROFESSION", Field::Profession),
];

/// Longest BAC value kept after prefix stripping.
pub const BAC_MAX_LEN: usize = 15;

/// A BAC value containing this is treated as a mis-parsed cell.
pub const BAC_REJECT_CHAR: char = ',';

static BAC_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)^BAC\s*").ok());

/// Counters describing one mapping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapReport {
    /// Data rows seen (header excluded).
    pub data_rows: usize,
    /// Rows with one field or less.
    pub skipped_short: usize,
    /// Rows failing the family-name / data requirement.
    pub dropped: usize,
    /// Records produced.
    pub kept: usize,
    /// Header cells that matched no schema field, as written in the sheet.
    pub unmapped_headers: Vec<String>,
}

/// Upper-case and keep only `A-Z`, `0-9` and `_`.
pub fn normalize_header(header: &str) -> String {
    header
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Resolve a raw header cell to its schema field.
pub fn lookup_header(header: &str) -> Option<Field> {
    let normalized = normalize_header(header);
    COLUMN_MAP
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, field)| *field)
}

/// Strip a leading `BAC` label, then blank out values that look like garbage.
pub fn clean_bac(value: &str) -> String {
    let stripped = match BAC_PREFIX.as_ref() {
        Some(re) => re.replace(value, ""),
        None => Cow::Borrowed(value),
    };
    if stripped.chars().count() > BAC_MAX_LEN || stripped.contains(BAC_REJECT_CHAR) {
        return String::new();
    }
    stripped.into_owned()
}

/// Map parsed rows to records.
pub fn map_rows(rows: &[Vec<String>]) -> Vec<Record> {
    map_rows_with_report(rows).0
}

/// Map parsed rows to records and report what was skipped.
pub fn map_rows_with_report(rows: &[Vec<String>]) -> (Vec<Record>, MapReport) {
    let mut report = MapReport::default();

    if rows.len() < 2 {
        return (Vec::new(), report);
    }

    let columns: Vec<Option<Field>> = rows[0].iter().map(|h| lookup_header(h)).collect();
    report.unmapped_headers = rows[0]
        .iter()
        .zip(&columns)
        .filter(|(header, field)| field.is_none() && !header.trim().is_empty())
        .map(|(header, _)| header.trim().to_string())
        .collect();

    let mut records = Vec::new();

    for (row_index, values) in rows.iter().enumerate().skip(1) {
        report.data_rows += 1;

        if values.len() <= 1 {
            report.skipped_short += 1;
            continue;
        }

        let mut record = Record::for_row(row_index);
        let mut has_data = false;

        for (index, column) in columns.iter().enumerate() {
            let (Some(field), Some(raw)) = (column, values.get(index)) else {
                continue;
            };

            let mut value = raw.trim().to_string();
            if *field == Field::Bac {
                value = clean_bac(&value);
            }

            if !value.is_empty() {
                has_data = true;
            }
            record.set(*field, value);
        }

        if has_data && !record.nom.is_empty() {
            records.push(record);
        } else {
            report.dropped += 1;
        }
    }

    report.kept = records.len();
    (records, report)
}
