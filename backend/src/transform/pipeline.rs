//! Ingestion pipeline: raw export text to records.
//!
//! Combines the CSV scanner and the record mapper and logs what was
//! dropped along the way.
//!
//! # Example
//!
//! ```rust
//! use annuaire::transform::pipeline::ingest;
//!
//! let records = ingest("NOM,PRENOM,VILLE\nDupont,Jean,Paris\n");
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].ville, "Paris");
//! ```

use super::mapper::{map_rows_with_report, MapReport};
use crate::logs::{log_info_indent, log_success, log_warning};
use crate::models::Record;
use crate::parser::{decode_auto, parse_rows};

/// Records plus the mapping counters that produced them.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub records: Vec<Record>,
    /// Rows produced by the scanner, header included.
    pub row_count: usize,
    pub report: MapReport,
}

/// Parse export text into records.
pub fn ingest(text: &str) -> Vec<Record> {
    ingest_with_report(text).records
}

/// Decode raw export bytes, then parse them into records.
pub fn ingest_bytes(bytes: &[u8]) -> Vec<Record> {
    ingest(&decode_auto(bytes))
}

/// Parse export text into records, keeping the mapping counters.
pub fn ingest_with_report(text: &str) -> IngestResult {
    let rows = parse_rows(text);
    let row_count = rows.len();

    if row_count < 2 {
        log_warning(format!("Export has {} row(s); nothing to map", row_count));
    }

    let (records, report) = map_rows_with_report(&rows);

    if !report.unmapped_headers.is_empty() {
        log_info_indent(format!("Ignored columns: {}", report.unmapped_headers.join(", ")), 1);
    }
    if report.skipped_short > 0 || report.dropped > 0 {
        log_info_indent(
            format!("Skipped {} short row(s), dropped {} without a name", report.skipped_short, report.dropped),
            1,
        );
    }
    log_success(format!("Loaded {} records from {} data rows", report.kept, report.data_rows));

    IngestResult { records, row_count, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\"BAC\",\"NOM\",\"PRENOM\",\"E-Mail\",\"VILLE\",\"PAYS\",\"PROFESSION\"\r\n\
\"BAC 1999\",\"Dupont\",\"Jean\",\"jean@example.org\",\"Paris\",\"France\",\"Ingénieur\"\r\n\
\"BAC 1999, repeated\",\"Martin\",\"Luc\",\"\",\"Lyon\",\"Italie du Nord\",\"\"\r\n\
\"\",\"\",\"\",\"\",\"\",\"\",\"Avocat\"\r\n";

    #[test]
    fn test_ingest_sheet_export() {
        let result = ingest_with_report(SHEET);

        assert_eq!(result.row_count, 4);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.report.dropped, 1);

        let jean = &result.records[0];
        assert_eq!(jean.id, "row-1");
        assert_eq!(jean.bac, "1999");
        assert_eq!(jean.email, "jean@example.org");

        let luc = &result.records[1];
        assert_eq!(luc.bac, "");
        assert_eq!(luc.pays, "Italie du Nord");
    }

    #[test]
    fn test_ingest_is_repeatable() {
        assert_eq!(ingest(SHEET), ingest(SHEET));
    }

    #[test]
    fn test_output_bounded_by_data_rows() {
        let result = ingest_with_report(SHEET);
        assert!(result.records.len() <= result.report.data_rows);
        assert_eq!(
            result.records.len(),
            result.report.data_rows - result.report.dropped - result.report.skipped_short
        );
    }

    #[test]
    fn test_ingest_bytes_latin1() {
        // "NOM,VILLE\nDupont,Évry" with É as 0xC9
        let mut bytes = b"NOM,VILLE\nDupont,".to_vec();
        bytes.extend_from_slice(&[0xC9, b'v', b'r', b'y']);
        let records = ingest_bytes(&bytes);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].nom, "Dupont");
        assert!(records[0].ville.ends_with("vry"));
    }

    #[test]
    fn test_degenerate_input_is_empty() {
        assert!(ingest("").is_empty());
        assert!(ingest("NOM,PRENOM").is_empty());
    }
}
