//! Tolerant CSV scanner for spreadsheet exports.
//!
//! Splits raw text into rows of fields. Handles quoted fields, doubled
//! quotes, raw newlines inside quotes and every line-ending variant.
//! Never fails: garbage in gives rows out, and the mapper decides what to keep.

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" | "latin-9" | "latin9" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the specified encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        "iso-8859-15" | "latin-9" | "latin9" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Decode bytes with auto-detected encoding.
pub fn decode_auto(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    let encoding = detect_encoding(bytes);
    decode_content(bytes, &encoding)
}

/// Rewrite `\r\n` and lone `\r` as `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split CSV text into rows of fields.
///
/// A `"` toggles quoting, except `""` inside a quoted field which yields one
/// literal quote. Commas and newlines only separate outside quotes. A
/// trailing row without a final newline is still emitted.
///
/// # Example
/// ```
/// use annuaire::parser::parse_rows;
///
/// let rows = parse_rows("NOM,VILLE\nDupont,\"Paris, 5e\"");
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1], vec!["Dupont", "Paris, 5e"]);
/// ```
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let clean = normalize_line_endings(text);

    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = clean.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}
