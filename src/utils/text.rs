//! Text normalisation shared by the source readers and the joins.

/// Byte-order mark some spreadsheet exports put in front of the first cell
const BOM: char = '\u{feff}';

/// Normalise one raw cell: drop a byte-order mark, turn the no-break space
/// variants into plain spaces, and trim whitespace and surrounding quotes.
#[must_use]
pub fn normalize_cell(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .filter(|c| *c != BOM)
        .map(|c| match c {
            '\u{00a0}' | '\u{202f}' | '\u{2007}' | '\t' => ' ',
            other => other,
        })
        .collect();

    replaced.trim().trim_matches('"').trim().to_string()
}

/// Decode raw bytes as UTF-8, replacing invalid sequences
#[must_use]
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Join key used when matching country names across datasets:
/// trimmed, internal whitespace collapsed, case-folded.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    normalize_cell(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Parse a year from cells such as `2018`, `2018.0` or `2018-06`
#[must_use]
pub fn parse_year(raw: &str) -> Option<i32> {
    let cell = normalize_cell(raw);
    let leading = cell.split(['-', '.', '/']).next()?.trim();
    if leading.is_empty() || !leading.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    leading.parse::<i32>().ok()
}
