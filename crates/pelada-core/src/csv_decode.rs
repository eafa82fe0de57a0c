// Quote-aware CSV decoding for published Google Sheets exports.
//
// The sheets are hand-edited, so the decoder is lenient: a quote toggles the
// quoted state wherever it appears, and nothing here ever fails.

/// Decode raw CSV text into rows of string fields, in source order.
///
/// - `"` toggles the quoted state; `""` inside a quoted field is a literal `"`.
/// - `,` outside quotes ends a field.
/// - `\n`, `\r`, or `\r\n` outside quotes ends a row.
/// - Rows consisting of a single empty field are dropped (blank lines).
pub fn decode(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    // Trailing row without a final line break.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row);
    }

    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    let blank = row.len() == 1 && row[0].is_empty();
    if !blank {
        rows.push(row);
    }
}

/// Trim a header cell. Sheets exports occasionally carry a UTF-8 byte order
/// mark on the first cell, which `str::trim` keeps.
pub fn trim_header(cell: &str) -> String {
    cell.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
