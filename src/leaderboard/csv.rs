// Minimal comma-separated reader/writer for the leaderboard snapshot.
// Quotes fields that need it and tolerates CRLF on the way back in.

use std::mem::take;

const SEP: char = ',';

/* ---------------- Parsing ---------------- */

/// Split CSV text into records. Blank lines are skipped.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some('"')) {
                    chars.next(); // doubled quote escape
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
                quoted = true;
            }
            c if c == SEP && !in_quotes => {
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                flush_row(&mut rows, &mut row, &mut field, &mut quoted);
            }
            _ => field.push(ch),
        }
    }

    // Trailing record without a final newline
    flush_row(&mut rows, &mut row, &mut field, &mut quoted);

    rows
}

fn flush_row(
    rows: &mut Vec<Vec<String>>,
    row: &mut Vec<String>,
    field: &mut String,
    quoted: &mut bool,
) {
    let blank = row.is_empty() && field.is_empty() && !*quoted;
    row.push(take(field));
    if blank {
        row.clear();
    } else {
        rows.push(take(row));
    }
    *quoted = false;
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Append one record, newline-terminated
pub fn write_row<S: AsRef<str>>(out: &mut String, row: &[S]) {
    for (index, cell) in row.iter().enumerate() {
        if index > 0 {
            out.push(SEP);
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}
