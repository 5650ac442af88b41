// src/csv.rs
use std::io::{self, Write};
use std::mem::take;

/* ---------------- Parsing ---------------- */

/// Minimal CSV parser (quotes + CRLF tolerant). std-only.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = s!();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => {
                // move the field without cloning
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) { chars.next(); }
                row.push(take(&mut field));
                if !row.is_empty() && !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush any trailing field/row even if quotes were unterminated.
    row.push(field);
    if !(row.len() == 1 && row[0].is_empty()) {
        rows.push(row);
    }

    rows
}

/// Parse exactly one physical record line (as handed out by the position
/// reader). Trailing CR/LF is ignored; embedded newlines are not supported,
/// matching the one-record-per-line snapshot format.
pub fn parse_line(line: &str, sep: char) -> Vec<String> {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut fields = Vec::new();
    let mut field = s!();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => fields.push(take(&mut field)),
            _ => field.push(ch),
        }
    }
    fields.push(field);
    fields
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_plain() {
        assert_eq!(parse_line("a,b,c\n", ','), vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_line_quoted_comma_and_escape() {
        assert_eq!(
            parse_line(r#""Smith, John",NE,"he said ""hi""""#, ','),
            vec!["Smith, John", "NE", r#"he said "hi""#]
        );
    }

    #[test]
    fn parse_line_crlf() {
        assert_eq!(parse_line("a,b\r\n", ','), vec!["a", "b"]);
    }

    #[test]
    fn parse_line_trailing_empty_field() {
        assert_eq!(parse_line("a,,\n", ','), vec!["a", "", ""]);
    }

    #[test]
    fn write_row_quotes_when_needed() {
        let mut buf = Vec::new();
        let row = vec![s!("Smith, John"), s!("NE"), s!("QB")];
        write_row(&mut buf, &row, ',').unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\"Smith, John\",NE,QB\n");
    }

    #[test]
    fn parse_rows_skips_blank_lines() {
        let rows = parse_rows("a,b\n\nc,d\n", ',');
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }
}
