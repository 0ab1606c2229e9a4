//! Decoder for `TabSeparated` response bodies.

use crate::app::ports::{Field, NULL_SENTINEL, Row, SourceError};

/// One row per line, fields split on tabs. `\N` decodes to null; every other
/// field is unescaped text.
pub fn parse_tab_separated(body: &str) -> Result<Vec<Row>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| SourceError::Malformed(format!("TSV parse error: {e}")))?;
        let fields = record
            .iter()
            .map(|raw| {
                if raw == NULL_SENTINEL {
                    Field::Null
                } else {
                    Field::Text(unescape(raw))
                }
            })
            .collect();
        rows.push(Row::new(fields));
    }
    Ok(rows)
}

/// Decodes backslash escapes. Unknown escapes yield the escaped character.
pub fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    mod parse {
        use super::*;

        #[test]
        fn empty_body_has_no_rows() {
            assert!(parse_tab_separated("").unwrap().is_empty());
        }

        #[test]
        fn lines_split_into_fields() {
            let body = "analytics\tevents\tMergeTree\t10\n\
                        analytics\tdaily\tSummingMergeTree\t\\N\n";

            let rows = parse_tab_separated(body).unwrap();

            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].text(1).unwrap(), "events");
            assert_eq!(rows[0].u64(3).unwrap(), 10);
            assert_eq!(rows[1].fields()[3], Field::Null);
            assert_eq!(rows[1].opt_u64(3).unwrap(), None);
        }

        #[test]
        fn escaped_newlines_stay_inside_field() {
            let body = "CREATE TABLE t\\n(\\n    `id` UInt64\\n)\tx\n";

            let rows = parse_tab_separated(body).unwrap();

            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].text(0).unwrap(), "CREATE TABLE t\n(\n    `id` UInt64\n)");
        }

        #[test]
        fn array_columns_decode_through_row_getter() {
            let body = "['analytics','billing']\t[]\n";

            let rows = parse_tab_separated(body).unwrap();

            assert_eq!(rows[0].strings(0).unwrap(), vec!["analytics", "billing"]);
            assert!(rows[0].strings(1).unwrap().is_empty());
        }

        #[test]
        fn quotes_are_not_special() {
            let rows = parse_tab_separated("\"a\tb\"\n").unwrap();

            assert_eq!(rows[0].len(), 2);
            assert_eq!(rows[0].text(0).unwrap(), "\"a");
        }
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("a\\tb", "a\tb")]
    #[case("a\\nb", "a\nb")]
    #[case("a\\rb", "a\rb")]
    #[case("a\\\\b", "a\\b")]
    #[case("it\\'s", "it's")]
    #[case("nul\\0", "nul\0")]
    #[case("\\b\\f", "\u{8}\u{c}")]
    #[case("trailing\\", "trailing\\")]
    fn unescape_decodes_escapes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unescape(input), expected);
    }
}
