//! Literal quoting and placeholder binding for ClickHouse statements.

use crate::ports::SourceError;

/// Escape a value as a ClickHouse string literal.
/// Backslashes are escaped and embedded single quotes doubled.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Replace each `?` placeholder with the next argument as a quoted literal.
pub fn bind_args(statement: &str, args: &[&str]) -> Result<String, SourceError> {
    let mut bound = String::with_capacity(statement.len());
    let mut remaining = args.iter();
    for c in statement.chars() {
        if c == '?' {
            let arg = remaining.next().ok_or_else(|| {
                SourceError::Query(format!(
                    "statement has more placeholders than the {} arguments supplied",
                    args.len()
                ))
            })?;
            bound.push_str(&quote_literal(arg));
        } else {
            bound.push(c);
        }
    }
    if remaining.next().is_some() {
        return Err(SourceError::Query(format!(
            "{} arguments supplied for fewer placeholders",
            args.len()
        )));
    }
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_literal_simple() {
        assert_eq!(quote_literal("hello"), "'hello'");
    }

    #[test]
    fn quote_literal_with_single_quote() {
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn quote_literal_with_trailing_backslash() {
        assert_eq!(quote_literal("a\\"), "'a\\\\'");
    }

    #[test]
    fn quote_literal_empty() {
        assert_eq!(quote_literal(""), "''");
    }

    #[test]
    fn bind_args_substitutes_in_order() {
        let sql = bind_args("WHERE database = ? AND table = ?", &["db", "o'clock"]).unwrap();

        assert_eq!(sql, "WHERE database = 'db' AND table = 'o''clock'");
    }

    #[test]
    fn bind_args_without_placeholders_passes_through() {
        assert_eq!(bind_args("SELECT 1", &[]).unwrap(), "SELECT 1");
    }

    #[test]
    fn bind_args_rejects_missing_argument() {
        assert!(matches!(
            bind_args("a = ? AND b = ?", &["x"]),
            Err(SourceError::Query(_))
        ));
    }

    #[test]
    fn bind_args_rejects_surplus_argument() {
        assert!(matches!(
            bind_args("SELECT 1", &["x"]),
            Err(SourceError::Query(_))
        ));
    }
}
