//! Display formatting for `create_table_query` text.

use std::sync::OnceLock;

use regex::Regex;

static COLUMN_BREAK_RE: OnceLock<Regex> = OnceLock::new();

const BREAK_BEFORE: [&str; 13] = [
    "CREATE TABLE",
    "CREATE MATERIALIZED VIEW",
    "CREATE VIEW",
    "CREATE DICTIONARY",
    ") ENGINE =",
    ") AS SELECT",
    "ORDER BY",
    "PARTITION BY",
    "SAMPLE BY",
    "SETTINGS",
    "TTL",
    "PRIMARY KEY",
    "REFRESH EVERY",
];

const CLAUSE_STARTS: [&str; 6] = [
    "ORDER BY",
    "PARTITION BY",
    "SETTINGS",
    "TTL",
    "PRIMARY KEY",
    "REFRESH EVERY",
];

const CONTINUATION_MARKERS: [&str; 4] = ["SELECT", "FROM", "WHERE", "GROUP BY"];

/// Breaks a single-line create statement into clauses with indented columns.
pub fn format_create_query(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let mut broken = query.to_string();
    for keyword in BREAK_BEFORE {
        broken = broken.replace(keyword, &format!("\n{keyword}"));
    }
    let column_break = COLUMN_BREAK_RE.get_or_init(|| Regex::new(r",(\s*`)").unwrap());
    let broken = column_break.replace_all(&broken, ",\n    $1");

    let lines: Vec<&str> = broken.split('\n').collect();
    let mut formatted: Vec<String> = Vec::with_capacity(lines.len());
    let mut in_columns = false;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if trimmed.contains("CREATE") && (trimmed.contains("TABLE") || trimmed.contains("VIEW")) {
            formatted.push(trimmed.to_string());
            in_columns = false;
        } else if trimmed == "(" || (in_columns && trimmed.starts_with('(')) {
            formatted.push(trimmed.to_string());
            in_columns = true;
        } else if trimmed.starts_with(") ENGINE") || trimmed.starts_with(") AS") {
            formatted.push(trimmed.to_string());
            in_columns = false;
        } else if in_columns && trimmed.contains('`') {
            formatted.push(format!("    {trimmed}"));
        } else if CLAUSE_STARTS.iter().any(|clause| trimmed.starts_with(clause)) {
            formatted.push(trimmed.to_string());
        } else if !trimmed.is_empty() {
            let continues = (i > 0 && lines[i - 1].trim().ends_with(','))
                || CONTINUATION_MARKERS
                    .iter()
                    .any(|marker| trimmed.contains(marker));
            if continues {
                formatted.push(format!("    {trimmed}"));
            } else {
                formatted.push(trimmed.to_string());
            }
        }
    }

    formatted.join("\n")
}
