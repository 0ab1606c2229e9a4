//! Human-readable figures for row counts and byte sizes.

pub fn format_rows(rows: Option<u64>) -> String {
    let Some(rows) = rows else {
        return "N/A".to_string();
    };

    let value = rows as f64;
    if rows < 1_000 {
        rows.to_string()
    } else if rows < 1_000_000 {
        format!("{:.1}K", value / 1_000.0)
    } else if rows < 1_000_000_000 {
        format!("{:.1}M", value / 1_000_000.0)
    } else {
        format!("{:.1}B", value / 1_000_000_000.0)
    }
}

/// 1024-based byte size with one decimal, e.g. `1.5 KB`.
pub fn format_bytes(bytes: Option<u64>) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    let Some(bytes) = bytes else {
        return "N/A".to_string();
    };
    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT && exp < PREFIXES.len() - 1 {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}
