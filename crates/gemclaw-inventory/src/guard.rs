//! Read-only statement guard for model-generated SQL.
//!
//! Only a single `SELECT` (optionally introduced by `WITH`) may reach the
//! database. The store additionally refuses any prepared statement that
//! SQLite itself does not report as read-only.

/// Keywords that never appear in a read-only query.
const FORBIDDEN: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "ATTACH", "DETACH", "PRAGMA",
    "VACUUM", "REINDEX", "TRUNCATE", "GRANT", "REVOKE",
];

/// Check that `sql` is a single read-only query.
pub fn ensure_read_only(sql: &str) -> Result<(), String> {
    let masked = mask_literals_and_comments(sql);
    let body = masked.trim().trim_end_matches(';').trim();

    if body.is_empty() {
        return Err("empty statement".into());
    }
    if body.contains(';') {
        return Err("multiple statements are not allowed".into());
    }

    let tokens: Vec<String> = body
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_uppercase())
        .collect();

    match tokens.first().map(String::as_str) {
        Some("SELECT") | Some("WITH") => {}
        Some(other) => return Err(format!("only SELECT queries are allowed (got {other})")),
        None => return Err("empty statement".into()),
    }

    if let Some(bad) = tokens.iter().find(|t| FORBIDDEN.contains(&t.as_str())) {
        return Err(format!("{bad} is not allowed in a read-only query"));
    }
    // REPLACE is also a scalar function; only `REPLACE INTO` writes.
    if tokens.windows(2).any(|w| w[0] == "REPLACE" && w[1] == "INTO") {
        return Err("REPLACE is not allowed in a read-only query".into());
    }
    Ok(())
}

/// Blank out string literals, quoted identifiers and comments so keyword
/// checks only see SQL structure. Quote characters themselves are kept.
fn mask_literals_and_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                out.push(c);
                while let Some(n) = chars.next() {
                    if n == c {
                        // doubled quote is an escaped quote inside the literal
                        if chars.peek() == Some(&c) {
                            chars.next();
                            out.push(' ');
                            continue;
                        }
                        out.push(c);
                        break;
                    }
                    out.push(' ');
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_select_allowed() {
        assert!(ensure_read_only("SELECT COUNT(*) FROM inventory WHERE cut = 'Ideal'").is_ok());
        assert!(ensure_read_only("select max(price) from inventory;").is_ok());
    }

    #[test]
    fn test_cte_allowed() {
        let sql = "WITH big AS (SELECT * FROM inventory WHERE carat > 2) SELECT COUNT(*) FROM big";
        assert!(ensure_read_only(sql).is_ok());
    }

    #[test]
    fn test_destructive_rejected() {
        assert!(ensure_read_only("DROP TABLE inventory").is_err());
        assert!(ensure_read_only("DELETE FROM inventory").is_err());
        assert!(ensure_read_only("UPDATE inventory SET price = 0").is_err());
        assert!(ensure_read_only("PRAGMA writable_schema = 1").is_err());
    }

    #[test]
    fn test_stacked_statements_rejected() {
        let err = ensure_read_only("SELECT 1; DROP TABLE inventory").unwrap_err();
        assert!(err.contains("multiple"));
    }

    #[test]
    fn test_cte_with_write_rejected() {
        let sql = "WITH x AS (SELECT 1) DELETE FROM inventory";
        assert!(ensure_read_only(sql).is_err());
        let sql = "WITH x AS (SELECT 1) REPLACE INTO inventory SELECT * FROM x";
        assert!(ensure_read_only(sql).is_err());
    }

    #[test]
    fn test_keywords_inside_literals_ignored() {
        assert!(ensure_read_only("SELECT * FROM inventory WHERE cut = 'DROP; DELETE'").is_ok());
        assert!(ensure_read_only("SELECT 1 -- then DROP TABLE inventory").is_ok());
        assert!(ensure_read_only("SELECT /* update */ price FROM inventory").is_ok());
        assert!(ensure_read_only("SELECT 'it''s; fine' AS note").is_ok());
    }

    #[test]
    fn test_replace_function_allowed() {
        assert!(ensure_read_only("SELECT replace(cut, 'Very ', '') FROM inventory").is_ok());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(ensure_read_only("   ").is_err());
        assert!(ensure_read_only("-- nothing").is_err());
    }
}
