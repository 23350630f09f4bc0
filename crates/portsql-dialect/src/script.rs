//! SQL script utilities.
//!
//! The runner never relies on a driver's multi-statement mode: emitted
//! scripts are split at top-level `;` terminators here, with awareness of
//! quoted strings, quoted identifiers, and line comments.

/// Splits a script into its top-level statements.
///
/// Semicolons inside single-quoted literals (with `''` escapes),
/// double-quoted or backtick-quoted identifiers, and `--` line comments do
/// not terminate a statement. Empty and comment-only fragments are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    #[derive(PartialEq)]
    enum Mode {
        Normal,
        SingleQuote,
        DoubleQuote,
        Backtick,
        LineComment,
    }

    let mut statements = Vec::new();
    let mut current = String::new();
    let mut mode = Mode::Normal;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match mode {
            Mode::Normal => match c {
                ';' => flush(&mut statements, &mut current),
                '\'' => {
                    mode = Mode::SingleQuote;
                    current.push(c);
                }
                '"' => {
                    mode = Mode::DoubleQuote;
                    current.push(c);
                }
                '`' => {
                    mode = Mode::Backtick;
                    current.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    mode = Mode::LineComment;
                    current.push(c);
                }
                _ => current.push(c),
            },
            Mode::SingleQuote => {
                current.push(c);
                if c == '\'' {
                    // A doubled quote stays inside the literal.
                    if chars.peek() == Some(&'\'') {
                        current.push(chars.next().unwrap());
                    } else {
                        mode = Mode::Normal;
                    }
                }
            }
            Mode::DoubleQuote => {
                current.push(c);
                if c == '"' {
                    mode = Mode::Normal;
                }
            }
            Mode::Backtick => {
                current.push(c);
                if c == '`' {
                    mode = Mode::Normal;
                }
            }
            Mode::LineComment => {
                current.push(c);
                if c == '\n' {
                    mode = Mode::Normal;
                }
            }
        }
    }
    flush(&mut statements, &mut current);

    statements
}

fn flush(statements: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() && !is_comment_only(trimmed) {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

fn is_comment_only(fragment: &str) -> bool {
    fragment.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with("--")
    })
}

/// Returns `true` for bare transaction-control statements.
///
/// Emitted rebuild scripts carry their own `BEGIN`/`COMMIT` so they stay
/// runnable standalone; inside the runner's transaction those statements
/// are skipped.
pub fn is_transaction_control(statement: &str) -> bool {
    let upper = statement.trim().trim_end_matches(';').to_ascii_uppercase();
    matches!(
        upper.as_str(),
        "BEGIN"
            | "BEGIN TRANSACTION"
            | "BEGIN DEFERRED"
            | "BEGIN IMMEDIATE"
            | "BEGIN EXCLUSIVE"
            | "COMMIT"
            | "COMMIT TRANSACTION"
            | "END"
            | "END TRANSACTION"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_at_top_level_semicolons() {
        let statements = split_statements("CREATE TABLE a (x INTEGER);\nCREATE TABLE b (y INTEGER);");
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE a (x INTEGER)".to_string(),
                "CREATE TABLE b (y INTEGER)".to_string(),
            ]
        );
    }

    #[test]
    fn semicolon_inside_string_literal_is_kept() {
        let statements = split_statements("INSERT INTO t (x) VALUES ('a;b');DELETE FROM t");
        assert_eq!(
            statements,
            vec![
                "INSERT INTO t (x) VALUES ('a;b')".to_string(),
                "DELETE FROM t".to_string(),
            ]
        );
    }

    #[test]
    fn doubled_quote_escape_is_handled() {
        let statements = split_statements("INSERT INTO t (x) VALUES ('it''s; fine');");
        assert_eq!(statements, vec!["INSERT INTO t (x) VALUES ('it''s; fine')".to_string()]);
    }

    #[test]
    fn semicolon_inside_quoted_identifiers_is_kept() {
        let statements = split_statements("SELECT \"a;b\" FROM t; SELECT `c;d` FROM u;");
        assert_eq!(
            statements,
            vec![
                "SELECT \"a;b\" FROM t".to_string(),
                "SELECT `c;d` FROM u".to_string(),
            ]
        );
    }

    #[test]
    fn comment_only_fragments_are_dropped() {
        let statements = split_statements("-- nothing to do here;\n");
        assert!(statements.is_empty());

        let statements = split_statements("-- note\nSELECT 1;");
        assert_eq!(statements, vec!["-- note\nSELECT 1".to_string()]);
    }

    #[test]
    fn empty_fragments_are_dropped() {
        let statements = split_statements("SELECT 1;;;\n;SELECT 2;");
        assert_eq!(statements, vec!["SELECT 1".to_string(), "SELECT 2".to_string()]);
    }

    #[test]
    fn transaction_control_detection() {
        assert!(is_transaction_control("BEGIN"));
        assert!(is_transaction_control("begin transaction"));
        assert!(is_transaction_control("COMMIT"));
        assert!(is_transaction_control("  END  "));
        assert!(!is_transaction_control("BEGIN WORK NOW")); // not a bare form
        assert!(!is_transaction_control("CREATE TABLE begin_commit (x INTEGER)"));
    }

    #[test]
    fn rebuild_script_splits_cleanly() {
        let script = "PRAGMA foreign_keys=OFF;\nBEGIN;\nCREATE TABLE \"t_new\" (\n    \"x\" TEXT\n);\nCOMMIT;\nPRAGMA foreign_keys=ON;";
        let statements = split_statements(script);
        assert_eq!(statements.len(), 5);
        assert!(statements[1].eq_ignore_ascii_case("BEGIN"));
        assert!(is_transaction_control(&statements[1]));
        assert!(!is_transaction_control(&statements[2]));
    }
}
