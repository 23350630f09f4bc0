//! Rendering helpers shared by the three emitters.

use portsql_core::column::ColumnType;
use portsql_core::table::IndexDef;

/// Quotes an identifier with double quotes (PostgreSQL, SQLite).
pub(crate) fn quote_double(ident: &str) -> String {
    format!("\"{ident}\"")
}

/// Quotes an identifier with backticks (MySQL).
pub(crate) fn quote_backtick(ident: &str) -> String {
    format!("`{ident}`")
}

/// Escapes a string literal by doubling embedded single quotes.
pub(crate) fn escape_string_literal(s: &str) -> String {
    s.replace('\'', "''")
}

/// Renders a single-quoted, escaped string literal.
pub(crate) fn quoted_literal(s: &str) -> String {
    format!("'{}'", escape_string_literal(s))
}

/// How a dialect spells boolean literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoolStyle {
    /// `TRUE` / `FALSE` (PostgreSQL).
    Keyword,
    /// `1` / `0` (MySQL, SQLite).
    Numeric,
}

/// Renders a lexical default placeholder as a dialect literal.
///
/// Numeric types pass through unquoted; booleans follow the dialect's
/// spelling; everything else is single-quoted with escaping. Unrecognised
/// boolean placeholders pass through untouched -- the placeholder is the
/// caller's lexical responsibility.
pub(crate) fn default_literal(raw: &str, ty: ColumnType, bools: BoolStyle) -> String {
    match ty {
        ColumnType::Boolean => match (raw.trim().to_ascii_lowercase().as_str(), bools) {
            ("true" | "t" | "1", BoolStyle::Keyword) => "TRUE".to_string(),
            ("false" | "f" | "0", BoolStyle::Keyword) => "FALSE".to_string(),
            ("true" | "t" | "1", BoolStyle::Numeric) => "1".to_string(),
            ("false" | "f" | "0", BoolStyle::Numeric) => "0".to_string(),
            _ => raw.to_string(),
        },
        _ if ty.is_numeric() => raw.to_string(),
        _ => quoted_literal(raw),
    }
}

/// Best-effort literal rendering when the column type is unknown
/// (`change_default` without the current table definition).
pub(crate) fn infer_literal(raw: &str, bools: BoolStyle) -> String {
    let trimmed = raw.trim();
    if trimmed.parse::<f64>().is_ok() {
        return trimmed.to_string();
    }
    match (trimmed.to_ascii_lowercase().as_str(), bools) {
        ("true", BoolStyle::Keyword) => "TRUE".to_string(),
        ("false", BoolStyle::Keyword) => "FALSE".to_string(),
        ("true", BoolStyle::Numeric) => "1".to_string(),
        ("false", BoolStyle::Numeric) => "0".to_string(),
        _ => quoted_literal(raw),
    }
}

/// The flag-derived single-column index for an added column, if any.
pub(crate) fn column_flag_index(
    table: &str,
    column: &portsql_core::column::ColumnDef,
) -> Option<IndexDef> {
    if column.unique {
        Some(IndexDef::derived(table, &[&column.name], true))
    } else if column.indexed {
        Some(IndexDef::derived(table, &[&column.name], false))
    } else {
        None
    }
}

/// Renders a `CREATE [UNIQUE] INDEX` statement (no trailing semicolon).
///
/// Index column order is preserved; indexes are always separate statements,
/// never inline in the table definition.
pub(crate) fn create_index_sql(
    table: &str,
    index: &IndexDef,
    quote: fn(&str) -> String,
) -> String {
    let unique = if index.unique { "UNIQUE " } else { "" };
    let columns = index
        .columns
        .iter()
        .map(|c| quote(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE {unique}INDEX {} ON {} ({columns})",
        quote(&index.name),
        quote(table)
    )
}

/// Joins statements with `;\n` and terminates the last one.
pub(crate) fn finish_statements(statements: Vec<String>) -> String {
    let mut out = statements.join(";\n");
    if !out.is_empty() && !out.ends_with(';') {
        out.push(';');
    }
    out
}
