//! Column definitions -- the smallest unit of the schema model.
//!
//! A [`ColumnDef`] is dialect-neutral: it records a semantic type plus the
//! modifiers the builders set. Defaults are stored as lexical placeholders
//! ("true", "42", "hello") and only rendered into SQL by the emitters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of semantic column types.
///
/// Each dialect maps these onto its own native types; the mapping lives in
/// the emitter crate, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    BigInt,
    String,
    Text,
    Boolean,
    Float,
    Decimal,
    DateTime,
    Timestamp,
    Binary,
    Json,
}

impl ColumnType {
    /// Returns the canonical lowercase name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::String => "string",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Binary => "binary",
            Self::Json => "json",
        }
    }

    /// Returns `true` for the integer family (`integer`, `bigint`).
    ///
    /// Only these types can back an auto-increment primary key.
    pub fn is_integer_family(&self) -> bool {
        matches!(self, Self::Integer | Self::BigInt)
    }

    /// Returns `true` for types whose defaults render unquoted.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::BigInt | Self::Float | Self::Decimal
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to another table, carried by foreign-reference columns.
///
/// The referenced column defaults to `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableRef {
    /// The referenced table name.
    pub table: String,
    /// The referenced column name.
    #[serde(default = "TableRef::default_column")]
    pub column: String,
}

impl TableRef {
    /// Creates a reference to `<table>.id`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: Self::default_column(),
        }
    }

    /// Creates a reference to an explicit column.
    pub fn with_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    fn default_column() -> String {
        "id".to_string()
    }
}

/// Helper for `skip_serializing_if` on `bool` fields.
fn is_false(b: &bool) -> bool {
    !b
}

/// A single column of a table.
///
/// The value doubles as the fluent column builder: the table builder hands
/// out `&mut ColumnDef` and the modifier methods mutate and return the same
/// handle, so `tb.bigint("id").primary_key()` reads the way it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnDef {
    pub name: String,

    #[serde(rename = "Type")]
    pub ty: ColumnType,

    /// String length; emitters fall back to 255 where the dialect needs one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,

    /// Columns are NOT NULL unless this is set.
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub indexed: bool,

    /// Lexical default placeholder; rendered per dialect at emission time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<TableRef>,
}

impl ColumnDef {
    /// Creates a column with the given name and type, no modifiers set.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            length: None,
            precision: None,
            scale: None,
            nullable: false,
            primary_key: false,
            unique: false,
            indexed: false,
            default: None,
            references: None,
        }
    }

    // -- Fluent modifiers ----------------------------------------------------

    /// Allows NULL values.
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Marks the column as (part of) the primary key.
    pub fn primary_key(&mut self) -> &mut Self {
        self.primary_key = true;
        self
    }

    /// Adds a dedicated unique index at emission time.
    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    /// Adds a dedicated non-unique index at emission time.
    pub fn indexed(&mut self) -> &mut Self {
        self.indexed = true;
        self
    }

    /// Sets the string length (meaningful for `string` columns).
    pub fn length(&mut self, length: u32) -> &mut Self {
        self.length = Some(length);
        self
    }

    /// Sets precision and scale (meaningful for `decimal` columns).
    pub fn precision(&mut self, precision: u32, scale: u32) -> &mut Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Sets the lexical default placeholder.
    ///
    /// Suppressed at emission time when the column turns out to be the
    /// auto-increment primary key.
    pub fn default_value(&mut self, value: impl Into<String>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the column as a foreign reference.
    pub fn references(&mut self, target: TableRef) -> &mut Self {
        self.references = Some(target);
        self
    }
}
