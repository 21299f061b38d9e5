//! Schema introspection models.
//!
//! Column, index and catalog descriptors returned by drivers for the schema browser.

use serde::{Deserialize, Serialize};

/// A column descriptor with constraint data merged in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Column name.
    pub name: String,
    /// Canonical data type (e.g., "varchar", "int4").
    pub data_type: String,
    /// Maximum character length, if declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<i32>,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Default value expression, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Whether this column is part of the primary key.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_primary: bool,
    /// Short label shown in the primary key column of the grid ("PRI").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary_label: Option<String>,
    /// Whether the column carries a unique constraint.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_unique: bool,
    /// Whether values come from a sequence.
    #[serde(rename = "is_autoinc", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_auto_increment: bool,
    /// Referenced column in `table(column)` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    /// Column comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// An index with its participating columns in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Column names in index key order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub is_unique: bool,
    /// Access method (e.g., "btree", "gin").
    pub algorithm: String,
}

/// A column type offered when designing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataType {
    /// Type name as written in DDL.
    pub name: &'static str,
    /// Grouping for the type picker.
    pub category: &'static str,
    /// Short description.
    pub description: &'static str,
}

/// Server identity for an open session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Engine name (e.g., "PostgreSQL").
    pub engine: String,
    /// Server version string.
    pub version: String,
    /// Current database name.
    pub database: String,
}

/// A column requested in CREATE TABLE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnDefinition {
    /// Column name (blank entries are skipped).
    pub name: String,
    /// Type as written in DDL.
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Raw default expression.
    pub default: String,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
    /// Whether a UNIQUE constraint is added.
    pub unique: bool,
}

impl ColumnDefinition {
    /// Create a nullable column definition.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self { name: name.into(), data_type: data_type.into(), nullable: true, ..Default::default() }
    }

    /// Mark as NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark as part of the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Add a UNIQUE constraint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set the default expression.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }
}
