//! Table locators and paged table data.

use serde::{Deserialize, Serialize};

use crate::error::ThunderError;
use crate::models::schema::Structure;
use crate::models::value::RowData;

/// Schema used when a locator leaves it blank.
pub const DEFAULT_SCHEMA: &str = "public";

/// Identifies a unit of paged data access: schema, table, window and filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableLocator {
    /// Schema name (blank means `public`)
    pub schema: String,
    /// Table name
    pub name: String,
    /// Rows to skip
    pub offset: i64,
    /// Rows to return. Always sent as LIMIT, so zero reads nothing.
    pub limit: i64,
    /// Raw WHERE fragment supplied by the caller. Never parameterized.
    pub filter: Option<String>,
}

impl TableLocator {
    /// Locate a table without paging.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self { schema: schema.into(), name: name.into(), ..Default::default() }
    }

    /// Set the page window.
    pub fn with_page(mut self, offset: i64, limit: i64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Set the raw filter fragment.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Schema name, falling back to the default schema when blank.
    pub fn schema_or_default(&self) -> &str {
        match self.schema.trim() {
            "" => DEFAULT_SCHEMA,
            schema => schema,
        }
    }

    /// Trimmed table name.
    pub fn table_name(&self) -> &str {
        self.name.trim()
    }

    /// Non-blank filter fragment, if any.
    pub fn filter_clause(&self) -> Option<&str> {
        self.filter.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }

    /// Reject locators that cannot name a table.
    pub fn validate(&self) -> Result<(), ThunderError> {
        if self.table_name().is_empty() {
            return Err(ThunderError::validation("table name is required"));
        }
        if self.offset < 0 {
            return Err(ThunderError::validation("offset must not be negative"));
        }
        if self.limit < 0 {
            return Err(ThunderError::validation("limit must not be negative"));
        }
        Ok(())
    }
}

/// One page of table data together with its column descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// Column descriptors in ordinal order
    pub structures: Vec<Structure>,
    /// Row-maps
    pub data: Vec<RowData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_defaults_when_blank() {
        assert_eq!(TableLocator::new("", "users").schema_or_default(), "public");
        assert_eq!(TableLocator::new("  ", "users").schema_or_default(), "public");
        assert_eq!(TableLocator::new("sales", "orders").schema_or_default(), "sales");
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert!(TableLocator::new("public", "   ").validate().unwrap_err().is_validation());
        assert!(TableLocator::new("public", "users").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_offset() {
        let locator = TableLocator::new("public", "users").with_page(-1, 10);
        assert!(locator.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_limit() {
        let locator = TableLocator::new("public", "users").with_page(0, -5);
        assert!(locator.validate().unwrap_err().is_validation());
        assert!(TableLocator::new("public", "users").with_page(0, 0).validate().is_ok());
    }

    #[test]
    fn test_filter_clause_ignores_blank() {
        assert_eq!(TableLocator::new("public", "t").with_filter("  ").filter_clause(), None);
        assert_eq!(
            TableLocator::new("public", "t").with_filter(" age > 3 ").filter_clause(),
            Some("age > 3")
        );
    }

    #[test]
    fn test_deserialize_partial_locator() {
        let locator: TableLocator =
            serde_json::from_str(r#"{"schema":"public","name":"users","limit":50}"#).unwrap();
        assert_eq!(locator.limit, 50);
        assert_eq!(locator.offset, 0);
        assert!(locator.filter.is_none());
    }
}
