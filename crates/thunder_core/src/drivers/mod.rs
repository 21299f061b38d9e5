//! Database drivers.
//!
//! A driver presents one uniform operation set over a backend dialect. The
//! registry only ever talks to [`DatabaseDriver`], so a new backend plugs in
//! by implementing the trait and teaching [`DefaultDriverFactory`] its tag.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::{Result, ThunderError};
use crate::models::{
    ColumnDefinition, ConnectionConfig, DataType, DatabaseInfo, Index, RowData, Structure,
    TableData, TableLocator, Value,
};

#[cfg(test)]
pub(crate) mod mock;
pub mod postgres;
pub mod types;

pub use postgres::PostgresDriver;

/// Backend kinds with a driver implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    Postgres,
}

impl DriverKind {
    /// Canonical tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverKind {
    type Err = ThunderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(ThunderError::unsupported_backend(s)),
        }
    }
}

/// Optional operations a driver supports, queryable without calling them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverCapabilities {
    /// `list_schemas` is implemented.
    pub schema_listing: bool,
}

/// The operation set every backend provides.
///
/// `connect` is called once before the driver is shared; everything else
/// takes `&self` so a connected driver can sit behind an `Arc`.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Optional operations this driver supports.
    fn capabilities(&self) -> DriverCapabilities;

    /// Open the pool and verify liveness with a round trip.
    async fn connect(&mut self) -> Result<()>;

    /// Release the pool. Safe to call once after a successful connect.
    fn close(&self) -> Result<()>;

    /// Table names in `schema`. Without a schema the result is backend-defined.
    async fn list_collections(&self, schema: Option<&str>) -> Result<Vec<String>>;

    /// Schema names. Only called when `capabilities().schema_listing` is set.
    async fn list_schemas(&self) -> Result<Vec<String>> {
        Err(ThunderError::validation("this driver cannot list schemas"))
    }

    /// Columns of a table with constraint data merged in.
    async fn get_structures(&self, table: &TableLocator) -> Result<Vec<Structure>>;

    /// Indexes of a table, one entry per index.
    async fn get_indices(&self, table: &TableLocator) -> Result<Vec<Index>>;

    async fn get_database_info(&self) -> Result<DatabaseInfo>;

    /// Row count honoring the locator's filter.
    async fn count_rows(&self, table: &TableLocator) -> Result<i64>;

    /// One page of rows with the table's column descriptors.
    async fn get_rows(&self, table: &TableLocator) -> Result<TableData>;

    async fn insert_row(&self, table: &TableLocator, row: &RowData) -> Result<u64>;

    async fn update_row(&self, table: &TableLocator, row: &RowData, primary_key: &str) -> Result<u64>;

    async fn delete_row(&self, table: &TableLocator, primary_key: &str, value: &Value) -> Result<u64>;

    /// Run caller-supplied SQL verbatim.
    async fn execute_raw_query(&self, sql: &str) -> Result<Vec<RowData>>;

    async fn create_table(&self, table: &TableLocator, columns: &[ColumnDefinition]) -> Result<()>;

    async fn drop_table(&self, table: &TableLocator) -> Result<()>;

    async fn truncate_table(&self, table: &TableLocator) -> Result<()>;

    /// CREATE TABLE statement reconstructed from the live catalog.
    async fn get_table_ddl(&self, table: &TableLocator) -> Result<String>;

    /// Static catalog of column types for the table designer.
    fn list_supported_data_types(&self) -> &'static [DataType];
}

/// Builds unconnected drivers from a kind tag.
pub trait DriverFactory: Send + Sync {
    /// Build a driver for `kind`. Performs no I/O.
    fn create(&self, kind: &str, config: &ConnectionConfig) -> Result<Box<dyn DatabaseDriver>>;
}

/// Factory for the drivers shipped with this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDriverFactory;

impl DriverFactory for DefaultDriverFactory {
    fn create(&self, kind: &str, config: &ConnectionConfig) -> Result<Box<dyn DatabaseDriver>> {
        match kind.parse::<DriverKind>()? {
            DriverKind::Postgres => Ok(Box::new(PostgresDriver::new(config.clone()))),
        }
    }
}
