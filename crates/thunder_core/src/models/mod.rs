//! Data models for Thunder.
//!
//! This module contains all core data structures:
//! - `connection` - ConnectionConfig, SslMode, session summaries, saved profiles
//! - `table` - TableLocator and paged table data
//! - `schema` - Column, index and catalog descriptors
//! - `value` - Tagged cell values and row-maps
//! - `response` - The envelope returned to the front end

pub mod connection;
pub mod response;
pub mod schema;
pub mod table;
pub mod value;

pub use connection::{
    ConnectRequest, ConnectResponse, ConnectionConfig, ConnectionOptions, SavedConnection,
    SessionSummary, SslMode,
};
pub use response::{ErrorResponse, Response};
pub use schema::{ColumnDefinition, DataType, DatabaseInfo, Index, Structure};
pub use table::{TableData, TableLocator, DEFAULT_SCHEMA};
pub use value::{RowData, Value};
