//! Core backend for the Thunder database browser.
//!
//! This crate provides the session and driver layer behind the UI:
//!
//! - **error**: Error taxonomy shared by drivers, the registry and the facade
//! - **models**: Connection configuration, table locators, column descriptors, values
//! - **drivers**: The driver contract, the factory and the PostgreSQL driver
//! - **services**: Session registry, saved-profile store and the response facade
//! - **logging**: Structured logging setup

pub mod drivers;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use drivers::{
    DatabaseDriver, DefaultDriverFactory, DriverCapabilities, DriverFactory, DriverKind,
    PostgresDriver,
};
pub use error::{Result, ThunderError};
pub use models::{
    ColumnDefinition, ConnectRequest, ConnectResponse, ConnectionConfig, ConnectionOptions,
    DataType, DatabaseInfo, ErrorResponse, Index, Response, RowData, SavedConnection,
    SessionSummary, SslMode, Structure, TableData, TableLocator, Value,
};
pub use services::{ConnectionRegistry, DatabaseService, ProfileStore};
