//! Front-end facade.
//!
//! Wraps every registry and profile operation in a [`Response`] envelope.
//! Nothing here returns `Err`: failures become entries in `errors`.

use crate::error::{Result, ThunderError};
use crate::models::{
    ColumnDefinition, ConnectRequest, ConnectResponse, ConnectionConfig, DataType, DatabaseInfo,
    Index, Response, RowData, SavedConnection, SessionSummary, Structure, TableData, TableLocator,
    Value,
};
use crate::services::{ConnectionRegistry, ProfileStore};

/// Entry point for the front end.
pub struct DatabaseService {
    registry: ConnectionRegistry,
    profiles: ProfileStore,
}

impl Default for DatabaseService {
    fn default() -> Self {
        Self::new(ConnectionRegistry::new(), ProfileStore::default())
    }
}

fn respond<T>(operation: &str, result: Result<T>) -> Response<T> {
    if let Err(e) = &result {
        log_failure(operation, e);
    }
    Response::from_result(result)
}

/// Mutations report `data: false` alongside the error.
fn respond_done<T>(operation: &str, result: Result<T>) -> Response<bool> {
    match result {
        Ok(_) => Response::ok(true),
        Err(e) => {
            log_failure(operation, &e);
            Response::error_with_data(&e, false)
        }
    }
}

fn log_failure(operation: &str, err: &ThunderError) {
    match err {
        ThunderError::Internal { .. } => tracing::error!(operation, error = %err, "Operation failed"),
        _ => tracing::warn!(operation, category = err.category(), error = %err, "Operation failed"),
    }
}

impl DatabaseService {
    pub fn new(registry: ConnectionRegistry, profiles: ProfileStore) -> Self {
        Self { registry, profiles }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    // ========== Sessions ==========

    pub async fn connect(&self, request: ConnectRequest) -> Response<ConnectResponse> {
        match self.registry.connect(&request.driver, request.config).await {
            Ok(id) => Response::ok(ConnectResponse { connected: true, connection_id: Some(id) }),
            Err(e) => {
                log_failure("connect", &e);
                Response::error_with_data(&e, ConnectResponse { connected: false, connection_id: None })
            }
        }
    }

    pub async fn test_connection(&self, request: ConnectRequest) -> Response<DatabaseInfo> {
        respond("test_connection", self.registry.test_connection(&request.driver, request.config).await)
    }

    pub fn switch_connection(&self, id: &str) -> Response<bool> {
        respond_done("switch_connection", self.registry.switch_active(id))
    }

    pub fn disconnect(&self, id: &str) -> Response<bool> {
        respond_done("disconnect", self.registry.disconnect(id))
    }

    pub fn list_connections(&self) -> Response<Vec<SessionSummary>> {
        Response::ok(self.registry.list_active())
    }

    // ========== Schema ==========

    pub async fn get_collections(&self, schema: Option<&str>) -> Response<Vec<String>> {
        respond("get_collections", self.registry.list_collections(schema).await)
    }

    pub async fn get_schemas(&self) -> Response<Vec<String>> {
        respond("get_schemas", self.registry.list_schemas().await)
    }

    pub async fn get_structures(&self, table: &TableLocator) -> Response<Vec<Structure>> {
        respond("get_structures", self.registry.get_structures(table).await)
    }

    pub async fn get_indices(&self, table: &TableLocator) -> Response<Vec<Index>> {
        respond("get_indices", self.registry.get_indices(table).await)
    }

    pub async fn get_database_info(&self) -> Response<DatabaseInfo> {
        respond("get_database_info", self.registry.get_database_info().await)
    }

    pub async fn get_table_ddl(&self, table: &TableLocator) -> Response<String> {
        respond("get_table_ddl", self.registry.get_table_ddl(table).await)
    }

    pub fn get_data_types(&self) -> Response<Vec<DataType>> {
        respond("get_data_types", self.registry.list_supported_data_types().map(<[DataType]>::to_vec))
    }

    // ========== Data ==========

    pub async fn count_rows(&self, table: &TableLocator) -> Response<i64> {
        respond("count_rows", self.registry.count_rows(table).await)
    }

    pub async fn get_rows(&self, table: &TableLocator) -> Response<TableData> {
        respond("get_rows", self.registry.get_rows(table).await)
    }

    pub async fn insert_row(&self, table: &TableLocator, row: &RowData) -> Response<bool> {
        respond_done("insert_row", self.registry.insert_row(table, row).await)
    }

    pub async fn update_row(&self, table: &TableLocator, row: &RowData, primary_key: &str) -> Response<bool> {
        respond_done("update_row", self.registry.update_row(table, row, primary_key).await)
    }

    pub async fn delete_row(&self, table: &TableLocator, primary_key: &str, value: &Value) -> Response<bool> {
        respond_done("delete_row", self.registry.delete_row(table, primary_key, value).await)
    }

    pub async fn execute_query(&self, query: &str) -> Response<Vec<RowData>> {
        respond("execute_query", self.registry.execute_raw_query(query).await)
    }

    // ========== DDL ==========

    pub async fn create_table(&self, table: &TableLocator, columns: &[ColumnDefinition]) -> Response<bool> {
        respond_done("create_table", self.registry.create_table(table, columns).await)
    }

    pub async fn drop_table(&self, table: &TableLocator) -> Response<bool> {
        respond_done("drop_table", self.registry.drop_table(table).await)
    }

    pub async fn truncate_table(&self, table: &TableLocator) -> Response<bool> {
        respond_done("truncate_table", self.registry.truncate_table(table).await)
    }

    // ========== Saved Profiles ==========

    pub fn get_saved_connections(&self) -> Response<Vec<SavedConnection>> {
        respond("get_saved_connections", self.profiles.list())
    }

    pub fn save_connection(&self, config: ConnectionConfig) -> Response<SavedConnection> {
        respond("save_connection", self.profiles.save(config))
    }

    pub fn update_connection(&self, id: &str, config: ConnectionConfig) -> Response<SavedConnection> {
        respond("update_connection", self.profiles.update(id, config))
    }

    pub fn delete_connection(&self, id: &str) -> Response<bool> {
        respond_done("delete_connection", self.profiles.delete(id))
    }
}
