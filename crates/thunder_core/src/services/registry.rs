//! Multi-connection session registry.
//!
//! Tracks every open session, which one is active, and routes operations to
//! the active session's driver. The session map and the active identity sit
//! behind one lock so switching and dispatching can never interleave.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::drivers::{DatabaseDriver, DefaultDriverFactory, DriverFactory};
use crate::error::{Result, ThunderError};
use crate::models::{
    ColumnDefinition, ConnectionConfig, DataType, DatabaseInfo, Index, RowData, SessionSummary,
    Structure, TableData, TableLocator, Value,
};

/// One open connection.
struct Session {
    id: String,
    /// Registry's own copy; never changes after connect.
    config: ConnectionConfig,
    driver: Arc<dyn DatabaseDriver>,
    connected_at: DateTime<Utc>,
}

impl Session {
    fn summary(&self, is_active: bool) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            name: self.config.name.clone(),
            database: self.config.database.clone(),
            host: self.config.effective_host().to_string(),
            color: self.config.color.clone(),
            is_active,
        }
    }
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, Session>,
    /// Either `None` or a key of `sessions`.
    active: Option<String>,
}

/// Registry of open sessions.
pub struct ConnectionRegistry {
    factory: Arc<dyn DriverFactory>,
    inner: Mutex<Inner>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    /// Registry using the drivers shipped with this crate.
    pub fn new() -> Self {
        Self::with_factory(Arc::new(DefaultDriverFactory))
    }

    /// Registry using a custom driver factory.
    pub fn with_factory(factory: Arc<dyn DriverFactory>) -> Self {
        Self { factory, inner: Mutex::new(Inner::default()) }
    }

    // ========== Session Lifecycle ==========

    /// Open a session and make it active.
    ///
    /// Nothing is stored unless the driver connects successfully.
    pub async fn connect(&self, kind: &str, config: ConnectionConfig) -> Result<String> {
        let mut driver = self.factory.create(kind, &config)?;
        driver.connect().await?;

        let id = Uuid::new_v4().to_string();
        let session = Session {
            id: id.clone(),
            config,
            driver: Arc::from(driver),
            connected_at: Utc::now(),
        };

        tracing::info!(
            session_id = %id,
            name = %session.config.name,
            database = %session.config.database,
            kind,
            "Session opened"
        );

        let mut inner = self.inner.lock();
        inner.sessions.insert(id.clone(), session);
        inner.active = Some(id.clone());
        Ok(id)
    }

    /// Connect, read server info and close without storing anything.
    pub async fn test_connection(&self, kind: &str, config: ConnectionConfig) -> Result<DatabaseInfo> {
        let mut driver = self.factory.create(kind, &config)?;
        driver.connect().await?;
        let info = driver.get_database_info().await;
        if let Err(e) = driver.close() {
            tracing::warn!(error = %e, "Failed to close test connection");
        }
        info
    }

    /// Route unaddressed operations to `id`.
    pub fn switch_active(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.sessions.contains_key(id) {
            return Err(ThunderError::not_found(format!("connection {id}")));
        }
        inner.active = Some(id.to_string());
        tracing::debug!(session_id = %id, "Active session switched");
        Ok(())
    }

    /// Close and remove a session.
    ///
    /// If it was active, some remaining session becomes active, or none if it
    /// was the last one.
    pub fn disconnect(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let session =
            inner.sessions.get(id).ok_or_else(|| ThunderError::not_found(format!("connection {id}")))?;

        // Pool close is synchronous, so it is done before the entry goes away
        if let Err(e) = session.driver.close() {
            tracing::warn!(session_id = %id, error = %e, "Driver close reported an error");
        }
        inner.sessions.remove(id);

        if inner.active.as_deref() == Some(id) {
            inner.active = inner.sessions.keys().next().cloned();
        }

        tracing::info!(
            session_id = %id,
            active = inner.active.as_deref().unwrap_or("none"),
            "Session closed"
        );
        Ok(())
    }

    /// Close every session.
    pub fn disconnect_all(&self) {
        let mut inner = self.inner.lock();
        for (id, session) in inner.sessions.drain() {
            if let Err(e) = session.driver.close() {
                tracing::warn!(session_id = %id, error = %e, "Driver close reported an error");
            }
        }
        inner.active = None;
    }

    /// Sanitized view of every session, oldest first.
    pub fn list_active(&self) -> Vec<SessionSummary> {
        let inner = self.inner.lock();
        let mut sessions: Vec<&Session> = inner.sessions.values().collect();
        sessions.sort_by_key(|s| s.connected_at);
        sessions
            .into_iter()
            .map(|s| s.summary(inner.active.as_deref() == Some(s.id.as_str())))
            .collect()
    }

    /// Identity of the active session.
    pub fn active_id(&self) -> Option<String> {
        self.inner.lock().active.clone()
    }

    /// Number of open sessions.
    pub fn session_count(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    /// Whether the active driver can list schemas.
    pub fn supports_schema_listing(&self) -> Result<bool> {
        Ok(self.active_driver()?.capabilities().schema_listing)
    }

    /// The active driver, cloned out so the lock is released before any I/O.
    fn active_driver(&self) -> Result<Arc<dyn DatabaseDriver>> {
        let inner = self.inner.lock();
        let id = inner.active.as_deref().ok_or(ThunderError::NoActiveConnection)?;
        match inner.sessions.get(id) {
            Some(session) => Ok(Arc::clone(&session.driver)),
            None => {
                tracing::error!(session_id = %id, "Active session is missing from the registry");
                debug_assert!(false, "active session {id} is missing from the registry");
                Err(ThunderError::internal(format!("active session {id} is missing from the registry")))
            }
        }
    }

    // ========== Dispatch ==========

    pub async fn list_collections(&self, schema: Option<&str>) -> Result<Vec<String>> {
        self.active_driver()?.list_collections(schema).await
    }

    /// Schema names, or an empty list when the active driver cannot list them.
    pub async fn list_schemas(&self) -> Result<Vec<String>> {
        let driver = self.active_driver()?;
        if !driver.capabilities().schema_listing {
            return Ok(Vec::new());
        }
        driver.list_schemas().await
    }

    pub async fn get_structures(&self, table: &TableLocator) -> Result<Vec<Structure>> {
        self.active_driver()?.get_structures(table).await
    }

    pub async fn get_indices(&self, table: &TableLocator) -> Result<Vec<Index>> {
        self.active_driver()?.get_indices(table).await
    }

    pub async fn get_database_info(&self) -> Result<DatabaseInfo> {
        self.active_driver()?.get_database_info().await
    }

    pub async fn count_rows(&self, table: &TableLocator) -> Result<i64> {
        self.active_driver()?.count_rows(table).await
    }

    pub async fn get_rows(&self, table: &TableLocator) -> Result<TableData> {
        self.active_driver()?.get_rows(table).await
    }

    pub async fn insert_row(&self, table: &TableLocator, row: &RowData) -> Result<u64> {
        self.active_driver()?.insert_row(table, row).await
    }

    pub async fn update_row(&self, table: &TableLocator, row: &RowData, primary_key: &str) -> Result<u64> {
        self.active_driver()?.update_row(table, row, primary_key).await
    }

    pub async fn delete_row(&self, table: &TableLocator, primary_key: &str, value: &Value) -> Result<u64> {
        self.active_driver()?.delete_row(table, primary_key, value).await
    }

    pub async fn execute_raw_query(&self, query: &str) -> Result<Vec<RowData>> {
        self.active_driver()?.execute_raw_query(query).await
    }

    pub async fn create_table(&self, table: &TableLocator, columns: &[ColumnDefinition]) -> Result<()> {
        self.active_driver()?.create_table(table, columns).await
    }

    pub async fn drop_table(&self, table: &TableLocator) -> Result<()> {
        self.active_driver()?.drop_table(table).await
    }

    pub async fn truncate_table(&self, table: &TableLocator) -> Result<()> {
        self.active_driver()?.truncate_table(table).await
    }

    pub async fn get_table_ddl(&self, table: &TableLocator) -> Result<String> {
        self.active_driver()?.get_table_ddl(table).await
    }

    pub fn list_supported_data_types(&self) -> Result<&'static [DataType]> {
        Ok(self.active_driver()?.list_supported_data_types())
    }
}
