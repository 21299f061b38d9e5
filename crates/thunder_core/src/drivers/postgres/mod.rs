//! PostgreSQL driver built on deadpool-postgres.
//!
//! Each driver owns one pool. Pools are never shared between sessions.

mod convert;
mod introspect;
pub mod sql;

use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use native_tls::{Certificate, Identity, TlsConnector};
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;

use crate::drivers::types::POSTGRES_DATA_TYPES;
use crate::drivers::{DatabaseDriver, DriverCapabilities};
use crate::error::{Result, ThunderError};
use crate::models::{
    ColumnDefinition, ConnectionConfig, DataType, DatabaseInfo, Index, RowData, SslMode, Structure,
    TableData, TableLocator, Value,
};

use self::convert::row_to_map;
use self::sql::{is_excluded_field, Statement};

/// Login role used when the configuration leaves the user blank.
const DEFAULT_USER: &str = "postgres";

/// Driver for PostgreSQL servers.
pub struct PostgresDriver {
    config: ConnectionConfig,
    pool: Option<Pool>,
}

impl PostgresDriver {
    /// Create an unconnected driver.
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config, pool: None }
    }

    /// libpq keyword/value connection string with the password masked.
    ///
    /// Blank TLS fields are left out.
    pub fn redacted_dsn(&self) -> String {
        let c = &self.config;
        let mut parts = vec![
            format!("dbname={}", dsn_value(c.database.trim())),
            format!("sslmode={}", c.ssl_mode.as_str()),
        ];
        for (key, value) in [("sslrootcert", &c.ssl_root_cert), ("sslcert", &c.ssl_cert), ("sslkey", &c.ssl_key)] {
            if !value.trim().is_empty() {
                parts.push(format!("{key}={}", dsn_value(value.trim())));
            }
        }
        if !c.user.is_empty() {
            parts.push(format!("user={}", dsn_value(&c.user)));
        }
        if !c.password.is_empty() {
            parts.push("password=********".to_string());
        }
        parts.push(format!("host={}", dsn_value(c.effective_host())));
        parts.push(format!("port={}", c.effective_port()));
        parts.join(" ")
    }

    fn pg_config(&self) -> tokio_postgres::Config {
        let c = &self.config;
        let connect_timeout = Duration::from_secs(u64::from(c.options.connect_timeout_secs));

        let mut pg_config = tokio_postgres::Config::new();
        pg_config.host(c.effective_host());
        pg_config.port(c.effective_port());
        pg_config.dbname(c.database.trim());
        pg_config.user(if c.user.is_empty() { DEFAULT_USER } else { c.user.as_str() });
        if !c.password.is_empty() {
            pg_config.password(&c.password);
        }
        pg_config.application_name(&c.options.application_name);
        pg_config.connect_timeout(connect_timeout);
        pg_config.keepalives(true);
        pg_config.keepalives_idle(Duration::from_secs(60));
        pg_config.ssl_mode(match c.ssl_mode {
            SslMode::Disable => tokio_postgres::config::SslMode::Disable,
            _ => tokio_postgres::config::SslMode::Require,
        });
        pg_config
    }

    fn build_pool(&self) -> Result<Pool> {
        let options = &self.config.options;
        let connect_timeout = Duration::from_secs(u64::from(options.connect_timeout_secs));
        let manager_config = ManagerConfig { recycling_method: RecyclingMethod::Fast };

        let manager = match tls_connector(&self.config)? {
            Some(tls) => Manager::from_config(self.pg_config(), tls, manager_config),
            None => Manager::from_config(self.pg_config(), NoTls, manager_config),
        };

        Pool::builder(manager)
            .max_size(options.pool_max_size.max(1))
            .wait_timeout(Some(connect_timeout))
            .create_timeout(Some(connect_timeout))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| {
                ThunderError::connection_with_hint(
                    format!("Failed to create connection pool: {e}"),
                    "Check connection settings and try again",
                )
            })
    }

    fn pool(&self) -> Result<&Pool> {
        self.pool
            .as_ref()
            .filter(|pool| !pool.is_closed())
            .ok_or_else(|| ThunderError::connection("Not connected"))
    }

    async fn client(&self) -> Result<deadpool_postgres::Client> {
        Ok(self.pool()?.get().await?)
    }

    async fn execute(&self, statement: &Statement) -> Result<u64> {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "Executing statement");
        let client = self.client().await?;
        Ok(client.execute(statement.sql.as_str(), &bind_params(&statement.params)).await?)
    }

    async fn execute_ddl(&self, ddl: &str) -> Result<()> {
        tracing::debug!(sql = %ddl, "Executing DDL");
        let client = self.client().await?;
        client.batch_execute(ddl).await?;
        Ok(())
    }
}

/// Quote a libpq connection-string value when it needs it.
fn dsn_value(value: &str) -> String {
    if !value.is_empty() && !value.chars().any(|c| c.is_whitespace() || c == '\'' || c == '\\') {
        return value.to_string();
    }
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn bind_params(values: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

fn read_pem(path: &str, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        ThunderError::connection_with_hint(
            format!("Failed to read {what} '{path}': {e}"),
            "Check that the certificate file exists and is readable",
        )
    })
}

/// TLS connector for the configured ssl mode, or `None` when TLS is off.
///
/// `require` encrypts without checking the server certificate unless a root
/// certificate is given, in which case it behaves like `verify-ca`.
fn tls_connector(config: &ConnectionConfig) -> Result<Option<MakeTlsConnector>> {
    let root_cert = config.ssl_root_cert.trim();
    let mut builder = TlsConnector::builder();

    match config.ssl_mode {
        SslMode::Disable => return Ok(None),
        SslMode::Require if root_cert.is_empty() => {
            builder.danger_accept_invalid_certs(true);
        }
        SslMode::Require | SslMode::VerifyCa => {
            builder.danger_accept_invalid_hostnames(true);
        }
        SslMode::VerifyFull => {}
    }

    if !root_cert.is_empty() {
        let cert = Certificate::from_pem(&read_pem(root_cert, "CA certificate")?).map_err(|e| {
            ThunderError::connection_with_hint(
                format!("Failed to parse CA certificate: {e}"),
                "Ensure the certificate is in PEM format",
            )
        })?;
        builder.add_root_certificate(cert);
    }

    let (cert_path, key_path) = (config.ssl_cert.trim(), config.ssl_key.trim());
    if !cert_path.is_empty() && !key_path.is_empty() {
        let cert = read_pem(cert_path, "client certificate")?;
        let key = read_pem(key_path, "client key")?;
        let identity = Identity::from_pkcs8(&cert, &key).map_err(|e| {
            ThunderError::connection_with_hint(
                format!("Failed to load client certificate: {e}"),
                "The key must be an unencrypted PKCS#8 PEM file",
            )
        })?;
        builder.identity(identity);
    }

    let connector = builder.build().map_err(|e| {
        ThunderError::connection_with_hint(
            format!("Failed to create TLS connector: {e}"),
            "Check your SSL configuration",
        )
    })?;
    Ok(Some(MakeTlsConnector::new(connector)))
}

/// Failures while opening a session are all reported as connection errors.
fn as_connection_error(err: ThunderError) -> ThunderError {
    match err {
        err @ ThunderError::Connection { .. } => err,
        other => ThunderError::connection_with_source(other.to_string(), other),
    }
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    fn capabilities(&self) -> DriverCapabilities {
        DriverCapabilities { schema_listing: true }
    }

    async fn connect(&mut self) -> Result<()> {
        self.config.validate()?;
        tracing::debug!(dsn = %self.redacted_dsn(), "Connecting");

        let pool = self.build_pool()?;
        let client = pool.get().await.map_err(|e| as_connection_error(e.into()))?;
        client
            .execute("SELECT 1", &[])
            .await
            .map_err(|e| as_connection_error(e.into()))?;
        drop(client);

        tracing::info!(
            host = %self.config.effective_host(),
            database = %self.config.database,
            ssl_mode = self.config.ssl_mode.as_str(),
            "Connection pool created successfully"
        );
        self.pool = Some(pool);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if let Some(pool) = &self.pool {
            pool.close();
            tracing::info!(database = %self.config.database, "Connection pool closed");
        }
        Ok(())
    }

    async fn list_collections(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let client = self.client().await?;
        introspect::list_tables(&client, schema.unwrap_or_default()).await
    }

    async fn list_schemas(&self) -> Result<Vec<String>> {
        let client = self.client().await?;
        introspect::list_schemas(&client).await
    }

    async fn get_structures(&self, table: &TableLocator) -> Result<Vec<Structure>> {
        table.validate()?;
        let client = self.client().await?;
        introspect::structures(&client, table).await
    }

    async fn get_indices(&self, table: &TableLocator) -> Result<Vec<Index>> {
        table.validate()?;
        let client = self.client().await?;
        introspect::indices(&client, table).await
    }

    async fn get_database_info(&self) -> Result<DatabaseInfo> {
        let client = self.client().await?;
        introspect::database_info(&client).await
    }

    async fn count_rows(&self, table: &TableLocator) -> Result<i64> {
        let statement = sql::count_rows(table)?;
        let client = self.client().await?;
        let row = client.query_one(statement.sql.as_str(), &bind_params(&statement.params)).await?;
        Ok(row.get(0))
    }

    async fn get_rows(&self, table: &TableLocator) -> Result<TableData> {
        let statement = sql::select_page(table)?;
        let client = self.client().await?;

        let structures = introspect::structures(&client, table).await?;
        tracing::debug!(sql = %statement.sql, "Reading rows");
        let rows = client.query(statement.sql.as_str(), &bind_params(&statement.params)).await?;
        let data = rows.iter().map(row_to_map).collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(TableData { structures, data })
    }

    async fn insert_row(&self, table: &TableLocator, row: &RowData) -> Result<u64> {
        table.validate()?;
        if row.is_empty() {
            return Err(ThunderError::validation("no data to insert"));
        }

        // Only nulls can be dropped for key columns, so skip the lookup otherwise
        let needs_keys = row.iter().any(|(column, value)| value.is_null() && !is_excluded_field(column));
        let primary_keys = if needs_keys {
            let client = self.client().await?;
            introspect::primary_key_columns(&client, table).await?
        } else {
            Vec::new()
        };

        let statement = sql::insert_row(table, row, &primary_keys)?;
        self.execute(&statement).await
    }

    async fn update_row(&self, table: &TableLocator, row: &RowData, primary_key: &str) -> Result<u64> {
        let statement = sql::update_row(table, row, primary_key)?;
        self.execute(&statement).await
    }

    async fn delete_row(&self, table: &TableLocator, primary_key: &str, value: &Value) -> Result<u64> {
        let statement = sql::delete_row(table, primary_key, value)?;
        self.execute(&statement).await
    }

    async fn execute_raw_query(&self, query: &str) -> Result<Vec<RowData>> {
        if query.trim().is_empty() {
            return Err(ThunderError::validation("query is empty"));
        }
        let client = self.client().await?;
        let rows = client.query(query, &[]).await?;
        Ok(rows.iter().map(row_to_map).collect::<std::result::Result<Vec<_>, _>>()?)
    }

    async fn create_table(&self, table: &TableLocator, columns: &[ColumnDefinition]) -> Result<()> {
        let ddl = sql::create_table(table, columns)?;
        self.execute_ddl(&ddl).await
    }

    async fn drop_table(&self, table: &TableLocator) -> Result<()> {
        let ddl = sql::drop_table(table)?;
        self.execute_ddl(&ddl).await
    }

    async fn truncate_table(&self, table: &TableLocator) -> Result<()> {
        let ddl = sql::truncate_table(table)?;
        self.execute_ddl(&ddl).await
    }

    async fn get_table_ddl(&self, table: &TableLocator) -> Result<String> {
        let structures = self.get_structures(table).await?;
        if structures.is_empty() {
            return Err(ThunderError::not_found(format!(
                "table {} has no columns or does not exist",
                sql::qualified_name(table)
            )));
        }
        Ok(sql::render_table_ddl(table, &structures))
    }

    fn list_supported_data_types(&self) -> &'static [DataType] {
        POSTGRES_DATA_TYPES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl PostgresDriver {
        fn is_connected(&self) -> bool {
            self.pool.is_some()
        }
    }

    fn config() -> ConnectionConfig {
        ConnectionConfig::new("Local", "", "shop", "admin").with_password("s3cret")
    }

    #[test]
    fn test_dsn_defaults_and_redaction() {
        let driver = PostgresDriver::new(config());
        let dsn = driver.redacted_dsn();

        assert_eq!(dsn, "dbname=shop sslmode=disable user=admin password=******** host=localhost port=5432");
        assert!(!dsn.contains("s3cret"));
    }

    #[test]
    fn test_dsn_includes_only_set_tls_fields() {
        let mut config = config().with_ssl_mode(SslMode::VerifyCa);
        config.ssl_root_cert = "/etc/ssl/ca.pem".to_string();
        let dsn = PostgresDriver::new(config).redacted_dsn();

        assert!(dsn.contains("sslmode=verify-ca"));
        assert!(dsn.contains("sslrootcert=/etc/ssl/ca.pem"));
        assert!(!dsn.contains("sslcert="));
        assert!(!dsn.contains("sslkey="));
    }

    #[test]
    fn test_dsn_quotes_values() {
        assert_eq!(dsn_value("plain"), "plain");
        assert_eq!(dsn_value("my db"), "'my db'");
        assert_eq!(dsn_value("it's"), "'it\\'s'");
        assert_eq!(dsn_value(""), "''");
    }

    #[test]
    fn test_disabled_tls_has_no_connector() {
        assert!(tls_connector(&config()).unwrap().is_none());
    }

    #[test]
    fn test_missing_root_cert_is_connection_error() {
        let mut config = config().with_ssl_mode(SslMode::VerifyFull);
        config.ssl_root_cert = "/nonexistent/ca.pem".to_string();
        let err = tls_connector(&config).err().unwrap();
        assert_eq!(err.category(), "Connection");
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_database() {
        let mut driver = PostgresDriver::new(ConnectionConfig::new("Local", "localhost", "", "admin"));
        let err = driver.connect().await.unwrap_err();
        assert_eq!(err.category(), "Connection");
        assert!(!driver.is_connected());
    }

    #[tokio::test]
    async fn test_operations_require_connection() {
        let driver = PostgresDriver::new(config());
        let err = driver.list_collections(Some("public")).await.unwrap_err();
        assert_eq!(err.category(), "Connection");
    }

    #[tokio::test]
    async fn test_validation_precedes_connection_check() {
        let driver = PostgresDriver::new(config());
        let err = driver.create_table(&TableLocator::new("public", "t"), &[]).await.unwrap_err();
        assert!(err.is_validation());

        let err = driver.insert_row(&TableLocator::new("public", "t"), &RowData::new()).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_close_before_connect_is_noop() {
        assert!(PostgresDriver::new(config()).close().is_ok());
    }
}
