//! In-memory driver for registry and facade tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::drivers::postgres::sql;
use crate::drivers::types::POSTGRES_DATA_TYPES;
use crate::drivers::{DatabaseDriver, DriverCapabilities, DriverFactory};
use crate::error::{Result, ThunderError};
use crate::models::{
    ColumnDefinition, ConnectionConfig, DataType, DatabaseInfo, Index, RowData, Structure,
    TableData, TableLocator, Value,
};

/// Host name that makes `connect` fail.
pub(crate) const UNREACHABLE_HOST: &str = "unreachable";

/// Counters shared by every driver a [`MockFactory`] builds.
#[derive(Debug, Default)]
pub(crate) struct MockStats {
    pub connects: AtomicUsize,
    pub closes: AtomicUsize,
}

impl MockStats {
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockFactory {
    pub stats: Arc<MockStats>,
    pub schema_listing: bool,
}

impl MockFactory {
    pub fn new() -> Self {
        Self { stats: Arc::new(MockStats::default()), schema_listing: true }
    }

    pub fn without_schema_listing() -> Self {
        Self { schema_listing: false, ..Self::new() }
    }
}

impl DriverFactory for MockFactory {
    fn create(&self, kind: &str, config: &ConnectionConfig) -> Result<Box<dyn DatabaseDriver>> {
        match kind {
            "mock" => Ok(Box::new(MockDriver {
                config: config.clone(),
                stats: Arc::clone(&self.stats),
                schema_listing: self.schema_listing,
            })),
            other => Err(ThunderError::unsupported_backend(other)),
        }
    }
}

pub(crate) struct MockDriver {
    config: ConnectionConfig,
    stats: Arc<MockStats>,
    schema_listing: bool,
}

fn sample_structures() -> Vec<Structure> {
    vec![
        Structure {
            name: "id".into(),
            data_type: "int4".into(),
            nullable: false,
            default: Some("nextval('users_id_seq'::regclass)".into()),
            is_primary: true,
            is_primary_label: Some("PRI".into()),
            is_auto_increment: true,
            ..Default::default()
        },
        Structure { name: "name".into(), data_type: "varchar".into(), length: Some(64), ..Default::default() },
    ]
}

fn sample_row(id: i64, name: &str) -> RowData {
    RowData::from([("id".to_string(), Value::Int(id)), ("name".to_string(), Value::from(name))])
}

#[async_trait]
impl DatabaseDriver for MockDriver {
    fn capabilities(&self) -> DriverCapabilities {
        DriverCapabilities { schema_listing: self.schema_listing }
    }

    async fn connect(&mut self) -> Result<()> {
        self.config.validate()?;
        if self.config.host == UNREACHABLE_HOST {
            return Err(ThunderError::connection("connection refused"));
        }
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_collections(&self, schema: Option<&str>) -> Result<Vec<String>> {
        match schema {
            Some("public") => Ok(vec!["users".into(), "orders".into()]),
            _ => Ok(Vec::new()),
        }
    }

    async fn list_schemas(&self) -> Result<Vec<String>> {
        Ok(vec!["public".into()])
    }

    async fn get_structures(&self, table: &TableLocator) -> Result<Vec<Structure>> {
        table.validate()?;
        Ok(sample_structures())
    }

    async fn get_indices(&self, table: &TableLocator) -> Result<Vec<Index>> {
        table.validate()?;
        Ok(vec![Index {
            name: "users_pkey".into(),
            columns: vec!["id".into()],
            is_unique: true,
            algorithm: "btree".into(),
        }])
    }

    async fn get_database_info(&self) -> Result<DatabaseInfo> {
        Ok(DatabaseInfo {
            engine: "Mock".into(),
            version: "1.0".into(),
            database: self.config.database.clone(),
        })
    }

    async fn count_rows(&self, table: &TableLocator) -> Result<i64> {
        sql::count_rows(table)?;
        Ok(2)
    }

    async fn get_rows(&self, table: &TableLocator) -> Result<TableData> {
        sql::select_page(table)?;
        let rows = vec![sample_row(1, "ada"), sample_row(2, "grace")];
        let data = rows.into_iter().skip(table.offset as usize).take(table.limit as usize).collect();
        Ok(TableData { structures: sample_structures(), data })
    }

    async fn insert_row(&self, table: &TableLocator, row: &RowData) -> Result<u64> {
        sql::insert_row(table, row, &["id".to_string()])?;
        Ok(1)
    }

    async fn update_row(&self, table: &TableLocator, row: &RowData, primary_key: &str) -> Result<u64> {
        sql::update_row(table, row, primary_key)?;
        Ok(1)
    }

    async fn delete_row(&self, table: &TableLocator, primary_key: &str, value: &Value) -> Result<u64> {
        sql::delete_row(table, primary_key, value)?;
        Ok(1)
    }

    async fn execute_raw_query(&self, query: &str) -> Result<Vec<RowData>> {
        if query.trim_start().to_ascii_uppercase().starts_with("SELECT") {
            Ok(vec![sample_row(1, "ada")])
        } else {
            Err(ThunderError::execution(format!("syntax error at or near \"{}\"", query.trim())))
        }
    }

    async fn create_table(&self, table: &TableLocator, columns: &[ColumnDefinition]) -> Result<()> {
        sql::create_table(table, columns).map(drop)
    }

    async fn drop_table(&self, table: &TableLocator) -> Result<()> {
        sql::drop_table(table).map(drop)
    }

    async fn truncate_table(&self, table: &TableLocator) -> Result<()> {
        sql::truncate_table(table).map(drop)
    }

    async fn get_table_ddl(&self, table: &TableLocator) -> Result<String> {
        table.validate()?;
        Ok(sql::render_table_ddl(table, &sample_structures()))
    }

    fn list_supported_data_types(&self) -> &'static [DataType] {
        POSTGRES_DATA_TYPES
    }
}
