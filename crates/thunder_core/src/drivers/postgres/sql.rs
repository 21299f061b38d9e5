//! SQL text builders.
//!
//! Pure functions: nothing here touches the network, so every validation rule
//! fails before a round trip. Identifiers are always quoted and values are
//! always returned as bound parameters. The only text spliced in verbatim is
//! a locator's filter and a column's DEFAULT expression, both supplied by the
//! user on purpose.

use crate::error::{Result, ThunderError};
use crate::models::{ColumnDefinition, RowData, Structure, TableLocator, Value};

/// Payload key the grid sets on rows that have not been saved yet.
pub const NEW_ROW_MARKER: &str = "_isNew";

/// Prefix of grid-only scratch fields.
pub const TEMP_FIELD_PREFIX: &str = "temp_";

/// SQL text plus the values for its `$n` placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"schema"."table"` for a validated locator.
pub fn qualified_name(table: &TableLocator) -> String {
    format!("{}.{}", quote_ident(table.schema_or_default()), quote_ident(table.table_name()))
}

/// Whether a payload field is grid bookkeeping rather than a column.
pub fn is_excluded_field(name: &str) -> bool {
    name == NEW_ROW_MARKER || name.starts_with(TEMP_FIELD_PREFIX)
}

fn column_ident(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(ThunderError::validation("column name must not be blank"));
    }
    Ok(quote_ident(name))
}

fn where_clause(table: &TableLocator) -> String {
    table.filter_clause().map(|filter| format!(" WHERE {filter}")).unwrap_or_default()
}

/// One page of rows. The limit is always sent, so a zero limit reads nothing.
pub fn select_page(table: &TableLocator) -> Result<Statement> {
    table.validate()?;

    let sql = format!(
        "SELECT * FROM {}{} LIMIT $1 OFFSET $2",
        qualified_name(table),
        where_clause(table)
    );
    Ok(Statement::new(sql, vec![Value::Int(table.limit), Value::Int(table.offset)]))
}

/// Row count under the locator's filter. Paging is ignored.
pub fn count_rows(table: &TableLocator) -> Result<Statement> {
    table.validate()?;
    let sql = format!("SELECT COUNT(*) FROM {}{}", qualified_name(table), where_clause(table));
    Ok(Statement::new(sql, Vec::new()))
}

/// INSERT for one row.
///
/// A null for any primary key column is left out so the server can generate
/// it. A payload left with no columns is rejected.
pub fn insert_row(table: &TableLocator, row: &RowData, primary_keys: &[String]) -> Result<Statement> {
    table.validate()?;
    if row.is_empty() {
        return Err(ThunderError::validation("no data to insert"));
    }

    let mut columns = Vec::with_capacity(row.len());
    let mut placeholders = Vec::with_capacity(row.len());
    let mut params = Vec::with_capacity(row.len());

    for (column, value) in row {
        if is_excluded_field(column) {
            continue;
        }
        if value.is_null() && primary_keys.iter().any(|pk| pk == column) {
            continue;
        }
        columns.push(column_ident(column)?);
        params.push(value.clone());
        placeholders.push(format!("${}", params.len()));
    }

    if columns.is_empty() {
        return Err(ThunderError::validation("no data to insert"));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified_name(table),
        columns.join(", "),
        placeholders.join(", ")
    );

    Ok(Statement::new(sql, params))
}

/// UPDATE of the row identified by `primary_key`, whose value must be in `row`.
pub fn update_row(table: &TableLocator, row: &RowData, primary_key: &str) -> Result<Statement> {
    table.validate()?;
    let pk_ident = column_ident(primary_key)?;
    let pk_value = row
        .get(primary_key)
        .ok_or_else(|| ThunderError::validation(format!("primary key '{primary_key}' not found in data")))?;

    let mut assignments = Vec::with_capacity(row.len());
    let mut params = Vec::with_capacity(row.len());

    for (column, value) in row {
        if column == primary_key || is_excluded_field(column) {
            continue;
        }
        params.push(value.clone());
        assignments.push(format!("{} = ${}", column_ident(column)?, params.len()));
    }

    if assignments.is_empty() {
        return Err(ThunderError::validation("no columns to update"));
    }

    params.push(pk_value.clone());
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        qualified_name(table),
        assignments.join(", "),
        pk_ident,
        params.len()
    );

    Ok(Statement::new(sql, params))
}

/// DELETE of the row whose `primary_key` equals `value`.
pub fn delete_row(table: &TableLocator, primary_key: &str, value: &Value) -> Result<Statement> {
    table.validate()?;
    let sql = format!("DELETE FROM {} WHERE {} = $1", qualified_name(table), column_ident(primary_key)?);
    Ok(Statement::new(sql, vec![value.clone()]))
}

/// Type names may carry modifiers and array brackets but nothing that could
/// end the column definition.
fn validate_type_name(column: &str, data_type: &str) -> Result<()> {
    let data_type = data_type.trim();
    if data_type.is_empty() {
        return Err(ThunderError::validation(format!("column '{column}' needs a type")));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || " _(),[].".contains(c);
    if !data_type.chars().all(allowed) {
        return Err(ThunderError::validation(format!("invalid type for column '{column}': {data_type}")));
    }
    Ok(())
}

/// CREATE TABLE with one composite PRIMARY KEY clause.
pub fn create_table(table: &TableLocator, columns: &[ColumnDefinition]) -> Result<String> {
    table.validate()?;
    if columns.is_empty() {
        return Err(ThunderError::validation("at least one column is required"));
    }

    let mut definitions = Vec::with_capacity(columns.len() + 1);
    let mut primary_keys = Vec::new();

    for column in columns {
        let name = column.name.trim();
        if name.is_empty() {
            continue;
        }
        validate_type_name(name, &column.data_type)?;

        let mut definition = format!("{} {}", quote_ident(name), column.data_type.trim());
        if !column.nullable {
            definition.push_str(" NOT NULL");
        }
        if !column.default.trim().is_empty() {
            definition.push_str(" DEFAULT ");
            definition.push_str(column.default.trim());
        }
        if column.unique {
            definition.push_str(" UNIQUE");
        }
        if column.primary_key {
            primary_keys.push(quote_ident(name));
        }
        definitions.push(definition);
    }

    if definitions.is_empty() {
        return Err(ThunderError::validation("at least one column with a name is required"));
    }
    if !primary_keys.is_empty() {
        definitions.push(format!("PRIMARY KEY ({})", primary_keys.join(", ")));
    }

    Ok(format!("CREATE TABLE {} ({})", qualified_name(table), definitions.join(", ")))
}

pub fn drop_table(table: &TableLocator) -> Result<String> {
    table.validate()?;
    Ok(format!("DROP TABLE IF EXISTS {}", qualified_name(table)))
}

/// TRUNCATE that also clears tables referencing this one.
pub fn truncate_table(table: &TableLocator) -> Result<String> {
    table.validate()?;
    Ok(format!("TRUNCATE TABLE {} CASCADE", qualified_name(table)))
}

/// Render a CREATE TABLE statement from introspected columns.
pub fn render_table_ddl(table: &TableLocator, structures: &[Structure]) -> String {
    let mut lines = Vec::with_capacity(structures.len() + 1);
    let mut primary_keys = Vec::new();

    for column in structures {
        let mut line = format!("    {} {}", quote_ident(&column.name), column.data_type);
        if let Some(length) = column.length {
            line.push_str(&format!("({length})"));
        }
        if !column.nullable {
            line.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            line.push_str(&format!(" DEFAULT {default}"));
        }
        if column.is_unique {
            line.push_str(" UNIQUE");
        }
        if let Some(reference) = &column.foreign_key {
            line.push_str(&format!(" REFERENCES {reference}"));
        }
        if column.is_primary {
            primary_keys.push(quote_ident(&column.name));
        }
        lines.push(line);
    }

    if !primary_keys.is_empty() {
        lines.push(format!("    PRIMARY KEY ({})", primary_keys.join(", ")));
    }

    format!("CREATE TABLE {} (\n{}\n);", qualified_name(table), lines.join(",\n"))
}
