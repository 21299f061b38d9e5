//! Catalog queries for the schema browser.
//!
//! Column metadata, key constraints and foreign-key references come from three
//! independent queries that are pipelined on one client and merged per column.

use std::collections::HashMap;

use futures_util::future::try_join3;
use tokio_postgres::{Client, Row};

use crate::drivers::postgres::sql::qualified_name;
use crate::drivers::types::canonical_type_name;
use crate::error::Result;
use crate::models::{DatabaseInfo, Index, Structure, TableLocator};

/// Default expressions of sequence-backed columns start with this.
const SEQUENCE_DEFAULT_PREFIX: &str = "nextval(";

const TABLES_SQL: &str = r#"
    SELECT c.relname::text AS table_name
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
    WHERE n.nspname = $1::text
      AND c.relkind IN ('r', 'p')
    ORDER BY c.oid
"#;

const SCHEMAS_SQL: &str = r#"
    SELECT schema_name::text AS schema_name
    FROM information_schema.schemata
    WHERE schema_name NOT IN ('pg_catalog', 'information_schema')
    ORDER BY schema_name
"#;

const COLUMNS_SQL: &str = r#"
    SELECT
        c.column_name::text AS column_name,
        c.data_type::text AS data_type,
        c.is_nullable::text AS is_nullable,
        c.character_maximum_length::int4 AS max_length,
        c.column_default::text AS column_default,
        col_description(
            format('%I.%I', c.table_schema, c.table_name)::regclass,
            c.ordinal_position::int4
        ) AS comment
    FROM information_schema.columns c
    WHERE c.table_schema = $1::text AND c.table_name = $2::text
    ORDER BY c.ordinal_position
"#;

const CONSTRAINTS_SQL: &str = r#"
    SELECT
        a.attname::text AS column_name,
        c.contype::text AS kind,
        NULL::text AS foreign_table,
        NULL::text AS foreign_column
    FROM pg_catalog.pg_attribute a
    JOIN pg_catalog.pg_constraint c ON c.conrelid = a.attrelid AND a.attnum = ANY(c.conkey)
    WHERE c.conrelid = $1::text::regclass
      AND c.contype IN ('p', 'u', 'f')
    ORDER BY c.oid, a.attnum
"#;

const FOREIGN_KEYS_SQL: &str = r#"
    SELECT
        a.attname::text AS column_name,
        c.contype::text AS kind,
        f.relname::text AS foreign_table,
        fa.attname::text AS foreign_column
    FROM pg_catalog.pg_constraint c
    JOIN pg_catalog.pg_class f ON f.oid = c.confrelid
    JOIN unnest(c.conkey) WITH ORDINALITY AS ck(attnum, ord) ON TRUE
    JOIN pg_catalog.pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = ck.attnum
    JOIN unnest(c.confkey) WITH ORDINALITY AS fk(attnum, ord) ON fk.ord = ck.ord
    JOIN pg_catalog.pg_attribute fa ON fa.attrelid = c.confrelid AND fa.attnum = fk.attnum
    WHERE c.conrelid = $1::text::regclass
      AND c.contype = 'f'
    ORDER BY c.oid, ck.ord
"#;

const PRIMARY_KEY_SQL: &str = r#"
    SELECT a.attname::text AS column_name
    FROM pg_catalog.pg_index i
    JOIN pg_catalog.pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
    WHERE i.indrelid = $1::text::regclass
      AND i.indisprimary
    ORDER BY a.attnum
"#;

const INDICES_SQL: &str = r#"
    SELECT
        i.relname::text AS index_name,
        a.attname::text AS column_name,
        ix.indisunique AS is_unique,
        am.amname::text AS algorithm
    FROM pg_catalog.pg_class t
    JOIN pg_catalog.pg_index ix ON t.oid = ix.indrelid
    JOIN pg_catalog.pg_class i ON i.oid = ix.indexrelid
    JOIN pg_catalog.pg_am am ON i.relam = am.oid
    JOIN unnest(ix.indkey) WITH ORDINALITY AS cols(attnum, ord) ON TRUE
    JOIN pg_catalog.pg_attribute a ON a.attrelid = t.oid AND a.attnum = cols.attnum
    WHERE t.oid = $1::text::regclass
    ORDER BY i.relname, cols.ord
"#;

const DATABASE_INFO_SQL: &str =
    "SELECT current_setting('server_version') AS version, current_database()::text AS database";

/// A constraint membership row, from either constraint query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConstraintRow {
    pub column: String,
    pub kind: String,
    pub foreign_table: Option<String>,
    pub foreign_column: Option<String>,
}

impl ConstraintRow {
    fn from_row(row: &Row) -> Self {
        Self {
            column: row.get("column_name"),
            kind: row.get("kind"),
            foreign_table: row.get("foreign_table"),
            foreign_column: row.get("foreign_column"),
        }
    }
}

fn column_from_row(row: &Row) -> Structure {
    let native: String = row.get("data_type");
    let default: Option<String> = row.get("column_default");
    let is_nullable: String = row.get("is_nullable");

    Structure {
        name: row.get("column_name"),
        data_type: canonical_type_name(&native).to_string(),
        length: row.get("max_length"),
        nullable: is_nullable == "YES",
        is_auto_increment: default.as_deref().is_some_and(|d| d.starts_with(SEQUENCE_DEFAULT_PREFIX)),
        default,
        comment: row.get("comment"),
        ..Default::default()
    }
}

/// Apply constraint rows to columns.
///
/// Rows are keyed by column name and a later row for the same column replaces
/// an earlier one, so the last constraint in iteration order decides how a
/// column is classified.
pub(crate) fn merge_constraints(
    columns: &mut [Structure],
    constraints: impl IntoIterator<Item = ConstraintRow>,
) {
    let by_column: HashMap<String, ConstraintRow> =
        constraints.into_iter().map(|row| (row.column.clone(), row)).collect();

    for column in columns.iter_mut() {
        let Some(constraint) = by_column.get(&column.name) else {
            continue;
        };
        match constraint.kind.as_str() {
            "p" => {
                column.is_primary = true;
                column.is_primary_label = Some("PRI".to_string());
            }
            "u" => column.is_unique = true,
            "f" => {
                if let (Some(table), Some(col)) = (&constraint.foreign_table, &constraint.foreign_column) {
                    column.foreign_key = Some(format!("{table}({col})"));
                }
            }
            _ => {}
        }
    }
}

/// Group `(index, column)` rows into one entry per index, keeping both the
/// first-seen index order and each index's key column order.
pub(crate) fn group_indices(rows: impl IntoIterator<Item = (String, String, bool, String)>) -> Vec<Index> {
    let mut indices: Vec<Index> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (name, column, is_unique, algorithm) in rows {
        let pos = *positions.entry(name.clone()).or_insert_with(|| {
            indices.push(Index { name, columns: Vec::new(), is_unique, algorithm });
            indices.len() - 1
        });
        indices[pos].columns.push(column);
    }

    indices
}

pub(crate) async fn list_tables(client: &Client, schema: &str) -> Result<Vec<String>> {
    let rows = client.query(TABLES_SQL, &[&schema]).await?;
    Ok(rows.iter().map(|row| row.get("table_name")).collect())
}

pub(crate) async fn list_schemas(client: &Client) -> Result<Vec<String>> {
    let rows = client.query(SCHEMAS_SQL, &[]).await?;
    Ok(rows.iter().map(|row| row.get("schema_name")).collect())
}

/// Columns of a table in ordinal order with constraints merged in.
pub(crate) async fn structures(client: &Client, table: &TableLocator) -> Result<Vec<Structure>> {
    let schema = table.schema_or_default();
    let name = table.table_name();
    let regclass = qualified_name(table);

    let (column_rows, constraint_rows, foreign_rows) = try_join3(
        client.query(COLUMNS_SQL, &[&schema, &name]),
        client.query(CONSTRAINTS_SQL, &[&regclass]),
        client.query(FOREIGN_KEYS_SQL, &[&regclass]),
    )
    .await?;

    let mut columns: Vec<Structure> = column_rows.iter().map(column_from_row).collect();
    let constraints = constraint_rows
        .iter()
        .chain(foreign_rows.iter())
        .map(ConstraintRow::from_row);
    merge_constraints(&mut columns, constraints);

    tracing::debug!(schema, table = name, columns = columns.len(), "Loaded table structure");
    Ok(columns)
}

/// Names of the primary key columns.
pub(crate) async fn primary_key_columns(client: &Client, table: &TableLocator) -> Result<Vec<String>> {
    let rows = client.query(PRIMARY_KEY_SQL, &[&qualified_name(table)]).await?;
    Ok(rows.iter().map(|row| row.get("column_name")).collect())
}

pub(crate) async fn indices(client: &Client, table: &TableLocator) -> Result<Vec<Index>> {
    let rows = client.query(INDICES_SQL, &[&qualified_name(table)]).await?;
    Ok(group_indices(rows.iter().map(|row| {
        (row.get("index_name"), row.get("column_name"), row.get("is_unique"), row.get("algorithm"))
    })))
}

pub(crate) async fn database_info(client: &Client) -> Result<DatabaseInfo> {
    let row = client.query_one(DATABASE_INFO_SQL, &[]).await?;
    Ok(DatabaseInfo {
        engine: "PostgreSQL".to_string(),
        version: row.get("version"),
        database: row.get("database"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str) -> Structure {
        Structure { name: name.to_string(), data_type: "int4".to_string(), ..Default::default() }
    }

    fn constraint(column: &str, kind: &str) -> ConstraintRow {
        ConstraintRow {
            column: column.to_string(),
            kind: kind.to_string(),
            foreign_table: None,
            foreign_column: None,
        }
    }

    #[test]
    fn test_merge_marks_primary_and_unique() {
        let mut columns = vec![column("id"), column("name"), column("email")];
        merge_constraints(&mut columns, vec![constraint("id", "p"), constraint("email", "u")]);

        assert!(columns[0].is_primary);
        assert_eq!(columns[0].is_primary_label.as_deref(), Some("PRI"));
        assert!(!columns[1].is_primary && !columns[1].is_unique);
        assert!(columns[2].is_unique);
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut columns = vec![column("code")];
        merge_constraints(&mut columns, vec![constraint("code", "p"), constraint("code", "u")]);
        assert!(!columns[0].is_primary);
        assert!(columns[0].is_unique);

        let mut columns = vec![column("code")];
        merge_constraints(&mut columns, vec![constraint("code", "u"), constraint("code", "p")]);
        assert!(columns[0].is_primary);
        assert!(!columns[0].is_unique);
    }

    #[test]
    fn test_merge_foreign_key_reference() {
        let mut columns = vec![column("user_id")];
        let fk = ConstraintRow {
            foreign_table: Some("users".to_string()),
            foreign_column: Some("id".to_string()),
            ..constraint("user_id", "f")
        };
        merge_constraints(&mut columns, vec![constraint("user_id", "f"), fk]);
        assert_eq!(columns[0].foreign_key.as_deref(), Some("users(id)"));
    }

    #[test]
    fn test_foreign_row_without_reference_is_ignored() {
        let mut columns = vec![column("user_id")];
        merge_constraints(&mut columns, vec![constraint("user_id", "f")]);
        assert!(columns[0].foreign_key.is_none());
    }

    #[test]
    fn test_group_indices_preserves_order() {
        let rows = vec![
            ("idx_name_email".to_string(), "name".to_string(), false, "btree".to_string()),
            ("idx_name_email".to_string(), "email".to_string(), false, "btree".to_string()),
            ("users_pkey".to_string(), "id".to_string(), true, "btree".to_string()),
        ];
        let indices = group_indices(rows);

        assert_eq!(indices.len(), 2);
        assert_eq!(indices[0].name, "idx_name_email");
        assert_eq!(indices[0].columns, vec!["name", "email"]);
        assert_eq!(indices[1].name, "users_pkey");
        assert!(indices[1].is_unique);
    }
}
