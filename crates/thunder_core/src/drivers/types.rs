//! PostgreSQL type names.
//!
//! `information_schema.columns.data_type` reports SQL-standard spellings
//! ("character varying", "timestamp with time zone"). The schema browser
//! shows the short internal names instead.

use crate::models::DataType;

/// Canonical short name for an `information_schema` type name.
///
/// Names without a mapping pass through unchanged.
pub fn canonical_type_name(native: &str) -> &str {
    match native {
        // Character
        "character" => "char",
        "character varying" | "varchar" => "varchar",
        "text" => "text",

        // Numeric
        "smallint" => "int2",
        "integer" => "int4",
        "bigint" => "int8",
        "decimal" | "numeric" => "decimal",
        "real" => "float4",
        "double precision" => "float8",
        "smallserial" => "serial2",
        "serial" => "serial4",
        "bigserial" => "serial8",

        // Date/time
        "timestamp without time zone" => "timestamp",
        "timestamp with time zone" => "timestamptz",
        "time without time zone" => "time",
        "time with time zone" => "timetz",
        "date" => "date",
        "interval" => "interval",

        "boolean" => "bool",
        "ARRAY" => "array",
        "bit varying" => "varbit",

        other => other,
    }
}

/// Column types offered by the table designer.
pub static POSTGRES_DATA_TYPES: &[DataType] = &[
    // Numeric
    DataType { name: "smallint", category: "Numeric", description: "2 bytes, -32768 to 32767" },
    DataType { name: "integer", category: "Numeric", description: "4 bytes, -2147483648 to 2147483647" },
    DataType { name: "bigint", category: "Numeric", description: "8 bytes, large range" },
    DataType { name: "decimal", category: "Numeric", description: "Variable precision" },
    DataType { name: "numeric", category: "Numeric", description: "Variable precision" },
    DataType { name: "real", category: "Numeric", description: "4 bytes floating-point" },
    DataType { name: "double precision", category: "Numeric", description: "8 bytes floating-point" },
    DataType { name: "smallserial", category: "Numeric", description: "Auto-increment 2 bytes" },
    DataType { name: "serial", category: "Numeric", description: "Auto-increment 4 bytes" },
    DataType { name: "bigserial", category: "Numeric", description: "Auto-increment 8 bytes" },
    // Character
    DataType { name: "varchar", category: "Character", description: "Variable length with limit" },
    DataType { name: "char", category: "Character", description: "Fixed length, blank padded" },
    DataType { name: "text", category: "Character", description: "Variable unlimited length" },
    // Binary
    DataType { name: "bytea", category: "Binary", description: "Binary data" },
    // Date/Time
    DataType { name: "date", category: "Date/Time", description: "Date only" },
    DataType { name: "time", category: "Date/Time", description: "Time of day" },
    DataType { name: "time with time zone", category: "Date/Time", description: "Time with timezone" },
    DataType { name: "timestamp", category: "Date/Time", description: "Date and time" },
    DataType {
        name: "timestamp with time zone",
        category: "Date/Time",
        description: "Date and time with timezone",
    },
    DataType { name: "interval", category: "Date/Time", description: "Time interval" },
    DataType { name: "boolean", category: "Boolean", description: "true/false" },
    DataType { name: "uuid", category: "UUID", description: "Universally unique identifier" },
    DataType { name: "json", category: "JSON", description: "JSON data" },
    DataType { name: "jsonb", category: "JSON", description: "Binary JSON (faster)" },
    DataType { name: "integer[]", category: "Array", description: "Array of integers" },
    DataType { name: "text[]", category: "Array", description: "Array of text" },
    DataType { name: "inet", category: "Network", description: "IPv4/IPv6 host address" },
    DataType { name: "cidr", category: "Network", description: "IPv4/IPv6 network" },
    DataType { name: "macaddr", category: "Network", description: "MAC address" },
    DataType { name: "point", category: "Geometric", description: "Point on plane" },
    DataType { name: "line", category: "Geometric", description: "Infinite line" },
    DataType { name: "box", category: "Geometric", description: "Rectangular box" },
    DataType { name: "circle", category: "Geometric", description: "Circle" },
    DataType { name: "money", category: "Monetary", description: "Currency amount" },
    DataType { name: "xml", category: "XML", description: "XML data" },
    DataType { name: "tsquery", category: "Full Text", description: "Text search query" },
    DataType { name: "tsvector", category: "Full Text", description: "Text search document" },
];
