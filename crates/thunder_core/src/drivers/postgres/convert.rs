//! Conversion between [`Value`] and the PostgreSQL wire format.
//!
//! Binding is checked against the parameter type the server reported when it
//! prepared the statement. A `Text` bound to an `int4` column is parsed, and a
//! `Binary` bound to a `uuid` column is refused with a [`BindError`] instead of
//! reaching the server as garbage.
//!
//! Results always arrive in binary format. Types without a decoder here come
//! back as `Value::Binary` holding the raw bytes.

use std::error::Error;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{Buf, BytesMut};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio_postgres::types::{to_sql_checked, FromSql, IsNull, Kind, ToSql, Type};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::BindError;
use crate::models::{RowData, Value};

type BoxError = Box<dyn Error + Sync + Send>;

const PGSQL_AF_INET: u8 = 2;
const PGSQL_AF_INET6: u8 = 3;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if self.is_null() {
            return Ok(IsNull::Yes);
        }

        match *ty {
            Type::BOOL => to_bool(self, ty)?.to_sql(ty, out),
            Type::INT2 => {
                let v = i16::try_from(to_int(self, ty)?)
                    .map_err(|_| BindError::new(self.kind(), ty.name()).with_reason("out of range"))?;
                v.to_sql(ty, out)
            }
            Type::INT4 => {
                let v = i32::try_from(to_int(self, ty)?)
                    .map_err(|_| BindError::new(self.kind(), ty.name()).with_reason("out of range"))?;
                v.to_sql(ty, out)
            }
            Type::INT8 => to_int(self, ty)?.to_sql(ty, out),
            Type::FLOAT4 => (to_float(self, ty)? as f32).to_sql(ty, out),
            Type::FLOAT8 => to_float(self, ty)?.to_sql(ty, out),
            Type::NUMERIC => to_decimal(self, ty)?.to_sql(ty, out),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                to_text(self, ty)?.to_sql(ty, out)
            }
            Type::UUID => {
                let text = expect_text(self, ty)?;
                let uuid = Uuid::parse_str(text.trim())
                    .map_err(|e| BindError::new(self.kind(), ty.name()).with_reason(e))?;
                uuid.to_sql(ty, out)
            }
            Type::JSON | Type::JSONB => to_json(self, ty)?.to_sql(ty, out),
            Type::DATE => to_date(self, ty)?.to_sql(ty, out),
            Type::TIME => to_time(self, ty)?.to_sql(ty, out),
            Type::TIMESTAMP => to_timestamp(self, ty)?.naive_utc().to_sql(ty, out),
            Type::TIMESTAMPTZ => to_timestamp(self, ty)?.to_sql(ty, out),
            Type::BYTEA => to_bytes(self, ty)?.to_sql(ty, out),
            // Enums and extension text types (citext) use the text wire format
            _ if matches!(ty.kind(), Kind::Enum(_)) || ty.name() == "citext" => {
                to_text(self, ty)?.as_str().to_sql(ty, out)
            }
            _ => Err(BindError::new(self.kind(), ty.name()).into()),
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn mismatch(value: &Value, ty: &Type) -> BindError {
    BindError::new(value.kind(), ty.name())
}

fn expect_text<'a>(value: &'a Value, ty: &Type) -> Result<&'a str, BindError> {
    value.as_str().ok_or_else(|| mismatch(value, ty))
}

fn to_bool(value: &Value, ty: &Type) -> Result<bool, BindError> {
    match value {
        Value::Bool(v) => Ok(*v),
        Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Ok(false),
            _ => Err(mismatch(value, ty).with_reason(format!("'{s}' is not a boolean"))),
        },
        _ => Err(mismatch(value, ty)),
    }
}

fn to_int(value: &Value, ty: &Type) -> Result<i64, BindError> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::Float(v) if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v <= i64::MAX as f64 => Ok(*v as i64),
        Value::Text(s) => s.trim().parse().map_err(|e| mismatch(value, ty).with_reason(e)),
        _ => Err(mismatch(value, ty)),
    }
}

fn to_float(value: &Value, ty: &Type) -> Result<f64, BindError> {
    match value {
        Value::Float(v) => Ok(*v),
        Value::Int(v) => Ok(*v as f64),
        Value::Text(s) => s.trim().parse().map_err(|e| mismatch(value, ty).with_reason(e)),
        _ => Err(mismatch(value, ty)),
    }
}

fn to_decimal(value: &Value, ty: &Type) -> Result<Decimal, BindError> {
    match value {
        Value::Int(v) => Ok(Decimal::from(*v)),
        Value::Float(v) => Decimal::try_from(*v).map_err(|e| mismatch(value, ty).with_reason(e)),
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(s))
                .map_err(|e| mismatch(value, ty).with_reason(e))
        }
        _ => Err(mismatch(value, ty)),
    }
}

fn to_text(value: &Value, ty: &Type) -> Result<String, BindError> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(value.to_string()),
        Value::Timestamp(ts) => Ok(ts.to_rfc3339()),
        Value::Null | Value::Binary(_) => Err(mismatch(value, ty)),
    }
}

fn to_json(value: &Value, ty: &Type) -> Result<serde_json::Value, BindError> {
    match value {
        // Text that is not a JSON document is stored as a JSON string
        Value::Text(s) => Ok(serde_json::from_str(s).unwrap_or_else(|_| serde_json::Value::String(s.clone()))),
        Value::Binary(_) => Err(mismatch(value, ty)),
        other => serde_json::to_value(other).map_err(|e| mismatch(value, ty).with_reason(e)),
    }
}

fn to_date(value: &Value, ty: &Type) -> Result<NaiveDate, BindError> {
    match value {
        Value::Timestamp(ts) => Ok(ts.date_naive()),
        Value::Text(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .or_else(|_| parse_timestamp(s).map(|ts| ts.date_naive()).ok_or(()))
                .map_err(|_| mismatch(value, ty).with_reason(format!("'{s}' is not a date")))
        }
        _ => Err(mismatch(value, ty)),
    }
}

fn to_time(value: &Value, ty: &Type) -> Result<NaiveTime, BindError> {
    match value {
        Value::Timestamp(ts) => Ok(ts.time()),
        Value::Text(s) => {
            let s = s.trim();
            NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
                .map_err(|e| mismatch(value, ty).with_reason(e))
        }
        _ => Err(mismatch(value, ty)),
    }
}

fn to_timestamp(value: &Value, ty: &Type) -> Result<DateTime<Utc>, BindError> {
    match value {
        Value::Timestamp(ts) => Ok(*ts),
        Value::Text(s) => parse_timestamp(s.trim())
            .ok_or_else(|| mismatch(value, ty).with_reason(format!("'{}' is not a timestamp", s.trim()))),
        _ => Err(mismatch(value, ty)),
    }
}

/// RFC 3339, or a naive timestamp read as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn to_bytes(value: &Value, ty: &Type) -> Result<Vec<u8>, BindError> {
    match value {
        Value::Binary(bytes) => Ok(bytes.clone()),
        Value::Text(s) => match s.strip_prefix("\\x") {
            Some(hex) => decode_hex(hex).ok_or_else(|| mismatch(value, ty).with_reason("invalid hex escape")),
            None => Ok(s.as_bytes().to_vec()),
        },
        _ => Err(mismatch(value, ty)),
    }
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len()).step_by(2).map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()).collect()
}


// ========== Result Decoding ==========

/// Types whose binary form is their text.
struct TextCell(String);

impl<'a> FromSql<'a> for TextCell {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Ok(Self(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_)) || *ty == Type::XML
    }
}

/// Raw bytes of a type without a dedicated decoder.
struct OpaqueCell(Vec<u8>);

impl<'a> FromSql<'a> for OpaqueCell {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Ok(Self(raw.to_vec()))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

/// `inet` and `cidr`, rendered as psql shows them.
struct InetCell(String);

impl<'a> FromSql<'a> for InetCell {
    fn from_sql(ty: &Type, mut raw: &'a [u8]) -> Result<Self, BoxError> {
        if raw.len() < 4 {
            return Err("invalid inet header".into());
        }
        let family = raw.get_u8();
        let bits = raw.get_u8();
        let is_cidr = raw.get_u8() != 0;
        let len = raw.get_u8();

        let (addr, max_bits): (IpAddr, u8) = match (family, len, raw) {
            (PGSQL_AF_INET, 4, &[a, b, c, d]) => (Ipv4Addr::new(a, b, c, d).into(), 32),
            (PGSQL_AF_INET6, 16, octets) => {
                let octets: [u8; 16] = octets.try_into()?;
                (Ipv6Addr::from(octets).into(), 128)
            }
            _ => return Err(format!("invalid {} value", ty.name()).into()),
        };

        if is_cidr || bits != max_bits {
            Ok(Self(format!("{addr}/{bits}")))
        } else {
            Ok(Self(addr.to_string()))
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(*ty, Type::INET | Type::CIDR)
    }
}

/// `interval` in the server's default output style.
struct IntervalCell(String);

impl<'a> FromSql<'a> for IntervalCell {
    fn from_sql(_: &Type, mut raw: &'a [u8]) -> Result<Self, BoxError> {
        if raw.len() != 16 {
            return Err("invalid interval length".into());
        }
        let micros = raw.get_i64();
        let days = raw.get_i32();
        let months = raw.get_i32();
        Ok(Self(format_interval(months, days, micros)))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::INTERVAL
    }
}

fn format_interval(months: i32, days: i32, micros: i64) -> String {
    let mut parts = Vec::new();
    for (amount, unit) in [(months / 12, "year"), (months % 12, "mon"), (days, "day")] {
        if amount != 0 {
            let plural = if amount == 1 { "" } else { "s" };
            parts.push(format!("{amount} {unit}{plural}"));
        }
    }

    if micros != 0 || parts.is_empty() {
        let sign = if micros < 0 { "-" } else { "" };
        let abs = micros.unsigned_abs();
        let secs = abs / 1_000_000;
        let mut clock = format!("{sign}{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60);
        let fraction = abs % 1_000_000;
        if fraction != 0 {
            clock.push_str(format!(".{fraction:06}").trim_end_matches('0'));
        }
        parts.push(clock);
    }
    parts.join(" ")
}

/// `timetz` as the time of day followed by its UTC offset.
struct TimeTzCell(String);

impl<'a> FromSql<'a> for TimeTzCell {
    fn from_sql(_: &Type, mut raw: &'a [u8]) -> Result<Self, BoxError> {
        if raw.len() != 12 {
            return Err("invalid timetz length".into());
        }
        let micros = raw.get_i64();
        // Seconds west of UTC
        let zone = raw.get_i32();

        let secs = u32::try_from(micros.div_euclid(1_000_000))?;
        let nanos = u32::try_from(micros.rem_euclid(1_000_000) * 1_000)?;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
            .ok_or("timetz out of range")?;
        let offset = FixedOffset::east_opt(-zone).ok_or("timetz offset out of range")?;
        Ok(Self(format!("{time}{offset}")))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::TIMETZ
    }
}

/// Arrays come back as JSON array text, the same as `json` columns.
fn array_text<T: Serialize>(items: Vec<Option<T>>) -> Value {
    serde_json::to_string(&items).map(Value::Text).unwrap_or(Value::Null)
}

fn array_value(row: &Row, idx: usize, member: &Type) -> Result<Option<Value>, tokio_postgres::Error> {
    let value = match *member {
        Type::BOOL => row.try_get::<_, Option<Vec<Option<bool>>>>(idx)?.map(array_text),
        Type::INT2 => row.try_get::<_, Option<Vec<Option<i16>>>>(idx)?.map(array_text),
        Type::INT4 => row.try_get::<_, Option<Vec<Option<i32>>>>(idx)?.map(array_text),
        Type::INT8 => row.try_get::<_, Option<Vec<Option<i64>>>>(idx)?.map(array_text),
        Type::FLOAT4 => row.try_get::<_, Option<Vec<Option<f32>>>>(idx)?.map(array_text),
        Type::FLOAT8 => row.try_get::<_, Option<Vec<Option<f64>>>>(idx)?.map(array_text),
        Type::NUMERIC => row.try_get::<_, Option<Vec<Option<Decimal>>>>(idx)?.map(|items| {
            array_text(items.into_iter().map(|d| d.map(|d| d.to_string())).collect())
        }),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<Vec<Option<String>>>>(idx)?.map(array_text)
        }
        Type::UUID => row.try_get::<_, Option<Vec<Option<Uuid>>>>(idx)?.map(array_text),
        Type::JSON | Type::JSONB => {
            row.try_get::<_, Option<Vec<Option<serde_json::Value>>>>(idx)?.map(array_text)
        }
        Type::DATE => row.try_get::<_, Option<Vec<Option<NaiveDate>>>>(idx)?.map(array_text),
        Type::TIMESTAMP => {
            row.try_get::<_, Option<Vec<Option<NaiveDateTime>>>>(idx)?.map(array_text)
        }
        Type::TIMESTAMPTZ => {
            row.try_get::<_, Option<Vec<Option<DateTime<Utc>>>>>(idx)?.map(array_text)
        }
        _ => row.try_get::<_, Option<OpaqueCell>>(idx)?.map(|cell| Value::Binary(cell.0)),
    };
    Ok(value)
}

/// Convert a row into a column-name keyed map.
pub(crate) fn row_to_map(row: &Row) -> Result<RowData, tokio_postgres::Error> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, column)| Ok((column.name().to_string(), cell_value(row, i, column.type_())?)))
        .collect()
}

fn cell_value(row: &Row, idx: usize, ty: &Type) -> Result<Value, tokio_postgres::Error> {
    let text = |cell: Option<String>| cell.map(Value::Text);

    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(|v| Value::Int(v.into())),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(|v| Value::Int(v.into())),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(Value::Int),
        Type::OID => row.try_get::<_, Option<u32>>(idx)?.map(|v| Value::Int(v.into())),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(|v| Value::Float(v.into())),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(Value::Float),
        Type::NUMERIC => row.try_get::<_, Option<Decimal>>(idx)?.map(|v| Value::Text(v.to_string())),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            text(row.try_get::<_, Option<String>>(idx)?)
        }
        Type::TIMESTAMPTZ => row.try_get::<_, Option<DateTime<Utc>>>(idx)?.map(Value::Timestamp),
        Type::TIMESTAMP => {
            row.try_get::<_, Option<NaiveDateTime>>(idx)?.map(|v| Value::Timestamp(v.and_utc()))
        }
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(idx)?.map(|v| Value::Text(v.to_string())),
        Type::TIME => row.try_get::<_, Option<NaiveTime>>(idx)?.map(|v| Value::Text(v.to_string())),
        Type::TIMETZ => text(row.try_get::<_, Option<TimeTzCell>>(idx)?.map(|cell| cell.0)),
        Type::INTERVAL => text(row.try_get::<_, Option<IntervalCell>>(idx)?.map(|cell| cell.0)),
        Type::INET | Type::CIDR => text(row.try_get::<_, Option<InetCell>>(idx)?.map(|cell| cell.0)),
        Type::UUID => row.try_get::<_, Option<Uuid>>(idx)?.map(|v| Value::Text(v.to_string())),
        Type::JSON | Type::JSONB => {
            row.try_get::<_, Option<serde_json::Value>>(idx)?.map(|v| Value::Text(v.to_string()))
        }
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(Value::Binary),
        _ => match ty.kind() {
            Kind::Array(member) => array_value(row, idx, member)?,
            // citext and the other extension types tokio-postgres reads as text
            _ if <String as FromSql>::accepts(ty) => text(row.try_get::<_, Option<String>>(idx)?),
            _ if TextCell::accepts(ty) => text(row.try_get::<_, Option<TextCell>>(idx)?.map(|cell| cell.0)),
            _ => row.try_get::<_, Option<OpaqueCell>>(idx)?.map(|cell| Value::Binary(cell.0)),
        },
    };
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(value: Value, ty: &Type) -> Result<BytesMut, BoxError> {
        let mut out = BytesMut::new();
        value.to_sql(ty, &mut out)?;
        Ok(out)
    }

    fn bind_err(value: Value, ty: &Type) -> BindError {
        let err = bind(value, ty).unwrap_err();
        *err.downcast::<BindError>().unwrap()
    }

    #[test]
    fn test_null_binds_as_null() {
        let mut out = BytesMut::new();
        assert!(matches!(Value::Null.to_sql(&Type::UUID, &mut out).unwrap(), IsNull::Yes));
    }

    #[test]
    fn test_int_width_checked() {
        assert_eq!(&bind(Value::Int(7), &Type::INT4).unwrap()[..], &7i32.to_be_bytes());
        let err = bind_err(Value::Int(70_000), &Type::INT2);
        assert_eq!(err.target, "int2");
        assert_eq!(err.reason.as_deref(), Some("out of range"));
    }

    #[test]
    fn test_text_parsed_for_numeric_columns() {
        assert_eq!(&bind(Value::from(" 42 "), &Type::INT8).unwrap()[..], &42i64.to_be_bytes());
        assert_eq!(&bind(Value::from("1.5"), &Type::FLOAT8).unwrap()[..], &1.5f64.to_be_bytes());
        assert!(bind(Value::from("abc"), &Type::INT4).is_err());
    }

    #[test]
    fn test_whole_float_binds_to_int() {
        assert_eq!(&bind(Value::Float(3.0), &Type::INT4).unwrap()[..], &3i32.to_be_bytes());
        assert!(bind(Value::Float(3.5), &Type::INT4).is_err());
    }

    #[test]
    fn test_binary_refused_for_uuid() {
        let err = bind_err(Value::Binary(vec![1, 2]), &Type::UUID);
        assert_eq!(err.to_string(), "cannot bind Binary to a column of type uuid");
    }

    #[test]
    fn test_uuid_from_text() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let out = bind(Value::from(id), &Type::UUID).unwrap();
        assert_eq!(&out[..], Uuid::parse_str(id).unwrap().as_bytes());
    }

    #[test]
    fn test_bool_from_text() {
        assert_eq!(&bind(Value::from("t"), &Type::BOOL).unwrap()[..], &[1]);
        assert_eq!(&bind(Value::from("off"), &Type::BOOL).unwrap()[..], &[0]);
        assert!(bind(Value::from("maybe"), &Type::BOOL).is_err());
    }

    #[test]
    fn test_numbers_bind_to_text_columns() {
        assert_eq!(&bind(Value::Int(12), &Type::VARCHAR).unwrap()[..], b"12");
        assert!(bind(Value::Binary(vec![0]), &Type::TEXT).is_err());
    }

    #[test]
    fn test_jsonb_accepts_plain_text() {
        let out = bind(Value::from("hello"), &Type::JSONB).unwrap();
        assert_eq!(&out[..], b"\x01\"hello\"");
        let out = bind(Value::from(r#"{"a":1}"#), &Type::JSONB).unwrap();
        assert_eq!(&out[..], b"\x01{\"a\":1}");
    }

    #[test]
    fn test_timestamp_from_text() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 30, 0).unwrap().and_utc();
        assert_eq!(parse_timestamp("2024-05-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert!(bind(Value::from("2024-05-01"), &Type::DATE).is_ok());
        assert!(bind(Value::from("2024-05-01 10:30"), &Type::TIMESTAMPTZ).is_ok());
    }

    #[test]
    fn test_serialized_timestamp_text_binds_like_timestamp() {
        let ts = parse_timestamp("2024-05-01T10:30:00Z").unwrap();
        let json = serde_json::to_string(&Value::Timestamp(ts)).unwrap();
        let round_tripped: Value = serde_json::from_str(&json).unwrap();
        assert!(matches!(round_tripped, Value::Text(_)));

        let from_text = bind(round_tripped, &Type::TIMESTAMPTZ).unwrap();
        let from_timestamp = bind(Value::Timestamp(ts), &Type::TIMESTAMPTZ).unwrap();
        assert_eq!(from_text, from_timestamp);
    }

    #[test]
    fn test_bytea_hex_escape() {
        assert_eq!(&bind(Value::from("\\xdeadbeef"), &Type::BYTEA).unwrap()[..], &[0xde, 0xad, 0xbe, 0xef]);
        assert!(bind(Value::from("\\xabc"), &Type::BYTEA).is_err());
    }

    #[test]
    fn test_unsupported_target_type() {
        let err = bind_err(Value::Int(1), &Type::POINT);
        assert_eq!(err.target, "point");
    }


    #[test]
    fn test_numeric_binds_through_decimal() {
        let out = bind(Value::from(" -123.4500 "), &Type::NUMERIC).unwrap();
        let decoded = Decimal::from_sql(&Type::NUMERIC, &out).unwrap();
        assert_eq!(decoded.to_string(), "-123.4500");

        let out = bind(Value::Float(12.5), &Type::NUMERIC).unwrap();
        assert_eq!(Decimal::from_sql(&Type::NUMERIC, &out).unwrap().to_string(), "12.5");

        let out = bind(Value::from("1e3"), &Type::NUMERIC).unwrap();
        assert_eq!(Decimal::from_sql(&Type::NUMERIC, &out).unwrap(), Decimal::from(1000));
    }

    #[test]
    fn test_numeric_rejects_garbage() {
        let err = bind_err(Value::from("twelve"), &Type::NUMERIC);
        assert_eq!(err.target, "numeric");
        assert!(err.reason.is_some());
        assert!(bind(Value::Bool(true), &Type::NUMERIC).is_err());
    }

    #[test]
    fn test_inet_decodes_from_wire() {
        let cell = InetCell::from_sql(&Type::INET, &[2, 32, 0, 4, 10, 0, 0, 1]).unwrap();
        assert_eq!(cell.0, "10.0.0.1");

        let cell = InetCell::from_sql(&Type::INET, &[2, 24, 0, 4, 192, 168, 1, 7]).unwrap();
        assert_eq!(cell.0, "192.168.1.7/24");

        let cell = InetCell::from_sql(&Type::CIDR, &[2, 8, 1, 4, 10, 0, 0, 0]).unwrap();
        assert_eq!(cell.0, "10.0.0.0/8");

        let mut v6 = vec![3, 128, 0, 16];
        v6.extend_from_slice(&Ipv6Addr::LOCALHOST.octets());
        assert_eq!(InetCell::from_sql(&Type::INET, &v6).unwrap().0, "::1");

        assert!(InetCell::from_sql(&Type::INET, &[2, 32, 0, 4, 10]).is_err());
    }

    #[test]
    fn test_interval_decodes_from_wire() {
        let one_day = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0];
        assert_eq!(IntervalCell::from_sql(&Type::INTERVAL, &one_day).unwrap().0, "1 day");

        let mut raw = Vec::new();
        raw.extend_from_slice(&3_723_500_000i64.to_be_bytes());
        raw.extend_from_slice(&2i32.to_be_bytes());
        raw.extend_from_slice(&14i32.to_be_bytes());
        assert_eq!(
            IntervalCell::from_sql(&Type::INTERVAL, &raw).unwrap().0,
            "1 year 2 mons 2 days 01:02:03.5"
        );

        assert_eq!(format_interval(0, 0, 0), "00:00:00");
        assert_eq!(format_interval(0, -1, -60_000_000), "-1 days -00:01:00");
    }

    #[test]
    fn test_timetz_decodes_from_wire() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&37_800_000_000i64.to_be_bytes());
        raw.extend_from_slice(&(-7200i32).to_be_bytes());
        assert_eq!(TimeTzCell::from_sql(&Type::TIMETZ, &raw).unwrap().0, "10:30:00+02:00");
        assert!(TimeTzCell::from_sql(&Type::TIMETZ, &raw[..8]).is_err());
    }

    #[test]
    fn test_text_cell_only_for_text_wire_types() {
        assert!(TextCell::accepts(&Type::XML));
        assert!(!TextCell::accepts(&Type::INET));
        assert!(!TextCell::accepts(&Type::INTERVAL));
        assert!(!TextCell::accepts(&Type::POINT));
        assert!(!TextCell::accepts(&Type::MONEY));
    }

    #[test]
    fn test_opaque_cell_keeps_bytes() {
        let point = [0x3f, 0xf0, 0, 0, 0, 0, 0, 0, 0x40, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(OpaqueCell::from_sql(&Type::POINT, &point).unwrap().0, point.to_vec());
    }

    #[test]
    fn test_array_text_is_json() {
        assert_eq!(array_text(vec![Some(1), None, Some(3)]), Value::Text("[1,null,3]".into()));
        assert_eq!(array_text(vec![Some("a".to_string())]), Value::Text(r#"["a"]"#.into()));
        assert_eq!(array_text::<i32>(Vec::new()), Value::Text("[]".into()));
    }
}
