//! Column Value Decoding
//!
//! [`SqlValue`] reads one column from its binary wire form into JSON,
//! rendering each type the way `PostgreSQL` prints it as text.
//!
//! # Type Mapping
//! - `bool`, integers, `oid` → JSON booleans and numbers
//! - `real`/`double precision` → numbers; NaN and infinities → null
//! - `numeric` → decimal string at full precision (`NaN`, `Infinity` included)
//! - `money` → `$1,234.50`
//! - `interval` → `1 year 2 mons 3 days 04:05:06.5`
//! - `inet`/`cidr` → `10.0.0.0/8`, `macaddr` → `08:00:2b:01:02:03`
//! - date and time types → ISO-8601 strings
//! - `json`/`jsonb` → nested JSON
//! - `bytea` → Base64
//! - text types, enums, `xml` → strings
//! - one-dimensional arrays of any of the above → JSON arrays
//!
//! Types outside this set are refused through `accepts`, which surfaces as a
//! decode error for the query instead of a mangled value.

use base64::Engine;
use serde_json::{Number, Value};
use std::error::Error as StdError;
use std::fmt::Write;
use std::net::IpAddr;
use tokio_postgres::types::{FromSql, Kind, Type};

type DecodeResult<T> = std::result::Result<T, Box<dyn StdError + Sync + Send>>;

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

const PGSQL_AF_INET: u8 = 2;
const PGSQL_AF_INET6: u8 = 3;

const MICROS_PER_SECOND: u64 = 1_000_000;

/// A decoded column value
#[derive(Debug, Clone, PartialEq)]
pub struct SqlValue(pub Value);

impl SqlValue {
    #[must_use]
    pub fn into_json(self) -> Value {
        self.0
    }
}

impl<'a> FromSql<'a> for SqlValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> DecodeResult<Self> {
        match ty.kind() {
            Kind::Array(_) => {
                let items = Vec::<Option<SqlValue>>::from_sql(ty, raw)?;
                let items = items.into_iter().map(|v| v.map_or(Value::Null, Self::into_json));
                return Ok(Self(Value::Array(items.collect())));
            }
            Kind::Enum(_) => return Ok(Self(Value::String(std::str::from_utf8(raw)?.to_string()))),
            _ => {}
        }

        let value = match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::CHAR => Value::String(char::from(i8::from_sql(ty, raw)?.to_ne_bytes()[0]).to_string()),

            Type::INT2 => Value::from(i16::from_sql(ty, raw)?),
            Type::INT4 => Value::from(i32::from_sql(ty, raw)?),
            Type::INT8 => Value::from(i64::from_sql(ty, raw)?),
            Type::OID => Value::from(u32::from_sql(ty, raw)?),

            Type::FLOAT4 => float(f64::from(f32::from_sql(ty, raw)?)),
            Type::FLOAT8 => float(f64::from_sql(ty, raw)?),
            Type::NUMERIC => Value::String(decode_numeric(raw)?),
            Type::MONEY => Value::String(format_money(i64::from_sql(&Type::INT8, raw)?)),

            Type::JSON | Type::JSONB => Value::from_sql(ty, raw)?,
            Type::BYTEA => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(<&[u8]>::from_sql(ty, raw)?))
            }

            Type::TIMESTAMP => Value::String(
                chrono::NaiveDateTime::from_sql(ty, raw)?.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            ),
            Type::TIMESTAMPTZ => {
                Value::String(chrono::DateTime::<chrono::Utc>::from_sql(ty, raw)?.to_rfc3339())
            }
            Type::DATE => Value::String(chrono::NaiveDate::from_sql(ty, raw)?.format("%Y-%m-%d").to_string()),
            Type::TIME => Value::String(chrono::NaiveTime::from_sql(ty, raw)?.format("%H:%M:%S%.f").to_string()),
            Type::TIMETZ => Value::String(decode_timetz(raw)?),
            Type::INTERVAL => Value::String(decode_interval(raw)?),

            Type::INET | Type::CIDR => Value::String(decode_inet(raw)?),
            Type::MACADDR => Value::String(decode_macaddr(raw)?),

            Type::UUID => Value::String(uuid::Uuid::from_sql(ty, raw)?.to_string()),
            Type::XML => Value::String(std::str::from_utf8(raw)?.to_string()),

            _ => Value::String(String::from_sql(ty, raw)?),
        };

        Ok(Self(value))
    }

    fn accepts(ty: &Type) -> bool {
        match ty.kind() {
            Kind::Array(member) => Self::accepts(member),
            Kind::Enum(_) => true,
            _ => {
                matches!(
                    *ty,
                    Type::BOOL
                        | Type::CHAR
                        | Type::INT2
                        | Type::INT4
                        | Type::INT8
                        | Type::OID
                        | Type::FLOAT4
                        | Type::FLOAT8
                        | Type::NUMERIC
                        | Type::MONEY
                        | Type::JSON
                        | Type::JSONB
                        | Type::BYTEA
                        | Type::TIMESTAMP
                        | Type::TIMESTAMPTZ
                        | Type::DATE
                        | Type::TIME
                        | Type::TIMETZ
                        | Type::INTERVAL
                        | Type::INET
                        | Type::CIDR
                        | Type::MACADDR
                        | Type::UUID
                        | Type::XML
                ) || <&str as FromSql>::accepts(ty)
            }
        }
    }
}

/// NaN and infinities have no JSON number form
fn float(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

/// Split `N` bytes off the front of `raw`
fn take<const N: usize>(raw: &mut &[u8]) -> DecodeResult<[u8; N]> {
    if raw.len() < N {
        return Err("invalid buffer size".into());
    }
    let (head, rest) = raw.split_at(N);
    *raw = rest;
    Ok(head.try_into()?)
}

/// Base-10000 digits with a weight and display scale
fn decode_numeric(mut raw: &[u8]) -> DecodeResult<String> {
    let ndigits = i16::from_be_bytes(take(&mut raw)?);
    let weight = i32::from(i16::from_be_bytes(take(&mut raw)?));
    let sign = u16::from_be_bytes(take(&mut raw)?);
    let dscale = usize::from(u16::from_be_bytes(take(&mut raw)?));

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        NUMERIC_POS | NUMERIC_NEG => {}
        _ => return Err("invalid numeric sign".into()),
    }

    let ndigits = usize::try_from(ndigits)?;
    let mut digits = Vec::with_capacity(ndigits);
    for _ in 0..ndigits {
        let digit = i16::from_be_bytes(take(&mut raw)?);
        if !(0..10_000).contains(&digit) {
            return Err("invalid numeric digit".into());
        }
        digits.push(digit);
    }
    let digit = |i: i32| usize::try_from(i).ok().and_then(|i| digits.get(i)).copied().unwrap_or(0);

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }

    if weight < 0 {
        out.push('0');
    } else {
        write!(out, "{}", digit(0))?;
        for i in 1..=weight {
            write!(out, "{:04}", digit(i))?;
        }
    }

    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut i = weight + 1;
        while fraction.len() < dscale {
            write!(fraction, "{:04}", digit(i))?;
            i += 1;
        }
        fraction.truncate(dscale);
        out.push('.');
        out.push_str(&fraction);
    }

    Ok(out)
}

/// Cents rendered in the default `C` monetary locale
fn format_money(cents: i64) -> String {
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if cents < 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", abs % 100)
}

/// `HH:MM:SS` with trailing-zero-trimmed microseconds
fn write_clock(out: &mut String, micros: u64) -> std::fmt::Result {
    let hours = micros / (3_600 * MICROS_PER_SECOND);
    let minutes = micros / (60 * MICROS_PER_SECOND) % 60;
    let seconds = micros / MICROS_PER_SECOND % 60;
    let fraction = micros % MICROS_PER_SECOND;

    write!(out, "{hours:02}:{minutes:02}:{seconds:02}")?;
    if fraction != 0 {
        let digits = format!("{fraction:06}");
        write!(out, ".{}", digits.trim_end_matches('0'))?;
    }
    Ok(())
}

/// Microseconds, days and months in the `postgres` interval style
fn decode_interval(mut raw: &[u8]) -> DecodeResult<String> {
    let micros = i64::from_be_bytes(take(&mut raw)?);
    let days = i32::from_be_bytes(take(&mut raw)?);
    let months = i32::from_be_bytes(take(&mut raw)?);

    let mut out = String::new();
    let mut is_zero = true;
    let mut is_before = false;

    for (value, unit) in [(months / 12, "year"), (months % 12, "mon"), (days, "day")] {
        if value == 0 {
            continue;
        }
        let sep = if is_zero { "" } else { " " };
        let plus = if is_before && value > 0 { "+" } else { "" };
        let plural = if value == 1 { "" } else { "s" };
        write!(out, "{sep}{plus}{value} {unit}{plural}")?;
        is_before = value < 0;
        is_zero = false;
    }

    if is_zero || micros != 0 {
        if !is_zero {
            out.push(' ');
        }
        if micros < 0 {
            out.push('-');
        } else if is_before {
            out.push('+');
        }
        write_clock(&mut out, micros.unsigned_abs())?;
    }

    Ok(out)
}

/// Time of day plus a zone offset stored as seconds west of UTC
fn decode_timetz(mut raw: &[u8]) -> DecodeResult<String> {
    let micros = i64::from_be_bytes(take(&mut raw)?);
    let zone_west = i32::from_be_bytes(take(&mut raw)?);

    let mut out = String::new();
    write_clock(&mut out, u64::try_from(micros)?)?;

    let offset = -i64::from(zone_west);
    let abs = offset.unsigned_abs();
    out.push(if offset < 0 { '-' } else { '+' });
    write!(out, "{:02}", abs / 3_600)?;
    if abs % 3_600 != 0 {
        write!(out, ":{:02}", abs / 60 % 60)?;
    }
    if abs % 60 != 0 {
        write!(out, ":{:02}", abs % 60)?;
    }

    Ok(out)
}

/// Family, prefix bits, cidr flag, address length, address bytes
fn decode_inet(mut raw: &[u8]) -> DecodeResult<String> {
    let [family, bits, is_cidr, len] = take::<4>(&mut raw)?;

    let (addr, max_bits) = match (family, len) {
        (PGSQL_AF_INET, 4) => (IpAddr::from(take::<4>(&mut raw)?), 32),
        (PGSQL_AF_INET6, 16) => (IpAddr::from(take::<16>(&mut raw)?), 128),
        _ => return Err("invalid inet address".into()),
    };

    if is_cidr != 0 || bits != max_bits {
        Ok(format!("{addr}/{bits}"))
    } else {
        Ok(addr.to_string())
    }
}

fn decode_macaddr(mut raw: &[u8]) -> DecodeResult<String> {
    let bytes = take::<6>(&mut raw)?;
    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(":"))
}
