//! Influx line-protocol rendering
//!
//! `Display` for `Point` produces one line-protocol record:
//!
//! ```text
//! measurement[,tag=value...] field=value[,field=value...] unix_nanos
//! ```
//!
//! Meta entries are not part of the record.

use std::fmt::{self, Write};

use crate::field::FieldValue;
use crate::point::Point;

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, self.name(), &[',', ' '])?;

        for (key, value) in self.tags() {
            f.write_char(',')?;
            write_escaped(f, key, &[',', '=', ' '])?;
            f.write_char('=')?;
            write_escaped(f, value, &[',', '=', ' '])?;
        }

        let mut separator = ' ';
        for (key, value) in self.fields() {
            f.write_char(separator)?;
            separator = ',';
            write_escaped(f, key, &[',', '=', ' '])?;
            f.write_char('=')?;
            write_field_value(f, value)?;
        }

        let nanos = self
            .time()
            .timestamp_nanos_opt()
            .unwrap_or_else(|| self.time().timestamp().saturating_mul(1_000_000_000));
        write!(f, " {nanos}")
    }
}

fn write_field_value(f: &mut fmt::Formatter<'_>, value: &FieldValue) -> fmt::Result {
    match value {
        FieldValue::Float(v) => write!(f, "{v}"),
        FieldValue::Int(v) => write!(f, "{v}i"),
        FieldValue::UInt(v) => write!(f, "{v}u"),
        FieldValue::Bool(v) => write!(f, "{v}"),
        FieldValue::String(s) => {
            f.write_char('"')?;
            write_escaped(f, s, &['"', '\\'])?;
            f.write_char('"')
        }
    }
}

/// Write `s`, prefixing every character in `special` with a backslash
fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str, special: &[char]) -> fmt::Result {
    for c in s.chars() {
        if special.contains(&c) {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    Ok(())
}
