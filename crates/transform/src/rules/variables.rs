//! Point to expression variables

use ccm_protocol::Point;

use crate::expr::{Value, Variables};

/// Variable holding the point name
pub const NAME_VARIABLE: &str = "name";

/// Variable holding the point timestamp (Unix seconds, fractional)
pub const TIMESTAMP_VARIABLE: &str = "timestamp";

/// Build the flat variable map a condition is evaluated against
///
/// Insertion order is name, tags, meta, fields, timestamp; a later source
/// overwrites an earlier one when keys collide.
pub fn point_variables(point: &Point) -> Variables {
    let mut vars = Variables::with_capacity(
        2 + point.tags().len() + point.meta().len() + point.fields().len(),
    );

    vars.insert(NAME_VARIABLE.to_string(), Value::from(point.name()));

    for (key, value) in point.tags() {
        vars.insert(key.clone(), Value::from(value.as_str()));
    }
    for (key, value) in point.meta() {
        vars.insert(key.clone(), Value::from(value.as_str()));
    }
    for (key, value) in point.fields() {
        vars.insert(key.clone(), Value::from(value));
    }

    let time = point.time();
    let seconds = time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) / 1e9;
    vars.insert(TIMESTAMP_VARIABLE.to_string(), Value::Number(seconds));

    vars
}
