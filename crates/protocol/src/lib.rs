//! CCM Protocol - Metric point data model
//!
//! This crate provides the record that flows through the metric pipeline:
//! - `Point` - One timestamped measurement (name, tags, meta, fields, time)
//! - `FieldValue` - Typed field value (float, int, uint, bool, string)
//!
//! # Design Principles
//!
//! - **Mutated in place**: The router adds/removes tags and rewrites the
//!   timestamp on the point it received; points are never rebuilt
//! - **Arc-friendly**: After routing a point is wrapped once in `Arc` and
//!   shared by every sink
//! - **Ordered attributes**: Tags, meta and fields are keyed maps ordered by
//!   key, so iteration and line-protocol output are deterministic
//!
//! # Example
//!
//! ```
//! use ccm_protocol::{FieldValue, Point};
//! use chrono::Utc;
//!
//! let mut point = Point::new("ib_recv", Utc::now())
//!     .with_tag("type", "node")
//!     .with_field("value", 120.0);
//!
//! point.add_tag("hot", "true");
//! assert_eq!(point.tag("hot"), Some("true"));
//! assert_eq!(point.field("value"), Some(&FieldValue::Float(120.0)));
//! ```

mod field;
mod line;
mod point;

pub use field::FieldValue;
pub use point::Point;

/// Timestamp type carried by every point
pub type Timestamp = chrono::DateTime<chrono::Utc>;

#[cfg(test)]
mod field_test;
#[cfg(test)]
mod line_test;
