//! Tests for line-protocol rendering

use chrono::{TimeZone, Utc};

use crate::Point;

#[test]
fn test_render_full_point() {
    let time = Utc.timestamp_opt(1_700_000_000, 5).single().unwrap();
    let point = Point::new("ib_recv", time)
        .with_tag("type", "node")
        .with_tag("host", "n01")
        .with_meta("unit", "bytes")
        .with_field("value", 1.5)
        .with_field("count", 3i64)
        .with_field("ok", true);

    assert_eq!(
        point.to_string(),
        "ib_recv,host=n01,type=node count=3i,ok=true,value=1.5 1700000000000000005"
    );
}

#[test]
fn test_render_escapes_special_characters() {
    let time = Utc.timestamp_opt(0, 0).single().unwrap();
    let point = Point::new("my metric", time)
        .with_tag("a=b", "c,d")
        .with_field("msg", "say \"hi\"");

    assert_eq!(
        point.to_string(),
        r#"my\ metric,a\=b=c\,d msg="say \"hi\"" 0"#
    );
}
