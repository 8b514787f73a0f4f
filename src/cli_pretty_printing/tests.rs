use super::*;
use crate::schema::FieldId;

fn field(kind: FieldKind, required: bool) -> FieldSchema {
    FieldSchema {
        id: FieldId::new("mysqld", "log-bin"),
        section: "mysqld".to_string(),
        key: "log-bin".to_string(),
        label: "Binary Log File".to_string(),
        tooltip: "Base name for binary log files.".to_string(),
        kind,
        default: String::new(),
        required,
    }
}

/// Invalid colour strings are rejected rather than clamped
#[test]
fn test_parse_rgb_rejects_out_of_range() {
    assert_eq!(parse_rgb("256,0,0"), None);
    assert_eq!(parse_rgb("a,b,c"), None);
    assert_eq!(parse_rgb(" 1 , 2 , 3 "), Some((1, 2, 3)));
}

#[test]
fn test_coloured_text_keeps_content() {
    assert!(success("done").contains("done"));
    assert!(warning("careful").contains("careful"));
    assert!(error("broken").contains("broken"));
}

#[test]
fn test_disabled_field_line() {
    let line = field_line(
        &field(FieldKind::Text, false),
        &FieldValue::Text("binlog".to_string()),
        false,
    );
    assert!(line.contains("Binary Log File (log-bin)"));
    assert!(line.contains("binlog"));
    assert!(line.ends_with("[disabled]"));
}

#[test]
fn test_required_field_line() {
    let line = field_line(
        &field(FieldKind::Number, true),
        &FieldValue::Number(1),
        true,
    );
    assert!(line.ends_with("[required]"));
}

#[test]
fn test_static_field_line_shows_tooltip() {
    let line = field_line(&field(FieldKind::Static, false), &FieldValue::Static, false);
    assert_eq!(line, "  Base name for binary log files.");
}
