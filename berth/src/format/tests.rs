use super::*;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
struct TestData {
    name: String,
    value: i32,
}

impl Formattable for TestData {
    fn format_pretty(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }
}

fn data() -> TestData {
    TestData {
        name: "test".to_string(),
        value: 42,
    }
}

#[test]
fn test_output_format_from_string() {
    assert_eq!(OutputFormat::from("pretty"), OutputFormat::Pretty);
    assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
    assert_eq!(OutputFormat::from("yml"), OutputFormat::Yaml);
    assert_eq!(OutputFormat::from("invalid"), OutputFormat::Pretty);
}

#[test]
fn test_format_pretty() {
    assert_eq!(format_output(&data(), OutputFormat::Pretty).unwrap(), "test: 42");
}

#[test]
fn test_format_json() {
    let result = format_output(&data(), OutputFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&result).unwrap();
    assert_eq!(json["name"], "test");
    assert_eq!(json["value"], 42);
}

#[test]
fn test_format_yaml() {
    let result = format_output(&data(), OutputFormat::Yaml).unwrap();
    assert!(result.contains("name: test"));
    assert!(result.contains("value: 42"));
}

#[test]
fn test_notice_text_names_container() {
    let notice = Notice::warning("Ingress is already taken").for_container(2);
    assert_eq!(notice_text(&notice), "[container 2] Ingress is already taken");
    assert_eq!(notice_text(&Notice::info("plain")), "plain");
}
