use super::*;

#[test]
fn test_version_names_both_crates() {
    let output = get_version_string();
    assert!(output.starts_with("berth "));
    assert!(output.contains("libberth"));
}

#[test]
fn test_version_contains_version_number() {
    assert!(get_version_string().contains(env!("CARGO_PKG_VERSION")));
}
