use super::env::*;
use chrono::NaiveDate;

fn at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(14, 5, 7)
        .unwrap()
}

#[test]
fn test_parse_line_prefers_semicolon() {
    assert_eq!(
        parse_line("URL;http://a,b"),
        Some(("URL".to_string(), "http://a,b".to_string()))
    );
}

#[test]
fn test_parse_line_falls_back_to_comma() {
    assert_eq!(
        parse_line("MODE,production"),
        Some(("MODE".to_string(), "production".to_string()))
    );
}

#[test]
fn test_parse_line_splits_on_first_delimiter_only() {
    assert_eq!(
        parse_line("JAVA_OPTS;-Xmx1g;-Xms1g"),
        Some(("JAVA_OPTS".to_string(), "-Xmx1g;-Xms1g".to_string()))
    );
}

#[test]
fn test_parse_line_single_column_is_rejected() {
    assert_eq!(parse_line("JUST_A_KEY"), None);
    assert_eq!(parse_line(";value"), None);
}

#[test]
fn test_parse_blob_skips_blank_lines() {
    let (pairs, skipped) = parse_blob("\nA;1\r\nbroken\nB,2\n");

    assert_eq!(
        pairs,
        vec![
            ("A".to_string(), "1".to_string()),
            ("B".to_string(), "2".to_string())
        ]
    );
    assert_eq!(skipped, 1);
}

#[test]
fn test_export_filename() {
    assert_eq!(
        export_filename(1, at()),
        "env-vars-container-1-20240309-140507.csv"
    );
}

#[test]
fn test_import_appends_and_stamps() {
    let mut manager = EnvManager::new(3);
    manager.add_var("EXISTING", "x").unwrap();

    let result = manager.import("A;1\nB;2\nnope\n");

    assert_eq!(result, EnvImport { added: 2, skipped: 1 });
    assert_eq!(manager.vars().len(), 3);
    assert_eq!(manager.vars()[1].key, "A");
    assert!(manager.vars().iter().all(|v| v.container_index == 3));
}

#[test]
fn test_first_line_named_like_a_header_is_imported() {
    let mut source = EnvManager::new(0);
    source.add_var("KEY", "VALUE").unwrap();
    source.add_var("key", "value").unwrap();

    let mut target = EnvManager::new(0);
    let result = target.import(&source.export(at()).contents);

    assert_eq!(result, EnvImport { added: 2, skipped: 0 });
    assert_eq!(target.vars()[0].key, "KEY");
    assert_eq!(target.vars()[0].value, "VALUE");
    assert_eq!(target.vars()[1].key, "key");
}

#[test]
fn test_export_then_import_round_trip() {
    let mut source = EnvManager::new(0);
    source.add_var("DATABASE_URL", "postgres://u:p@db/app?a=1;b=2").unwrap();
    source.add_var("EMPTY", "").unwrap();
    source.add_var("SPACED", "  padded  ").unwrap();
    source.add_var("LIST", "a,b,c").unwrap();

    let export = source.export(at());
    assert_eq!(export.filename, "env-vars-container-0-20240309-140507.csv");

    let mut target = EnvManager::new(0);
    let result = target.import(&export.contents);

    assert_eq!(result.skipped, 0);
    let pairs = |m: &EnvManager| -> Vec<(String, String)> {
        m.vars()
            .iter()
            .map(|v| (v.key.clone(), v.value.clone()))
            .collect()
    };
    assert_eq!(pairs(&target), pairs(&source));
}

#[test]
fn test_invalid_keys_and_values_are_rejected() {
    let mut manager = EnvManager::new(0);
    assert!(manager.add_var("", "x").is_err());
    assert!(manager.add_var("HAS SPACE", "x").is_err());
    assert!(manager.add_var("A=B", "x").is_err());
    assert!(manager.add_var("OK", "two\nlines").is_err());
    assert!(manager.vars().is_empty());
}

#[test]
fn test_edit_and_remove() {
    let mut manager = EnvManager::new(0);
    let i = manager.add_var("A", "1").unwrap();

    manager.edit_var(i, EnvEdit::Key("B".into())).unwrap();
    manager.edit_var(i, EnvEdit::Value("2".into())).unwrap();
    assert_eq!(manager.vars()[0].key, "B");
    assert_eq!(manager.vars()[0].value, "2");

    assert!(manager.edit_var(5, EnvEdit::Value("x".into())).is_err());
    manager.remove_var(i).unwrap();
    assert!(manager.is_empty());
}
