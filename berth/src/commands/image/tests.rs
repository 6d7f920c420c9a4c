use super::*;
use crate::commands::stub::StubResolver;
use crate::format::{OutputFormat, format_output};

fn image(reference: &str) -> ImageRef {
    reference.parse().unwrap()
}

#[tokio::test]
async fn test_search_maps_rows_and_limits() {
    let list = search(&StubResolver, "nginx", Some(1), None).await.unwrap();

    assert_eq!(list.images.len(), 1);
    assert_eq!(list.images[0].name, "nginx");
    assert_eq!(list.images[0].official, "yes");
}

#[tokio::test]
async fn test_search_shows_namespace() {
    let list = search(&StubResolver, "", None, None).await.unwrap();
    assert_eq!(list.images[1].name, "bitnami/nginx");
}

#[tokio::test]
async fn test_tags_without_notice() {
    let (list, notice) = tags(&StubResolver, &image("nginx"), None).await;

    assert!(notice.is_none());
    let names: Vec<&str> = list.tags.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(names, vec!["1.25", "latest"]);
}

#[tokio::test]
async fn test_tags_fall_back_to_requested_tag() {
    let (list, notice) = tags(&StubResolver, &image("unknown:v2"), None).await;

    assert_eq!(list.tags.len(), 1);
    assert_eq!(list.tags[0].tag, "v2");
    assert!(notice.is_some());
}

#[tokio::test]
async fn test_inspect_reports_declared_defaults() {
    let inspection = inspect(&StubResolver, &image("nginx"), None).await.unwrap();

    assert_eq!(inspection.image, "nginx:latest");
    assert_eq!(
        inspection.ports,
        vec![PortRow {
            port: 80,
            protocol: "tcp".to_string()
        }]
    );
    let pretty = format_output(&inspection, OutputFormat::Pretty).unwrap();
    assert!(pretty.contains("80/tcp"));
    assert!(pretty.contains("/data"));
}

#[tokio::test]
async fn test_inspect_surfaces_errors() {
    assert!(inspect(&StubResolver, &image("ghost"), None).await.is_err());
}

#[test]
fn test_tag_row_shortens_digest() {
    let row = TagRow::from(TagSummary {
        name: "1.25".to_string(),
        digest: Some(
            "sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824".to_string(),
        ),
        last_updated: None,
    });
    assert_eq!(row.digest, "sha256:2cf24dba5fb0");
    assert_eq!(row.updated, "");
}
