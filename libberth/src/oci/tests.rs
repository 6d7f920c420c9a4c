use super::*;
use serde_json::json;

fn port(container_port: u16, protocol: &str) -> DeclaredPort {
    DeclaredPort {
        container_port,
        protocol: protocol.to_string(),
    }
}

#[test]
fn test_manifest_detected_by_media_type() {
    let manifest = json!({
        "schemaVersion": 2,
        "mediaType": "application/vnd.oci.image.manifest.v1+json",
        "config": {
            "mediaType": "application/vnd.oci.image.config.v1+json",
            "digest": "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            "size": 0
        },
        "layers": []
    });
    let parsed = ManifestOrIndex::from_bytes(manifest.to_string().as_bytes()).unwrap();
    assert!(matches!(parsed, ManifestOrIndex::Manifest(_)));
}

#[test]
fn test_index_selects_requested_platform() {
    let index = json!({
        "schemaVersion": 2,
        "mediaType": "application/vnd.oci.image.index.v1+json",
        "manifests": [
            {
                "mediaType": "application/vnd.oci.image.manifest.v1+json",
                "digest": "sha256:1111111111111111111111111111111111111111111111111111111111111111",
                "size": 100,
                "platform": {"os": "linux", "architecture": "arm64"}
            },
            {
                "mediaType": "application/vnd.oci.image.manifest.v1+json",
                "digest": "sha256:2222222222222222222222222222222222222222222222222222222222222222",
                "size": 100,
                "platform": {"os": "linux", "architecture": "amd64"}
            }
        ]
    });
    let parsed = ManifestOrIndex::from_bytes(index.to_string().as_bytes()).unwrap();
    let chosen = parsed.select_platform("linux", "amd64").unwrap();
    assert!(chosen.digest().to_string().ends_with("2222"));

    let fallback = parsed.select_platform("windows", "amd64").unwrap();
    assert!(fallback.digest().to_string().ends_with("1111"));
}

#[test]
fn test_unrecognised_document_is_rejected() {
    let result = ManifestOrIndex::from_bytes(br#"{"hello": "world"}"#);
    assert!(result.is_err());
}

#[test]
fn test_parse_exposed_ports_map_keeps_declaration_order() {
    let ports = parse_exposed_ports(&json!({"80/tcp": {}, "443/tcp": {}, "53/udp": {}}));
    assert_eq!(ports, vec![port(80, "tcp"), port(443, "tcp"), port(53, "udp")]);
}

#[test]
fn test_parse_exposed_ports_defaults_protocol() {
    let ports = parse_exposed_ports(&json!(["8080"]));
    assert_eq!(ports, vec![port(8080, "tcp")]);
}

#[test]
fn test_parse_exposed_ports_from_string() {
    let ports = parse_exposed_ports(&json!("80/TCP, 9000/udp"));
    assert_eq!(ports, vec![port(80, "tcp"), port(9000, "udp")]);
}

#[test]
fn test_parse_exposed_ports_expands_ranges() {
    let ports = parse_exposed_ports(&json!({"7000-7002/tcp": {}}));
    assert_eq!(ports, vec![port(7000, "tcp"), port(7001, "tcp"), port(7002, "tcp")]);
}

#[test]
fn test_parse_exposed_ports_skips_malformed() {
    let ports = parse_exposed_ports(&json!({
        "abc/tcp": {},
        "99999/tcp": {},
        "0/tcp": {},
        "80/": {},
        "10-1/tcp": {},
        "1-60000/tcp": {},
        "22/tcp": {}
    }));
    assert_eq!(ports, vec![port(22, "tcp")]);
}

#[test]
fn test_parse_exposed_ports_ignores_other_types() {
    assert!(parse_exposed_ports(&json!(42)).is_empty());
    assert!(parse_exposed_ports(&json!(null)).is_empty());
}

#[test]
fn test_parse_volumes_map() {
    let volumes = parse_volumes(&json!({"/data": {}, "/var/log": {}}));
    assert_eq!(volumes, vec!["/data".to_string(), "/var/log".to_string()]);
}

#[test]
fn test_parse_volumes_skips_relative_paths() {
    let volumes = parse_volumes(&json!(["data", "/srv"]));
    assert_eq!(volumes, vec!["/srv".to_string()]);
}

#[test]
fn test_descriptor_from_config() {
    let config = json!({
        "architecture": "amd64",
        "os": "linux",
        "config": {
            "ExposedPorts": {"80/tcp": {}},
            "Volumes": {"/data": {}}
        }
    });
    let descriptor = descriptor_from_config(config.to_string().as_bytes());

    assert_eq!(descriptor.ports, vec![port(80, "tcp")]);
    assert_eq!(descriptor.volumes, vec!["/data".to_string()]);
}

#[test]
fn test_descriptor_from_legacy_container_config() {
    let config = json!({
        "config": {"Env": ["PATH=/usr/bin"]},
        "container_config": {"ExposedPorts": {"6379/tcp": {}}}
    });
    let descriptor = descriptor_from_config(config.to_string().as_bytes());
    assert_eq!(descriptor.ports, vec![port(6379, "tcp")]);
}

#[test]
fn test_descriptor_from_garbage_is_empty() {
    assert!(descriptor_from_config(b"not json").is_empty());
    assert!(descriptor_from_config(b"{}").is_empty());
}
