use super::*;
use std::error::Error;

#[test]
fn test_network_error_display() {
    let err = BerthError::network("request timeout after 30s");

    assert!(matches!(err, BerthError::Network { .. }));
    assert!(err.to_string().contains("timeout"));
}

#[test]
fn test_network_error_keeps_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let err = BerthError::network_with_source("failed to connect", io_err);

    assert!(err.source().is_some());
}

#[test]
fn test_authentication_error_status() {
    let err = BerthError::authentication("invalid username or password", Some(401));

    match err {
        BerthError::Authentication { status_code, .. } => assert_eq!(status_code, Some(401)),
        _ => panic!("Expected Authentication error"),
    }
}

#[test]
fn test_not_found_mentions_resource() {
    let err = BerthError::not_found("volume", "vol-42");

    assert!(err.to_string().contains("volume"));
    assert!(err.to_string().contains("vol-42"));
}

#[test]
fn test_ingress_taken_message() {
    let err = BerthError::IngressTaken {
        conflict: IngressConflict::SameContainer { port: 0 },
    };

    assert_eq!(err.to_string(), "Another port is already set as ingress.");
}

#[test]
fn test_service_port_required_is_distinct_from_ingress_taken() {
    let taken = BerthError::IngressTaken {
        conflict: IngressConflict::OtherContainer,
    };
    let missing = BerthError::ServicePortRequired {
        port: "p1".to_string(),
    };

    assert_ne!(taken.to_string(), missing.to_string());
    assert!(missing.to_string().contains("p1"));
}

#[test]
fn test_out_of_range_message() {
    let err = BerthError::out_of_range("port", 3, 1);

    assert!(err.to_string().contains("port index 3"));
    assert!(err.to_string().contains("length 1"));
}

#[test]
fn test_config_error_with_path() {
    let err = BerthError::config("invalid config file", Some("/etc/berth.yaml"));

    match err {
        BerthError::Config { path, .. } => assert_eq!(path.as_deref(), Some("/etc/berth.yaml")),
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_blocking_classification() {
    assert!(BerthError::authentication("denied", Some(403)).is_blocking());
    assert!(BerthError::credential_required("private registry").is_blocking());
    assert!(
        BerthError::ServicePortRequired {
            port: "web".to_string()
        }
        .is_blocking()
    );
    assert!(!BerthError::network("offline").is_blocking());
    assert!(!BerthError::server("bad gateway", 502).is_blocking());
    assert!(!BerthError::validation("malformed").is_blocking());
}
