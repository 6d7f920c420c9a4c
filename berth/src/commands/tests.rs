use super::*;

#[test]
fn test_public_registry_needs_no_credentials() {
    let args = RegistryArgs::default();
    assert_eq!(args.credentials().unwrap(), None);
}

#[test]
fn test_private_registry_credentials_from_flags() {
    let args = RegistryArgs {
        registry: Some("registry.example.com".to_string()),
        username: Some("ci".to_string()),
        password: Some("token".to_string()),
    };

    let credentials = args.credentials().unwrap().unwrap();

    assert_eq!(credentials.url, "registry.example.com");
    assert_eq!(credentials.user, "ci");
    assert_eq!(credentials.password.secret(), Some("token"));
}

#[test]
fn test_provided_values_skip_prompts() {
    assert_eq!(prompt_username(Some("alice")).unwrap(), "alice");
    assert_eq!(prompt_password(Some("pw")).unwrap(), "pw");
}
