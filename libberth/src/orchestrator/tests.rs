use super::*;
use crate::model::{ImageSelection, Severity};
use crate::resolver::fake::{FakeResolver, descriptor};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

const REGISTRY: &str = "registry.example.com";

fn nginx_resolver() -> FakeResolver {
    FakeResolver::new()
        .with_image("nginx", &["1.25", "latest"])
        .with_image("redis", &["7"])
        .with_descriptor("nginx", "latest", descriptor(&[(80, "TCP")], &["/data"]))
        .with_descriptor("nginx", "1.25", descriptor(&[(8080, "TCP")], &[]))
        .with_descriptor("redis", "7", descriptor(&[(6379, "TCP")], &[]))
}

fn orchestrator(
    resolver: Arc<FakeResolver>,
) -> (ContainerOrchestrator, UnboundedReceiver<FormEvent>) {
    let ctx = EngineContext::new(resolver, Config::default());
    let (tx, rx) = unbounded_channel();
    (ContainerOrchestrator::new(0, ctx, tx), rx)
}

fn drain(rx: &mut UnboundedReceiver<FormEvent>) -> Vec<FormEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn private_saved(password: Password) -> ContainerConfig {
    let mut saved = ContainerConfig::new(0);
    saved.image = ImageSelection {
        name: "app".to_string(),
        registry: RegistryMode::Private(RegistryCredentials::new(REGISTRY, "alice", password)),
        ..ImageSelection::default()
    };
    saved
}

#[tokio::test]
async fn test_selecting_image_applies_declared_defaults() {
    let (mut orch, _rx) = orchestrator(Arc::new(nginx_resolver()));

    let request = orch.select_image(ImageChoice::new("nginx")).unwrap();
    assert_eq!(request.current_tag, "latest");
    assert!(orch.resolve(request).await);

    let ports = orch.ports().ports();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].name, "port-0 1");
    assert_eq!(ports[0].container_port, Some(80));
    assert_eq!(ports[0].protocol.as_ref().unwrap().code, "TCP");
    assert!(!ports[0].is_ingress);

    let volumes = orch.volumes().volumes();
    assert_eq!(volumes.len(), 1);
    assert_eq!(volumes[0].mount_path, "/data");
    assert_eq!(orch.image().tag, "latest");
}

#[tokio::test]
async fn test_last_selection_wins() {
    let resolver = Arc::new(nginx_resolver());
    let (mut orch, _rx) = orchestrator(resolver.clone());

    let first = orch.select_image(ImageChoice::new("nginx")).unwrap();
    let second = orch.select_image(ImageChoice::new("redis")).unwrap();

    let second_tags = second.fetch(resolver.as_ref()).await;
    let first_tags = first.fetch(resolver.as_ref()).await;

    let next = orch.apply_tags(second_tags).unwrap();
    assert!(orch.apply_tags(first_tags).is_none());

    let response = next.fetch(resolver.as_ref()).await;
    assert!(orch.apply_descriptor(response));

    assert_eq!(orch.image().name, "redis");
    assert_eq!(orch.image().tag, "7");
    assert_eq!(orch.ports().ports()[0].container_port, Some(6379));
}

#[tokio::test]
async fn test_stale_descriptor_is_dropped() {
    let resolver = Arc::new(nginx_resolver());
    let (mut orch, _rx) = orchestrator(resolver.clone());

    let request = orch.select_image(ImageChoice::new("nginx")).unwrap();
    let tags = request.fetch(resolver.as_ref()).await;
    let latest = orch.apply_tags(tags).unwrap();
    let pinned = orch.select_tag("1.25").unwrap();

    let late = latest.fetch(resolver.as_ref()).await;
    assert!(!orch.apply_descriptor(late));
    assert!(orch.ports().ports().is_empty());

    let current = pinned.fetch(resolver.as_ref()).await;
    assert!(orch.apply_descriptor(current));
    assert_eq!(orch.ports().ports()[0].container_port, Some(8080));
}

#[tokio::test]
async fn test_tag_change_keeps_customised_ports() {
    let (mut orch, _rx) = orchestrator(Arc::new(nginx_resolver()));

    let request = orch.select_image(ImageChoice::new("nginx")).unwrap();
    orch.resolve(request).await;
    orch.edit_port(0, PortEdit::ServicePort(Some(8000))).unwrap();

    assert!(!orch.resolve_tag("1.25").await.unwrap());
    let ports = orch.ports().ports();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].container_port, Some(80));
    assert_eq!(ports[0].service_port, Some(8000));
}

#[tokio::test]
async fn test_unknown_tag_falls_back_to_latest() {
    let resolver = FakeResolver::new().with_image("busybox", &["1.36", "latest"]);
    let (mut orch, _rx) = orchestrator(Arc::new(resolver));

    let request = orch
        .select_image(ImageChoice::new("busybox").with_tag("does-not-exist"))
        .unwrap();
    orch.resolve(request).await;

    assert_eq!(orch.image().tag, "latest");
    assert_eq!(orch.tags().len(), 2);
}

#[tokio::test]
async fn test_tag_lookup_failure_keeps_current_tag_and_notifies() {
    let (mut orch, mut rx) = orchestrator(Arc::new(FakeResolver::new()));

    let request = orch
        .select_image(ImageChoice::new("ghost").with_tag("v3"))
        .unwrap();
    orch.resolve(request).await;

    assert_eq!(orch.image().tag, "v3");
    let notices: Vec<Notice> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            FormEvent::Notice(n) => Some(n),
            _ => None,
        })
        .collect();
    assert!(!notices.is_empty());
    assert!(notices.iter().all(|n| n.severity == Severity::Info));
    assert!(notices.iter().all(|n| n.container_index == Some(0)));
}

#[tokio::test]
async fn test_private_restore_waits_for_credentials() {
    let resolver = Arc::new(
        FakeResolver::new()
            .with_image("app", &["v1"])
            .accepting("s3cret"),
    );
    let (mut orch, _rx) = orchestrator(resolver.clone());

    let request = orch.restore(private_saved(Password::Plain("s3cret".into())));

    assert!(request.is_none());
    assert_eq!(resolver.calls(), 0);
    assert_eq!(orch.state(), OrchestratorState::Restoring);
    assert!(orch.needs_credential());
    assert_eq!(orch.password_field(), Some(MASKED_PASSWORD));
    assert_eq!(
        orch.registry_mode().credentials().unwrap().password,
        Password::Masked
    );

    let err = orch.select_image(ImageChoice::new("other")).unwrap_err();
    assert!(matches!(err, BerthError::CredentialRequired { .. }));
    assert!(orch.search_images("app").await.is_err());
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_validated_credentials_resume_resolution() {
    let resolver = Arc::new(
        FakeResolver::new()
            .with_image("app", &["v1"])
            .accepting("s3cret"),
    );
    let (mut orch, mut rx) = orchestrator(resolver.clone());
    orch.restore(private_saved(Password::Masked));
    orch.reenter_password();
    assert_eq!(orch.password_field(), Some(""));
    drain(&mut rx);

    let request = orch
        .validate_credentials(REGISTRY, "alice", Password::Plain("s3cret".into()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.image, "app");
    assert_eq!(orch.state(), OrchestratorState::Ready);
    assert!(!orch.needs_credential());
    assert_eq!(orch.password_field(), Some(MASKED_PASSWORD));

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        FormEvent::CredentialValidated { credentials, .. } if credentials.user == "alice"
    )));

    orch.resolve(request).await;
    assert_eq!(orch.image().tag, "v1");
}

#[tokio::test]
async fn test_rejected_credentials_change_nothing() {
    let resolver = Arc::new(FakeResolver::new().accepting("right"));
    let (mut orch, mut rx) = orchestrator(resolver);
    orch.restore(private_saved(Password::Masked));
    drain(&mut rx);

    let err = orch
        .validate_credentials(REGISTRY, "alice", Password::Plain("wrong".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, BerthError::Authentication { .. }));
    assert!(orch.needs_credential());
    assert_eq!(orch.image().name, "app");
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        FormEvent::Notice(n) if n.severity == Severity::Blocking
    ));
}

#[tokio::test]
async fn test_mode_switch_reuses_session_record() {
    let resolver = Arc::new(FakeResolver::new().accepting("s3cret"));
    let (mut orch, _rx) = orchestrator(resolver);
    let requested = RegistryCredentials::new(REGISTRY, "alice", Password::Masked);

    orch.switch_registry_mode(RegistryMode::Private(requested.clone()));
    assert!(orch.needs_credential());
    orch.validate_credentials(REGISTRY, "alice", Password::Plain("s3cret".into()))
        .await
        .unwrap();

    orch.switch_registry_mode(RegistryMode::Public);
    assert!(!orch.needs_credential());
    assert_eq!(orch.password_field(), None);

    orch.switch_registry_mode(RegistryMode::Private(requested));
    assert!(!orch.needs_credential());
    assert_eq!(
        orch.registry_mode().credentials().unwrap().password,
        Password::Plain("s3cret".into())
    );
}

#[tokio::test]
async fn test_mode_switch_clears_selection() {
    let (mut orch, _rx) = orchestrator(Arc::new(nginx_resolver()));
    let request = orch.select_image(ImageChoice::new("nginx")).unwrap();
    orch.resolve(request).await;

    orch.switch_registry_mode(RegistryMode::Public);
    assert_eq!(orch.image().name, "nginx");

    orch.switch_registry_mode(RegistryMode::Private(RegistryCredentials::new(
        REGISTRY,
        "bob",
        Password::Masked,
    )));
    assert!(!orch.image().is_selected());
    assert!(orch.ports().ports().is_empty());
    assert!(orch.volumes().volumes().is_empty());
}

#[tokio::test]
async fn test_validating_new_registry_drops_public_selection() {
    let resolver = nginx_resolver().accepting("s3cret");
    let (mut orch, mut rx) = orchestrator(Arc::new(resolver));
    let request = orch.select_image(ImageChoice::new("nginx")).unwrap();
    orch.resolve(request).await;
    assert_eq!(orch.ports().ports().len(), 1);
    drain(&mut rx);

    let next = orch
        .validate_credentials(REGISTRY, "alice", Password::Plain("s3cret".into()))
        .await
        .unwrap();

    assert!(next.is_none());
    assert!(!orch.image().is_selected());
    assert!(orch.ports().ports().is_empty());
    assert!(orch.volumes().volumes().is_empty());

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        FormEvent::PortsChanged { ports, .. } if ports.is_empty()
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        FormEvent::ConfigChanged(config) if config.ports.is_empty() && config.volumes.is_empty()
    )));
}

#[test]
fn test_repeated_ingress_toggle_emits_nothing() {
    let (mut orch, mut rx) = orchestrator(Arc::new(FakeResolver::new()));
    let port = orch.add_port();
    orch.edit_port(port, PortEdit::ServicePort(Some(8080))).unwrap();
    orch.toggle_ingress(port, true, false).unwrap();
    drain(&mut rx);

    assert!(!orch.toggle_ingress(port, true, false).unwrap());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_port_edits_emit_events() {
    let (mut orch, mut rx) = orchestrator(Arc::new(FakeResolver::new()));

    orch.add_port();
    let events = drain(&mut rx);

    assert!(matches!(
        &events[0],
        FormEvent::PortsChanged { container_index: 0, ports } if ports.len() == 1
    ));
    assert!(matches!(&events[1], FormEvent::ConfigChanged(config) if config.ports.len() == 1));
}

#[test]
fn test_ingress_rejection_emits_warning() {
    let (mut orch, mut rx) = orchestrator(Arc::new(FakeResolver::new()));
    let port = orch.add_port();
    drain(&mut rx);

    let err = orch.toggle_ingress(port, true, false).unwrap_err();

    assert!(matches!(err, BerthError::ServicePortRequired { .. }));
    assert!(orch.ports().ports()[port].service_port_invalid);
    let events = drain(&mut rx);
    assert!(matches!(
        &events[0],
        FormEvent::Notice(n) if n.severity == Severity::Warning
    ));
}

#[test]
fn test_env_import_reports_skipped_lines() {
    let (mut orch, mut rx) = orchestrator(Arc::new(FakeResolver::new()));

    let result = orch.import_env("A;1\nnot a pair\n");

    assert_eq!(result.added, 1);
    assert_eq!(result.skipped, 1);
    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(e, FormEvent::Notice(n) if n.severity == Severity::Info)));
    assert!(events.iter().any(|e| matches!(e, FormEvent::EnvVarsChanged { env_vars, .. } if env_vars.len() == 1)));
}

#[test]
fn test_set_index_restamps_children() {
    let (mut orch, _rx) = orchestrator(Arc::new(FakeResolver::new()));
    orch.add_port();
    orch.add_volume();
    orch.add_env_var("A", "1").unwrap();

    orch.set_index(3);
    let config = orch.config();

    assert_eq!(config.index, 3);
    assert_eq!(config.ports[0].container_index, 3);
    assert_eq!(config.volumes[0].container_index, 3);
    assert_eq!(config.env_vars[0].container_index, 3);
}

#[test]
fn test_validate_requires_image() {
    let (orch, _rx) = orchestrator(Arc::new(FakeResolver::new()));
    assert!(matches!(
        orch.validate().unwrap_err(),
        BerthError::Validation { .. }
    ));
}
