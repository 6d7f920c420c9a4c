use crate::commands;
use crate::context::AppContext;
use crate::format::{self, Formattable};
use libberth::model::RegistryMode;
use libberth::{
    ApplicationForm, Config, ContainerConfig, EngineContext, FormEvent, Notice, RegistryResolver,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Reads a saved application: a YAML or JSON list of containers.
pub(crate) fn load_application(path: &Path) -> Result<Vec<ContainerConfig>, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    if is_json(path) {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    } else {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }
}

/// Writes the application back in the format of its extension.
pub(crate) fn save_application(path: &Path, containers: &[ContainerConfig]) -> Result<(), String> {
    let contents = if is_json(path) {
        serde_json::to_string_pretty(containers).map_err(|e| e.to_string())?
    } else {
        serde_yaml::to_string(containers).map_err(|e| e.to_string())?
    };
    std::fs::write(path, contents).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Payload of a resolved application plus everything the engine reported.
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub containers: Vec<ContainerConfig>,
    pub notices: Vec<Notice>,
}

impl Formattable for ResolveReport {
    fn format_pretty(&self) -> String {
        let mut output = String::new();
        for container in &self.containers {
            let image = &container.image;
            let registry = match &image.registry {
                RegistryMode::Public => "public".to_string(),
                RegistryMode::Private(credentials) => credentials.url.clone(),
            };
            output.push_str(&format!(
                "Container {}: {}:{} ({})\n",
                container.index, image.name, image.tag, registry
            ));
            for port in &container.ports {
                let protocol = port
                    .protocol
                    .as_ref()
                    .map(|p| p.code.as_str())
                    .unwrap_or("-");
                let port_number = port
                    .container_port
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let ingress = if port.is_ingress { " [ingress]" } else { "" };
                output.push_str(&format!(
                    "  port   {} {}/{}{}\n",
                    port.name, port_number, protocol, ingress
                ));
            }
            for volume in &container.volumes {
                output.push_str(&format!("  volume {} {}\n", volume.name, volume.mount_path));
            }
            for var in &container.env_vars {
                output.push_str(&format!("  env    {}\n", var.key));
            }
        }
        output
    }
}

/// Rehydrates `saved`, resolves every container that can be, and collects
/// the finished payload.
///
/// Private containers are not resolved: their password is masked until the
/// credential is validated again.
pub(crate) async fn resolve_application(
    resolver: Arc<dyn RegistryResolver>,
    config: Config,
    saved: Vec<ContainerConfig>,
) -> Result<ResolveReport, String> {
    let (mut form, mut events) = ApplicationForm::new(EngineContext::new(resolver, config));

    let requests = form.restore(saved);
    form.resolve_all(requests).await;

    let mut notices: Vec<Notice> = form
        .containers()
        .iter()
        .filter(|c| c.needs_credential())
        .map(|c| {
            Notice::warning("Private registry credentials must be re-entered to resolve")
                .for_container(c.index())
        })
        .collect();

    let payload = form.payload();
    while let Ok(event) = events.try_recv() {
        if let FormEvent::Notice(notice) = event {
            notices.push(notice);
        }
    }

    Ok(ResolveReport {
        containers: payload.map_err(|e| e.to_string())?,
        notices,
    })
}

/// Handle the resolve command
pub async fn handle_resolve(ctx: &AppContext, file: &Path) {
    let saved = load_application(file).unwrap_or_else(|e| format::fail(&e));
    let resolver = commands::resolver(ctx).unwrap_or_else(|e| format::fail(&e));

    let spinner = format::spinner(&format!("Resolving {} container(s)...", saved.len()));
    let result = resolve_application(resolver, ctx.config.clone(), saved).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            for notice in &report.notices {
                format::notice(notice);
            }
            format::print_output(&report, ctx.format);
        }
        Err(e) => format::fail(&e),
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
