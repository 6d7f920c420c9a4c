use crate::commands::resolve::{load_application, save_application};
use crate::format;
use chrono::{Local, NaiveDateTime};
use libberth::ContainerConfig;
use libberth::advanced::env::{EnvExport, EnvImport, EnvManager};
use std::path::{Path, PathBuf};

fn find_container(
    containers: &mut [ContainerConfig],
    index: usize,
) -> Result<&mut ContainerConfig, String> {
    containers
        .iter_mut()
        .find(|c| c.index == index)
        .ok_or_else(|| format!("Container {} not found", index))
}

/// Renders one container's variables as a delimited export.
pub(crate) fn export(
    mut containers: Vec<ContainerConfig>,
    index: usize,
    at: NaiveDateTime,
) -> Result<EnvExport, String> {
    let container = find_container(&mut containers, index)?;
    let manager = EnvManager::from_entries(index, std::mem::take(&mut container.env_vars));
    Ok(manager.export(at))
}

/// Appends variables parsed from `text` to one container.
pub(crate) fn import(
    containers: &mut [ContainerConfig],
    index: usize,
    text: &str,
) -> Result<EnvImport, String> {
    let container = find_container(containers, index)?;
    let mut manager = EnvManager::from_entries(index, std::mem::take(&mut container.env_vars));
    let result = manager.import(text);
    container.env_vars = manager.snapshot();
    Ok(result)
}

/// Handle the env export command
pub fn handle_env_export(file: &Path, container: usize, output: Option<&Path>) {
    let saved = load_application(file).unwrap_or_else(|e| format::fail(&e));
    let exported = export(saved, container, Local::now().naive_local())
        .unwrap_or_else(|e| format::fail(&e));

    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&exported.filename));
    if let Err(e) = std::fs::write(&target, &exported.contents) {
        format::fail(&format!("Failed to write {}: {}", target.display(), e));
    }
    format::success(&format!(
        "Exported environment of container {} to {}",
        container,
        target.display()
    ));
}

/// Handle the env import command
pub fn handle_env_import(file: &Path, csv: &Path, container: usize) {
    let mut saved = load_application(file).unwrap_or_else(|e| format::fail(&e));
    let text = std::fs::read_to_string(csv)
        .unwrap_or_else(|e| format::fail(&format!("Failed to read {}: {}", csv.display(), e)));

    let result = import(&mut saved, container, &text).unwrap_or_else(|e| format::fail(&e));
    save_application(file, &saved).unwrap_or_else(|e| format::fail(&e));

    if result.skipped > 0 {
        format::warning(&format!("{} line(s) could not be imported", result.skipped));
    }
    format::success(&format!(
        "Imported {} variable(s) into container {}",
        result.added, container
    ));
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
