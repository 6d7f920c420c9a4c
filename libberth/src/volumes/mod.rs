//! Volume mounts of one container and the project's existing volumes.

use crate::error::{BerthError, Result};
use crate::model::{ImageDescriptor, VolumeMount, VolumeSource};
use serde::{Deserialize, Serialize};
use tracing::info;


/// A volume that already exists in the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVolume {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size_gb: Option<u32>,
}

/// Existing volumes scoped to one project, supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVolumeCatalogue {
    pub project_id: String,
    #[serde(default)]
    pub volumes: Vec<ProjectVolume>,
}

impl ProjectVolumeCatalogue {
    pub fn new(project_id: impl Into<String>, volumes: Vec<ProjectVolume>) -> Self {
        Self {
            project_id: project_id.into(),
            volumes,
        }
    }

    pub fn find(&self, id: &str) -> Option<&ProjectVolume> {
        self.volumes.iter().find(|v| v.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeListState {
    Empty,
    Populated,
    Editing(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeEdit {
    Name(String),
    /// Must be an absolute path.
    MountPath(String),
    /// Size of an inline volume.
    SizeGb(Option<u32>),
    /// Replaces an attached existing volume with a new inline one.
    Detach,
}

/// Ordered volume mounts of one container.
#[derive(Debug, Clone, Default)]
pub struct VolumeManager {
    container_index: usize,
    volumes: Vec<VolumeMount>,
    editing: Option<usize>,
    defaults_applied_for: Option<String>,
}

impl VolumeManager {
    pub fn new(container_index: usize) -> Self {
        Self {
            container_index,
            ..Self::default()
        }
    }

    pub fn from_entries(container_index: usize, volumes: Vec<VolumeMount>) -> Self {
        let mut manager = Self::new(container_index);
        manager.volumes = volumes;
        manager.set_container_index(container_index);
        manager
    }

    pub fn state(&self) -> VolumeListState {
        match (self.editing, self.volumes.is_empty()) {
            (Some(i), _) => VolumeListState::Editing(i),
            (None, true) => VolumeListState::Empty,
            (None, false) => VolumeListState::Populated,
        }
    }

    pub fn volumes(&self) -> &[VolumeMount] {
        &self.volumes
    }

    pub fn add_volume(&mut self) -> usize {
        let name = default_name(self.container_index, self.volumes.len() + 1);
        self.volumes.push(VolumeMount {
            name,
            mount_path: String::new(),
            source: VolumeSource::default(),
            container_index: self.container_index,
        });
        self.volumes.len() - 1
    }

    pub fn remove_volume(&mut self, index: usize) -> Result<VolumeMount> {
        self.check_index(index)?;
        let removed = self.volumes.remove(index);
        self.editing = match self.editing {
            Some(i) if i == index => None,
            Some(i) if i > index => Some(i - 1),
            other => other,
        };
        Ok(removed)
    }

    pub fn edit_volume(&mut self, index: usize, edit: VolumeEdit) -> Result<()> {
        self.check_index(index)?;
        let volume = &mut self.volumes[index];

        match edit {
            VolumeEdit::Name(name) => volume.name = name,
            VolumeEdit::MountPath(path) => {
                let path = path.trim();
                if !path.starts_with('/') {
                    return Err(BerthError::validation(format!(
                        "Mount path '{}' must be absolute",
                        path
                    )));
                }
                volume.mount_path = path.to_string();
            }
            VolumeEdit::SizeGb(size) => match &mut volume.source {
                VolumeSource::Inline { size_gb } => *size_gb = size,
                VolumeSource::Existing { name, .. } => {
                    return Err(BerthError::validation(format!(
                        "The size of existing volume '{}' cannot be changed here",
                        name
                    )));
                }
            },
            VolumeEdit::Detach => volume.source = VolumeSource::default(),
        }
        Ok(())
    }

    pub fn begin_edit(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.editing = Some(index);
        Ok(())
    }

    pub fn end_edit(&mut self) {
        self.editing = None;
    }

    /// Points the mount at an existing project volume.
    ///
    /// # Errors
    ///
    /// `NotFound` when `volume_id` is not in `catalogue`.
    pub fn attach_existing(
        &mut self,
        index: usize,
        volume_id: &str,
        catalogue: &ProjectVolumeCatalogue,
    ) -> Result<()> {
        self.check_index(index)?;
        let existing = catalogue
            .find(volume_id)
            .ok_or_else(|| BerthError::not_found("volume", volume_id))?;

        self.volumes[index].source = VolumeSource::Existing {
            id: existing.id.clone(),
            name: existing.name.clone(),
        };
        Ok(())
    }

    /// Same guard as [`crate::ports::PortManager::apply_default_ports`].
    pub fn apply_default_volumes(&mut self, selection_key: &str, descriptor: &ImageDescriptor) -> bool {
        if self.defaults_applied_for.as_deref() == Some(selection_key) {
            return false;
        }
        self.defaults_applied_for = Some(selection_key.to_string());

        if !self.volumes.is_empty() || descriptor.volumes.is_empty() {
            return false;
        }

        self.editing = None;
        self.volumes = descriptor
            .volumes
            .iter()
            .enumerate()
            .map(|(n, path)| VolumeMount {
                name: default_name(self.container_index, n + 1),
                mount_path: path.clone(),
                source: VolumeSource::default(),
                container_index: self.container_index,
            })
            .collect();
        info!(
            container = self.container_index,
            count = self.volumes.len(),
            "default volumes applied"
        );
        true
    }

    pub fn clear(&mut self) {
        self.volumes.clear();
        self.editing = None;
        self.defaults_applied_for = None;
    }

    pub fn set_container_index(&mut self, container_index: usize) {
        self.container_index = container_index;
        for volume in &mut self.volumes {
            volume.container_index = container_index;
        }
    }

    pub fn snapshot(&self) -> Vec<VolumeMount> {
        self.volumes.clone()
    }

    pub fn validate(&self) -> Result<()> {
        match self.volumes.iter().find(|v| !v.mount_path.starts_with('/')) {
            Some(volume) => Err(BerthError::validation(format!(
                "Volume '{}' needs an absolute mount path",
                volume.name
            ))),
            None => Ok(()),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.volumes.len() {
            Ok(())
        } else {
            Err(BerthError::out_of_range("volume", index, self.volumes.len()))
        }
    }
}

pub fn default_name(container_index: usize, n: usize) -> String {
    format!("volume-{} {}", container_index, n)
}
