//! Plan schema - the YAML document handed to the host executor
//!
//! # Example YAML
//!
//! ```yaml
//! name: RKE2 Kairos Cluster Provider
//! stages:
//!   boot.before:
//!   - name: Enable Systemd Services
//!     commands:
//!     - systemctl enable rke2-server
//!     - systemctl restart rke2-server
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;

/// A file the executor writes verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileWrite {
    /// Absolute destination path
    pub path: String,
    /// Unix permission bits, rendered as a plain integer (0o400 is 256)
    pub permissions: u32,
    /// File content
    pub content: String,
}

impl FileWrite {
    pub fn new(path: impl Into<String>, permissions: u32, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            permissions,
            content: content.into(),
        }
    }
}

/// An ordered unit of provisioning work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Stage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileWrite>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,

    /// Shell condition; the stage is skipped when it fails
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
}

impl Stage {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, file: FileWrite) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_files(mut self, files: impl IntoIterator<Item = FileWrite>) -> Self {
        self.files.extend(files);
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn guarded_by(mut self, condition: impl Into<String>) -> Self {
        self.guard = Some(condition.into());
        self
    }
}

/// The complete set of stages produced for one node, grouped by phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProvisioningPlan {
    pub name: String,

    /// Phase name -> stages, in execution order within the phase
    #[serde(default)]
    pub stages: BTreeMap<String, Vec<Stage>>,
}

impl ProvisioningPlan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: BTreeMap::new(),
        }
    }

    /// Append a stage to the end of `phase`.
    pub fn push_stage(&mut self, phase: &str, stage: Stage) {
        self.stages.entry(phase.to_string()).or_default().push(stage);
    }

    /// Stages of `phase`, empty if the phase is absent.
    pub fn phase(&self, phase: &str) -> &[Stage] {
        self.stages.get(phase).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn files(&self) -> impl Iterator<Item = &FileWrite> {
        self.stages.values().flatten().flat_map(|s| s.files.iter())
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.stages
            .values()
            .flatten()
            .flat_map(|s| s.commands.iter().map(String::as_str))
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }
}
