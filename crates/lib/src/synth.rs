//! Synthesis of joined stacks into a cloud assembly on disk.
//!
//! An [`App`] joins each stack into a fresh [`Scope`] as it is added, so a
//! later stack can consume values produced by an earlier one. Once every
//! stack is in, [`App::synth`] freezes them into a [`CloudAssembly`] that can
//! be inspected or written out:
//!
//! ```text
//! purestack.out/
//! ├── manifest.json
//! ├── example-common.template.json
//! └── example-latest.template.json
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Environment;
use crate::consts::{MANIFEST_FILE, TEMPLATE_SUFFIX};
use crate::pure::{Builder, JoinError, JoinStats, Scope, join};
use crate::stack::{Template, TemplateError};
use crate::util::hash::{HashError, Hashable, ObjectHash};

/// Manifest schema version written to `manifest.json`.
pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SynthError {
  #[error("failed to join stack '{stack}'")]
  Join {
    stack: String,
    #[source]
    source: JoinError,
  },

  #[error("stack '{0}' is defined more than once")]
  DuplicateStack(String),

  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error("failed to hash template of stack '{stack}'")]
  Hash {
    stack: String,
    #[source]
    source: HashError,
  },

  #[error("failed to write {path}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// One synthesized stack.
#[derive(Debug, Clone)]
pub struct StackArtifact {
  pub name: String,
  pub environment: Environment,
  pub template: Template,
  pub stats: JoinStats,
  pub hash: ObjectHash,
}

impl StackArtifact {
  pub fn template_file(&self) -> String {
    format!("{}{}", self.name, TEMPLATE_SUFFIX)
  }
}

/// Collects stacks in definition order.
#[derive(Debug, Default)]
pub struct App {
  environment: Environment,
  stacks: Vec<StackArtifact>,
}

impl App {
  pub fn new(environment: Environment) -> Self {
    Self {
      environment,
      stacks: Vec::new(),
    }
  }

  /// Join `top` into a new stack called `name` and return its value.
  pub fn stack<T: Any>(&mut self, name: &str, top: &Builder<T>) -> Result<Rc<T>, SynthError> {
    if self.stacks.iter().any(|stack| stack.name == name) {
      return Err(SynthError::DuplicateStack(name.to_string()));
    }

    let mut scope = Scope::new(name);
    let value = join(&mut scope, top).map_err(|source| SynthError::Join {
      stack: name.to_string(),
      source,
    })?;

    let stats = scope.stats();
    let template = scope.into_template();
    let hash = template.compute_hash().map_err(|source| SynthError::Hash {
      stack: name.to_string(),
      source,
    })?;

    debug!(stack = name, resources = template.len(), hash = %hash, "stack synthesized");
    self.stacks.push(StackArtifact {
      name: name.to_string(),
      environment: self.environment.clone(),
      template,
      stats,
      hash,
    });
    Ok(value)
  }

  pub fn synth(self) -> CloudAssembly {
    CloudAssembly { stacks: self.stacks }
  }
}

/// Manifest entry for one stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEntry {
  pub environment: String,
  pub template_file: String,
  pub resources: usize,
  pub outputs: usize,
  pub hash: ObjectHash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyManifest {
  pub version: u32,
  /// Stack names in the order they were synthesized.
  pub order: Vec<String>,
  pub artifacts: BTreeMap<String, ArtifactEntry>,
}

/// The frozen result of a synthesis.
#[derive(Debug, Clone)]
pub struct CloudAssembly {
  stacks: Vec<StackArtifact>,
}

impl CloudAssembly {
  pub fn stacks(&self) -> &[StackArtifact] {
    &self.stacks
  }

  pub fn stack(&self, name: &str) -> Option<&StackArtifact> {
    self.stacks.iter().find(|stack| stack.name == name)
  }

  pub fn manifest(&self) -> AssemblyManifest {
    let artifacts = self
      .stacks
      .iter()
      .map(|stack| {
        let entry = ArtifactEntry {
          environment: stack.environment.to_string(),
          template_file: stack.template_file(),
          resources: stack.template.len(),
          outputs: stack.template.outputs.len(),
          hash: stack.hash.clone(),
        };
        (stack.name.clone(), entry)
      })
      .collect();

    AssemblyManifest {
      version: MANIFEST_VERSION,
      order: self.stacks.iter().map(|stack| stack.name.clone()).collect(),
      artifacts,
    }
  }

  /// Write every template and the manifest into `dir`, creating it if needed.
  pub fn write(&self, dir: &Path) -> Result<AssemblyManifest, SynthError> {
    fs::create_dir_all(dir).map_err(|source| SynthError::Io {
      path: dir.to_path_buf(),
      source,
    })?;

    for stack in &self.stacks {
      let path = dir.join(stack.template_file());
      write_file(&path, &stack.template.to_json()?)?;
      debug!(stack = %stack.name, path = %path.display(), "wrote template");
    }

    let manifest = self.manifest();
    let json = serde_json::to_string_pretty(&manifest).map_err(TemplateError::from)?;
    write_file(&dir.join(MANIFEST_FILE), &json)?;

    info!(dir = %dir.display(), stacks = self.stacks.len(), "cloud assembly written");
    Ok(manifest)
  }
}

fn write_file(path: &Path, contents: &str) -> Result<(), SynthError> {
  fs::write(path, contents).map_err(|source| SynthError::Io {
    path: path.to_path_buf(),
    source,
  })
}
