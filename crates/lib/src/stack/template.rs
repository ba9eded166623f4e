//! Synthesized stack templates.
//!
//! A template is the declarative output of one joined scope. It contains
//! every resource the factories declared, keyed by logical id, plus named
//! outputs.
//!
//! # Logical ids
//!
//! Resources are declared under a construct path such as `Api` or
//! `Api/Default/news/ANY`. A single-segment path is used as-is; nested paths
//! concatenate their alphanumeric segments and append an 8-character hash of
//! the full path, so `Api/Default/news/ANY` and `Api/Defaultnews/ANY` never
//! collide.
//!
//! # Example
//!
//! ```json
//! {
//!   "Resources": {
//!     "Role": { "Type": "AWS::IAM::Role", "Properties": { ... } },
//!     "ApiDefaultnewsD4A1B2C3": { "Type": "AWS::ApiGateway::Resource", ... }
//!   },
//!   "Outputs": {
//!     "ApiEndpoint": { "Value": { "Fn::GetAtt": ["Api", "RootResourceId"] } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::util::hash::{Hashable, short_hash};

/// Errors raised while declaring resources into a template.
#[derive(Debug, Error)]
pub enum TemplateError {
  #[error("logical id '{0}' is already declared")]
  DuplicateLogicalId(String),

  #[error("output '{0}' is already declared")]
  DuplicateOutput(String),

  #[error("construct path must not be empty")]
  EmptyPath,

  #[error("no resource with logical id '{0}'")]
  UnknownResource(String),

  #[error("failed to serialize template: {0}")]
  Serialize(#[from] serde_json::Error),
}

/// One declared resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDef {
  #[serde(rename = "Type")]
  pub kind: String,

  #[serde(rename = "Properties")]
  pub properties: Value,

  #[serde(rename = "DependsOn", default, skip_serializing_if = "Vec::is_empty")]
  pub depends_on: Vec<String>,
}

/// One named stack output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDef {
  #[serde(rename = "Value")]
  pub value: Value,

  #[serde(rename = "Export", default, skip_serializing_if = "Option::is_none")]
  pub export: Option<Value>,
}

/// Handle to a declared resource, used to reference it from other resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
  pub logical_id: String,
  pub kind: String,
}

impl ResourceRef {
  /// `{"Ref": logical_id}`
  pub fn reference(&self) -> Value {
    json!({ "Ref": self.logical_id })
  }

  /// `{"Fn::GetAtt": [logical_id, attribute]}`
  pub fn attribute(&self, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [self.logical_id, attribute] })
  }
}

/// The synthesized content of one stack.
///
/// Uses [`BTreeMap`] so serialization, and therefore the template hash, is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
  #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  #[serde(rename = "Resources", default)]
  pub resources: BTreeMap<String, ResourceDef>,

  #[serde(rename = "Outputs", default, skip_serializing_if = "BTreeMap::is_empty")]
  pub outputs: BTreeMap<String, OutputDef>,
}

impl Hashable for Template {}

impl Template {
  /// Declare a resource at `path`.
  pub fn add_resource(&mut self, path: &str, kind: &str, properties: Value) -> Result<ResourceRef, TemplateError> {
    let logical_id = logical_id(path)?;
    if self.resources.contains_key(&logical_id) {
      return Err(TemplateError::DuplicateLogicalId(logical_id));
    }

    self.resources.insert(
      logical_id.clone(),
      ResourceDef {
        kind: kind.to_string(),
        properties,
        depends_on: Vec::new(),
      },
    );

    Ok(ResourceRef {
      logical_id,
      kind: kind.to_string(),
    })
  }

  /// Make `dependent` wait for `dependency` at deployment time.
  pub fn add_dependency(&mut self, dependent: &ResourceRef, dependency: &ResourceRef) -> Result<(), TemplateError> {
    if !self.resources.contains_key(&dependency.logical_id) {
      return Err(TemplateError::UnknownResource(dependency.logical_id.clone()));
    }
    let resource = self
      .resources
      .get_mut(&dependent.logical_id)
      .ok_or_else(|| TemplateError::UnknownResource(dependent.logical_id.clone()))?;

    if !resource.depends_on.contains(&dependency.logical_id) {
      resource.depends_on.push(dependency.logical_id.clone());
      resource.depends_on.sort();
    }
    Ok(())
  }

  pub fn add_output(&mut self, name: &str, value: Value) -> Result<(), TemplateError> {
    if self.outputs.contains_key(name) {
      return Err(TemplateError::DuplicateOutput(name.to_string()));
    }
    self.outputs.insert(name.to_string(), OutputDef { value, export: None });
    Ok(())
  }

  /// Declare an output that other stacks can import under `export_name`.
  pub fn add_export(&mut self, name: &str, value: Value, export_name: &str) -> Result<(), TemplateError> {
    self.add_output(name, value)?;
    if let Some(output) = self.outputs.get_mut(name) {
      output.export = Some(json!({ "Name": export_name }));
    }
    Ok(())
  }

  pub fn resource(&self, logical_id: &str) -> Option<&ResourceDef> {
    self.resources.get(logical_id)
  }

  /// Resources of a given type, in logical id order.
  pub fn resources_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = (&'a str, &'a ResourceDef)> + 'a {
    self
      .resources
      .iter()
      .filter(move |(_, def)| def.kind == kind)
      .map(|(id, def)| (id.as_str(), def))
  }

  pub fn len(&self) -> usize {
    self.resources.len()
  }

  pub fn is_empty(&self) -> bool {
    self.resources.is_empty()
  }

  pub fn to_json(&self) -> Result<String, TemplateError> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}

/// Logical id for a construct path.
pub fn logical_id(path: &str) -> Result<String, TemplateError> {
  let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
  if segments.is_empty() {
    return Err(TemplateError::EmptyPath);
  }

  let readable: String = segments
    .iter()
    .flat_map(|segment| segment.chars())
    .filter(|c| c.is_ascii_alphanumeric())
    .collect();

  if segments.len() == 1 && readable == segments[0] {
    return Ok(readable);
  }

  Ok(format!("{}{}", readable, short_hash(&segments.join("/"))))
}
