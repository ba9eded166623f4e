//! Reusable resource declarations.
//!
//! Each function here returns a [`Builder`](crate::pure::Builder) whose
//! factory declares one or more resources into the scope's template. None of
//! them validate properties; they only shape the template.

pub mod dns;
pub mod gateway;
pub mod iam;
pub mod lambda;

use serde_json::{Value, json};
use tracing::trace;

use crate::pure::{BoxError, Scope};
use crate::stack::ResourceRef;

/// Declare a resource in the scope's template.
pub(crate) fn declare(scope: &mut Scope, path: &str, kind: &str, properties: Value) -> Result<ResourceRef, BoxError> {
  let resource = scope.template_mut().add_resource(path, kind, properties)?;
  trace!(scope = %scope.name(), path, logical_id = %resource.logical_id, kind, "declared resource");
  Ok(resource)
}

/// `{"Ref": "AWS::StackName"}`
pub fn stack_name() -> Value {
  json!({ "Ref": "AWS::StackName" })
}

/// `{"Fn::Sub": template}`
pub fn sub(template: &str) -> Value {
  json!({ "Fn::Sub": template })
}
