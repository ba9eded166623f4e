//! Lambda functions and their code assets.

use std::path::PathBuf;
use std::rc::Rc;

use serde_json::{Value, json};

use crate::pure::{BoxError, Builder, Scope};
use crate::stack::ResourceRef;
use crate::util::hash::short_hash;

use super::{declare, sub};
use super::iam::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
  Go1x,
  ProvidedAl2,
}

impl Runtime {
  pub fn as_str(&self) -> &'static str {
    match self {
      Runtime::Go1x => "go1.x",
      Runtime::ProvidedAl2 => "provided.al2",
    }
  }
}

/// Code shipped from a local directory.
///
/// Packaging happens outside this crate; the template only refers to the
/// asset by a key derived from its path.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetCode {
  pub path: PathBuf,
}

impl AssetCode {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn asset_key(&self) -> String {
    format!("assets/{}.zip", short_hash(&self.path.to_string_lossy()).to_lowercase())
  }
}

#[derive(Debug, Clone)]
pub struct FunctionProps {
  pub code: AssetCode,
  pub handler: String,
  pub runtime: Runtime,
  pub log_retention_days: u32,
  pub function_name: Value,
  pub role: Rc<Role>,
}

#[derive(Debug, Clone)]
pub struct Function {
  pub resource: ResourceRef,
  pub log_group: ResourceRef,
}

impl Function {
  pub fn arn(&self) -> Value {
    self.resource.attribute("Arn")
  }
}

/// A function and the log group holding its output.
pub fn function(identity: &str, props: FunctionProps) -> Builder<Function> {
  Builder::named(identity, move |scope, id| {
    let resource = declare(
      scope,
      id,
      "AWS::Lambda::Function",
      json!({
        "Code": {
          "S3Bucket": sub("cdk-assets-${AWS::AccountId}-${AWS::Region}"),
          "S3Key": props.code.asset_key(),
        },
        "Handler": props.handler,
        "Runtime": props.runtime.as_str(),
        "FunctionName": props.function_name,
        "Role": props.role.arn(),
      }),
    )?;
    scope.template_mut().add_dependency(&resource, &props.role.resource)?;

    let log_group = declare(
      scope,
      &format!("{id}/LogGroup"),
      "AWS::Logs::LogGroup",
      json!({
        "LogGroupName": { "Fn::Join": ["", ["/aws/lambda/", { "Ref": resource.logical_id }]] },
        "RetentionInDays": props.log_retention_days,
      }),
    )?;

    Ok(Function { resource, log_group })
  })
}

/// Grant a service principal permission to invoke `function`.
pub fn permission(
  scope: &mut Scope,
  path: &str,
  function: &Function,
  principal: &str,
  source_arn: Value,
) -> Result<ResourceRef, BoxError> {
  declare(
    scope,
    path,
    "AWS::Lambda::Permission",
    json!({
      "Action": "lambda:InvokeFunction",
      "FunctionName": function.arn(),
      "Principal": principal,
      "SourceArn": source_arn,
    }),
  )
}
