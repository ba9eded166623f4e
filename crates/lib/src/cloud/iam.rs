//! IAM roles.

use serde_json::{Value, json};

use crate::pure::Builder;
use crate::stack::ResourceRef;

use super::declare;

#[derive(Debug, Clone, PartialEq)]
pub struct RoleProps {
  /// Service principal allowed to assume the role.
  pub assumed_by: String,
  /// Names of AWS managed policies to attach.
  pub managed_policies: Vec<String>,
}

impl RoleProps {
  /// Role a lambda function runs as, with basic CloudWatch logging.
  pub fn lambda_execution() -> Self {
    Self {
      assumed_by: "lambda.amazonaws.com".to_string(),
      managed_policies: vec!["service-role/AWSLambdaBasicExecutionRole".to_string()],
    }
  }

  fn to_properties(&self) -> Value {
    let policies: Vec<Value> = self
      .managed_policies
      .iter()
      .map(|name| {
        json!({
          "Fn::Join": ["", ["arn:", { "Ref": "AWS::Partition" }, ":iam::aws:policy/", name]]
        })
      })
      .collect();

    json!({
      "AssumeRolePolicyDocument": {
        "Version": "2012-10-17",
        "Statement": [{
          "Action": "sts:AssumeRole",
          "Effect": "Allow",
          "Principal": { "Service": self.assumed_by },
        }],
      },
      "ManagedPolicyArns": policies,
    })
  }
}

#[derive(Debug, Clone)]
pub struct Role {
  pub resource: ResourceRef,
}

impl Role {
  pub fn arn(&self) -> Value {
    self.resource.attribute("Arn")
  }
}

pub fn role(identity: &str, props: RoleProps) -> Builder<Role> {
  Builder::named(identity, move |scope, id| {
    let resource = declare(scope, id, "AWS::IAM::Role", props.to_properties())?;
    Ok(Role { resource })
  })
}
