//! REST APIs, their custom domains, routes and lambda integrations.

use serde_json::{Value, json};

use crate::pure::{BoxError, Builder, Scope};
use crate::stack::ResourceRef;

use super::declare;
use super::lambda::{Function, permission};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiProps {
  pub domain: String,
  pub subdomain: String,
  pub tls_certificate: Value,
}

impl ApiProps {
  pub fn host(&self) -> String {
    format!("{}.{}", self.subdomain, self.domain)
  }
}

/// A node in an API's route tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResource {
  /// Construct path of this node, used to derive child logical ids.
  pub path: String,
  /// URL path from the API root, `/` for the root itself.
  pub route: String,
  /// Value that identifies this node as a parent.
  pub resource_id: Value,
}

#[derive(Debug, Clone)]
pub struct RestApi {
  pub resource: ResourceRef,
  pub domain_name: ResourceRef,
  pub host: String,
  pub root: ApiResource,
}

/// How a method forwards requests to a function.
#[derive(Debug, Clone, PartialEq)]
pub struct Integration {
  pub uri: Value,
  pub function_arn: Value,
}

impl RestApi {
  /// Add a child path segment under `parent`.
  pub fn add_resource(&self, scope: &mut Scope, parent: &ApiResource, path_part: &str) -> Result<ApiResource, BoxError> {
    let path = format!("{}/{}", parent.path, path_part);
    let resource = declare(
      scope,
      &path,
      "AWS::ApiGateway::Resource",
      json!({
        "ParentId": parent.resource_id,
        "PathPart": path_part,
        "RestApiId": self.resource.reference(),
      }),
    )?;

    let route = if parent.route == "/" {
      format!("/{path_part}")
    } else {
      format!("{}/{}", parent.route, path_part)
    };

    Ok(ApiResource {
      path,
      route,
      resource_id: resource.reference(),
    })
  }

  /// Route `http_method` on `target` to a lambda integration.
  ///
  /// Also grants API Gateway permission to invoke the function.
  pub fn add_method(
    &self,
    scope: &mut Scope,
    target: &ApiResource,
    http_method: &str,
    integration: &Integration,
    function: &Function,
  ) -> Result<ResourceRef, BoxError> {
    let path = format!("{}/{}", target.path, http_method);
    let method = declare(
      scope,
      &path,
      "AWS::ApiGateway::Method",
      json!({
        "HttpMethod": http_method,
        "ResourceId": target.resource_id,
        "RestApiId": self.resource.reference(),
        "AuthorizationType": "NONE",
        "Integration": {
          "Type": "AWS_PROXY",
          "IntegrationHttpMethod": "POST",
          "Uri": integration.uri,
        },
      }),
    )?;

    let source_arn = json!({
      "Fn::Join": ["", [
        "arn:", { "Ref": "AWS::Partition" }, ":execute-api:", { "Ref": "AWS::Region" }, ":",
        { "Ref": "AWS::AccountId" }, ":", self.resource.reference(), "/*/*", target.route
      ]]
    });
    permission(scope, &format!("{path}/Permission"), function, "apigateway.amazonaws.com", source_arn)?;

    Ok(method)
  }

  /// Deploy the API once every method in `methods` exists.
  pub fn deploy(&self, scope: &mut Scope, stage_name: &str, methods: &[ResourceRef]) -> Result<ResourceRef, BoxError> {
    let api_path = &self.resource.logical_id;
    let deployment = declare(
      scope,
      &format!("{api_path}/Deployment"),
      "AWS::ApiGateway::Deployment",
      json!({ "RestApiId": self.resource.reference() }),
    )?;
    for method in methods {
      scope.template_mut().add_dependency(&deployment, method)?;
    }

    let stage = declare(
      scope,
      &format!("{api_path}/Stage"),
      "AWS::ApiGateway::Stage",
      json!({
        "RestApiId": self.resource.reference(),
        "DeploymentId": deployment.reference(),
        "StageName": stage_name,
      }),
    )?;

    declare(
      scope,
      &format!("{api_path}/DomainName/Mapping"),
      "AWS::ApiGateway::BasePathMapping",
      json!({
        "DomainName": self.domain_name.reference(),
        "RestApiId": self.resource.reference(),
        "Stage": stage.reference(),
      }),
    )?;

    Ok(stage)
  }
}

/// REST API served from `subdomain.domain` with the given certificate.
pub fn api(props: ApiProps) -> Builder<RestApi> {
  Builder::named("Api", move |scope, id| {
    let host = props.host();
    let resource = declare(
      scope,
      id,
      "AWS::ApiGateway::RestApi",
      json!({
        "Name": host,
        "EndpointConfiguration": { "Types": ["REGIONAL"] },
      }),
    )?;

    let domain_name = declare(
      scope,
      &format!("{id}/DomainName"),
      "AWS::ApiGateway::DomainName",
      json!({
        "DomainName": host,
        "RegionalCertificateArn": props.tls_certificate,
        "EndpointConfiguration": { "Types": ["REGIONAL"] },
      }),
    )?;

    let root = ApiResource {
      path: format!("{id}/Default"),
      route: "/".to_string(),
      resource_id: resource.attribute("RootResourceId"),
    };

    Ok(RestApi {
      resource,
      domain_name,
      host,
      root,
    })
  })
}

/// Lambda proxy integration for `function`. Declares nothing on its own.
pub fn lambda_integration(function: &Function) -> Result<Integration, BoxError> {
  let arn = function.arn();
  Ok(Integration {
    uri: json!({
      "Fn::Join": ["", [
        "arn:", { "Ref": "AWS::Partition" }, ":apigateway:", { "Ref": "AWS::Region" },
        ":lambda:path/2015-03-31/functions/", arn, "/invocations"
      ]]
    }),
    function_arn: function.arn(),
  })
}
