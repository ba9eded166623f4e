//! The news-feed service.
//!
//! Two stacks are synthesized:
//! - `example-common` owns the hosted zone and a wildcard certificate for the
//!   apex domain, and exports the certificate ARN.
//! - `example-<vsn>` runs the feed function behind a REST API served at
//!   `<vsn>.<domain>`, importing the certificate from the common stack.
//!
//! Routes `/news` and `/news/{any+}` both forward every method to the function,
//! which serves the [`newsfeed`](crate::newsfeed).

use std::rc::Rc;

use serde_json::{Value, json};
use tracing::info;

use crate::cloud::dns::{certificate, hosted_zone};
use crate::cloud::gateway::{ApiProps, Integration, RestApi, api, lambda_integration};
use crate::cloud::iam::{RoleProps, role};
use crate::cloud::lambda::{AssetCode, Function, FunctionProps, Runtime, function};
use crate::cloud::stack_name;
use crate::config::AppConfig;
use crate::pure::{Builder, combine, wrap};
use crate::stack::ResourceRef;
use crate::synth::{App, CloudAssembly, SynthError};

pub const COMMON_STACK: &str = "example-common";
pub const STAGE_NAME: &str = "api";
pub const LOG_RETENTION_DAYS: u32 = 5;
/// Packaged feed handler, overridable with `-c code=<dir>`.
const DEFAULT_CODE_PATH: &str = "target/lambda/newsfeed";
const HANDLER: &str = "bootstrap";

pub fn versioned_stack_name(vsn: &str) -> String {
  format!("example-{vsn}")
}

fn certificate_export() -> String {
  format!("{COMMON_STACK}-CertificateArn")
}

/// Zone and wildcard certificate for `domain`.
///
/// Realizes to the value other stacks use to import the certificate ARN.
pub fn common(domain: &str) -> Builder<Value> {
  let wildcard = format!("*.{domain}");
  hosted_zone(domain)
    .chain(move |zone| Ok(certificate(&wildcard, &zone)))
    .effect(|scope, cert| {
      let export = certificate_export();
      scope.template_mut().add_export("CertificateArn", cert.arn(), &export)?;
      Ok(json!({ "Fn::ImportValue": export }))
    })
}

/// API routes wired to the function, before deployment.
#[derive(Debug, Clone)]
pub struct Routes {
  pub api: Rc<RestApi>,
  pub paths: Vec<String>,
  pub methods: Vec<ResourceRef>,
}

/// The deployed service.
#[derive(Debug, Clone)]
pub struct Service {
  pub host: String,
  pub paths: Vec<String>,
  pub stage: ResourceRef,
}

/// Function, API and routes for one version of the feed.
pub fn service(config: &AppConfig, tls_certificate: Value) -> Builder<Service> {
  let code = AssetCode::new(config.try_get_context("code").unwrap_or(DEFAULT_CODE_PATH));
  let func = role("Role", RoleProps::lambda_execution()).chain(move |role| {
    Ok(function(
      "Lambda",
      FunctionProps {
        code: code.clone(),
        handler: HANDLER.to_string(),
        runtime: Runtime::ProvidedAl2,
        log_retention_days: LOG_RETENTION_DAYS,
        function_name: json!({ "Fn::Join": ["-", [stack_name(), "func"]] }),
        role,
      },
    ))
  });

  let restapi = api(ApiProps {
    domain: config.domain().to_string(),
    subdomain: config.vsn().to_string(),
    tls_certificate,
  });

  combine()
    .field("restapi", &restapi)
    .field("func", &func)
    .field("integration", &wrap(lambda_integration)(&func))
    .build()
    .effect(|scope, ctx| {
      let restapi = ctx.get::<RestApi>("restapi")?;
      let func = ctx.get::<Function>("func")?;
      let integration = ctx.get::<Integration>("integration")?;

      let news = restapi.add_resource(scope, &restapi.root, "news")?;
      let any = restapi.add_resource(scope, &news, "{any+}")?;

      let mut methods = Vec::new();
      for target in [&news, &any] {
        methods.push(restapi.add_method(scope, target, "ANY", &integration, &func)?);
      }

      Ok(Routes {
        api: restapi.clone(),
        paths: vec![news.route, any.route],
        methods,
      })
    })
    .effect(|scope, routes| {
      let stage = routes.api.deploy(scope, STAGE_NAME, &routes.methods)?;
      let template = scope.template_mut();
      template.add_output("ApiHost", json!(routes.api.host))?;
      template.add_output(
        "ApiUrl",
        json!(format!("https://{}/", routes.api.host)),
      )?;
      Ok(Service {
        host: routes.api.host.clone(),
        paths: routes.paths.clone(),
        stage,
      })
    })
}

/// Synthesize both stacks for `config`.
pub fn synthesize(config: &AppConfig) -> Result<CloudAssembly, SynthError> {
  let mut app = App::new(config.environment.clone());

  let tls_certificate = app.stack(COMMON_STACK, &common(config.domain()))?;
  let name = versioned_stack_name(config.vsn());
  let service = app.stack(&name, &service(config, (*tls_certificate).clone()))?;

  info!(stack = %name, host = %service.host, routes = service.paths.len(), "service defined");
  Ok(app.synth())
}
