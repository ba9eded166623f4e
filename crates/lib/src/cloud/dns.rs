//! Hosted zones and TLS certificates.

use serde_json::{Value, json};

use crate::pure::Builder;
use crate::stack::ResourceRef;

use super::declare;

#[derive(Debug, Clone)]
pub struct HostedZone {
  pub domain: String,
  pub resource: ResourceRef,
}

impl HostedZone {
  pub fn zone_id(&self) -> Value {
    self.resource.reference()
  }
}

#[derive(Debug, Clone)]
pub struct Certificate {
  pub domain: String,
  pub resource: ResourceRef,
}

impl Certificate {
  pub fn arn(&self) -> Value {
    self.resource.reference()
  }
}

/// Hosted zone for `domain`.
pub fn hosted_zone(domain: &str) -> Builder<HostedZone> {
  let domain = domain.to_string();
  Builder::named("HostedZone", move |scope, id| {
    let resource = declare(scope, id, "AWS::Route53::HostedZone", json!({ "Name": domain }))?;
    Ok(HostedZone {
      domain: domain.clone(),
      resource,
    })
  })
}

/// DNS-validated certificate for `domain` in `zone`.
pub fn certificate(domain: &str, zone: &HostedZone) -> Builder<Certificate> {
  let domain = domain.to_string();
  let zone = zone.clone();
  Builder::named("Certificate", move |scope, id| {
    let resource = declare(
      scope,
      id,
      "AWS::CertificateManager::Certificate",
      json!({
        "DomainName": domain,
        "ValidationMethod": "DNS",
        "DomainValidationOptions": [
          { "DomainName": domain, "HostedZoneId": zone.zone_id() }
        ],
      }),
    )?;
    scope.template_mut().add_dependency(&resource, &zone.resource)?;
    Ok(Certificate {
      domain: domain.clone(),
      resource,
    })
  })
}
