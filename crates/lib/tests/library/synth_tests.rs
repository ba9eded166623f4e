use std::fs;

use purestack_lib::app::{COMMON_STACK, synthesize};
use purestack_lib::config::AppConfig;
use purestack_lib::consts::{ENV_DOMAIN, ENV_VSN};
use purestack_lib::stack::Template;
use purestack_lib::synth::AssemblyManifest;
use serial_test::serial;
use tempfile::TempDir;

fn env_config(vsn: &str) -> AppConfig {
  temp_env::with_vars([(ENV_VSN, Some(vsn)), (ENV_DOMAIN, Some("feeds.example.net"))], || {
    AppConfig::from_env().unwrap()
  })
}

#[test]
#[serial]
fn synthesizes_versioned_stack_from_env() {
  let assembly = synthesize(&env_config("v3")).unwrap();

  let stack = assembly.stack("example-v3").expect("versioned stack");
  let (_, api) = stack.template.resources_of("AWS::ApiGateway::RestApi").next().unwrap();
  assert_eq!(api.properties["Name"], "v3.feeds.example.net");

  let common = assembly.stack(COMMON_STACK).unwrap();
  assert_eq!(
    common.template.resource("HostedZone").unwrap().properties["Name"],
    "feeds.example.net"
  );
}

#[test]
#[serial]
fn writes_assembly_to_disk() {
  let temp = TempDir::new().unwrap();
  let out = temp.path().join("purestack.out");

  let manifest = synthesize(&env_config("v1")).unwrap().write(&out).unwrap();
  assert_eq!(manifest.order, [COMMON_STACK, "example-v1"]);

  for entry in manifest.artifacts.values() {
    let content = fs::read_to_string(out.join(&entry.template_file)).unwrap();
    let template: Template = serde_json::from_str(&content).unwrap();
    assert_eq!(template.len(), entry.resources);
  }

  let written: AssemblyManifest =
    serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
  assert_eq!(written, manifest);
}

#[test]
#[serial]
fn resynthesis_is_deterministic() {
  let first = synthesize(&env_config("v1")).unwrap();
  let second = synthesize(&env_config("v1")).unwrap();

  for (a, b) in first.stacks().iter().zip(second.stacks()) {
    assert_eq!(a.hash, b.hash);
    assert_eq!(a.template.to_json().unwrap(), b.template.to_json().unwrap());
  }
}

#[test]
fn context_args_select_version() {
  let config = AppConfig::default().with_context_args(&["vsn=canary"]).unwrap();
  let assembly = synthesize(&config).unwrap();

  assert!(assembly.stack("example-canary").is_some());
  let stack = assembly.stack("example-canary").unwrap();
  assert_eq!(stack.template.outputs["ApiHost"].value, "canary.example.com");
}
