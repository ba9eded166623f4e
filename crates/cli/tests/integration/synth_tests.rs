//! Synth command integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

#[test]
fn synth_defaults_to_purestack_out() {
  let env = TestEnv::new();

  env.purestack_cmd().arg("synth").assert().success();

  let manifest = env.read_json("manifest.json");
  assert_eq!(manifest["order"], serde_json::json!(["example-common", "example-latest"]));
  assert!(env.out_path().join("example-common.template.json").exists());
  assert!(env.out_path().join("example-latest.template.json").exists());
}

#[test]
fn context_flag_selects_version_and_domain() {
  let env = TestEnv::new();

  env
    .purestack_cmd()
    .args(["synth", "-c", "vsn=v9", "-c", "domain=feeds.example.net"])
    .assert()
    .success()
    .stdout(predicate::str::contains("example-v9"));

  let template = env.read_json("example-v9.template.json");
  assert_eq!(template["Outputs"]["ApiHost"]["Value"], "v9.feeds.example.net");
}

#[test]
fn env_vars_provide_context() {
  let env = TestEnv::new();

  env
    .purestack_cmd()
    .arg("synth")
    .env("PURESTACK_VSN", "v4")
    .env("CDK_DEFAULT_ACCOUNT", "123456789012")
    .env("CDK_DEFAULT_REGION", "eu-central-1")
    .assert()
    .success();

  let manifest = env.read_json("manifest.json");
  assert_eq!(
    manifest["artifacts"]["example-v4"]["environment"],
    "aws://123456789012/eu-central-1"
  );
}

#[test]
fn context_flag_overrides_env() {
  let env = TestEnv::new();

  env
    .purestack_cmd()
    .args(["synth", "--context", "vsn=v5"])
    .env("PURESTACK_VSN", "v4")
    .assert()
    .success();

  assert!(env.out_path().join("example-v5.template.json").exists());
  assert!(!env.out_path().join("example-v4.template.json").exists());
}

#[test]
fn synth_json_output_is_manifest() {
  let env = TestEnv::new();

  let assert = env.purestack_cmd().args(["synth", "-o", "json"]).assert().success();
  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
  let printed: Value = serde_json::from_str(&stdout).unwrap();

  assert_eq!(printed, env.read_json("manifest.json"));
}

#[test]
fn versioned_template_routes_news() {
  let env = TestEnv::new();
  env.purestack_cmd().arg("synth").assert().success();

  let template = env.read_json("example-latest.template.json");
  let resources = template["Resources"].as_object().unwrap();
  let paths: Vec<&str> = resources
    .values()
    .filter(|r| r["Type"] == "AWS::ApiGateway::Resource")
    .filter_map(|r| r["Properties"]["PathPart"].as_str())
    .collect();

  assert_eq!(paths.len(), 2);
  assert!(paths.contains(&"news"));
  assert!(paths.contains(&"{any+}"));
}

#[test]
fn synth_is_repeatable() {
  let env = TestEnv::new();
  env.purestack_cmd().arg("synth").assert().success();
  let first = env.read_json("manifest.json");

  env.purestack_cmd().arg("synth").assert().success();
  assert_eq!(first, env.read_json("manifest.json"));
}
