//! List and info command integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

#[test]
fn list_writes_nothing() {
  let env = TestEnv::new();

  env
    .purestack_cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("example-common"));

  assert!(!env.out_path().exists());
}

#[test]
fn list_json_reports_resources() {
  let env = TestEnv::new();

  let assert = env.purestack_cmd().args(["list", "-o", "json", "-c", "vsn=beta"]).assert().success();
  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
  let stacks: Value = serde_json::from_str(&stdout).unwrap();

  let stacks = stacks.as_array().unwrap();
  assert_eq!(stacks.len(), 2);
  assert_eq!(stacks[1]["name"], "example-beta");
  assert!(stacks[1]["resources"].as_u64().unwrap() > stacks[0]["resources"].as_u64().unwrap());
  assert_eq!(stacks[0]["outputs"], serde_json::json!(["CertificateArn"]));
}

#[test]
fn list_verbose_shows_resource_types() {
  let env = TestEnv::new();

  env
    .purestack_cmd()
    .args(["list", "--verbose"])
    .assert()
    .success()
    .stdout(predicate::str::contains("AWS::Lambda::Function"))
    .stdout(predicate::str::contains("AWS::Route53::HostedZone"));
}

#[test]
fn info_json_reflects_context() {
  let env = TestEnv::new();

  let assert = env
    .purestack_cmd()
    .args(["info", "-o", "json", "-c", "domain=example.org"])
    .env("PURESTACK_VSN", "v2")
    .assert()
    .success();
  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
  let info: Value = serde_json::from_str(&stdout).unwrap();

  assert_eq!(info["vsn"], "v2");
  assert_eq!(info["domain"], "example.org");
  assert_eq!(info["stacks"], serde_json::json!(["example-common", "example-v2"]));
}
