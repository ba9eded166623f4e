//! Request command integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

#[test]
fn request_lists_news_as_json() {
  let env = TestEnv::new();

  let assert = env.purestack_cmd().arg("request").assert().success();
  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
  let list: Value = serde_json::from_str(&stdout).unwrap();

  assert_eq!(list.as_array().unwrap().len(), 5);
  assert_eq!(list[1]["id"], "2");
}

#[test]
fn request_item_as_html() {
  let env = TestEnv::new();

  env
    .purestack_cmd()
    .args(["request", "/news/2", "--accept", "text/html"])
    .assert()
    .success()
    .stdout(predicate::str::contains(
      "<h1>2: Sed luctus tortor sit amet eros eleifend cursus.</h1>",
    ));
}

#[test]
fn request_unknown_item_fails() {
  let env = TestEnv::new();

  env
    .purestack_cmd()
    .args(["request", "/news/42"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("returned 404"));
}

#[test]
fn request_answers_proxy_event() {
  let env = TestEnv::new();

  let assert = env
    .purestack_cmd()
    .args(["request", "--event"])
    .write_stdin(r#"{"httpMethod": "GET", "path": "/news/3", "headers": {"Accept": "application/json"}}"#)
    .assert()
    .success();
  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
  let response: Value = serde_json::from_str(&stdout).unwrap();

  assert_eq!(response["statusCode"], 200);
  let item: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
  assert_eq!(item["id"], "3");
}
