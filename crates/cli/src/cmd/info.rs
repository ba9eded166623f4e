use anyhow::Result;
use serde_json::json;

use purestack_lib::app::{COMMON_STACK, versioned_stack_name};

use crate::output::{OutputFormat, print_json, print_stat};

use super::load_config;

pub fn cmd_info(context: &[String], output: OutputFormat) -> Result<()> {
  let config = load_config(context)?;
  let stacks = [COMMON_STACK.to_string(), versioned_stack_name(config.vsn())];

  if output.is_json() {
    return print_json(&json!({
      "version": env!("CARGO_PKG_VERSION"),
      "vsn": config.vsn(),
      "domain": config.domain(),
      "environment": config.environment.to_string(),
      "context": config.context,
      "stacks": stacks,
    }));
  }

  println!("purestack {}", env!("CARGO_PKG_VERSION"));
  println!();
  print_stat("Version label", config.vsn());
  print_stat("Domain", config.domain());
  print_stat("Environment", &config.environment.to_string());
  print_stat("Stacks", &stacks.join(", "));
  for (key, value) in &config.context {
    print_stat(&format!("context.{key}"), value);
  }
  Ok(())
}
