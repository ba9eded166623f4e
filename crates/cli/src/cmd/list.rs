//! Implementation of the `purestack list` command.

use anyhow::{Context, Result};
use serde::Serialize;

use purestack_lib::app::synthesize;

use crate::output::{OutputFormat, print_info, print_json, print_stack, print_stat};

use super::load_config;

#[derive(Serialize)]
struct StackSummary {
  name: String,
  resources: usize,
  outputs: Vec<String>,
  hash: String,
}

/// Synthesize in memory and summarize each stack.
pub fn cmd_list(context: &[String], verbose: bool, output: OutputFormat) -> Result<()> {
  let config = load_config(context)?;
  let assembly = synthesize(&config).context("Synthesis failed")?;

  let summaries: Vec<StackSummary> = assembly
    .stacks()
    .iter()
    .map(|stack| StackSummary {
      name: stack.name.clone(),
      resources: stack.template.len(),
      outputs: stack.template.outputs.keys().cloned().collect(),
      hash: stack.hash.0.clone(),
    })
    .collect();

  if output.is_json() {
    return print_json(&summaries);
  }

  if summaries.is_empty() {
    print_info("No stacks defined.");
    return Ok(());
  }

  for (summary, stack) in summaries.iter().zip(assembly.stacks()) {
    print_stack(&summary.name, summary.resources, &summary.hash);
    if verbose {
      for (logical_id, def) in &stack.template.resources {
        print_stat(logical_id, &def.kind);
      }
      if !summary.outputs.is_empty() {
        print_stat("Outputs", &summary.outputs.join(", "));
      }
    }
  }

  Ok(())
}
