//! Implementation of the `purestack synth` command.
//!
//! Joins every stack of the news-feed service and writes the templates plus a
//! manifest into the output directory.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use purestack_lib::app::synthesize;

use crate::output::{OutputFormat, print_json, print_stack, print_stat, print_success};

use super::load_config;

pub fn cmd_synth(context: &[String], out: &Path, verbose: bool, output: OutputFormat) -> Result<()> {
  let config = load_config(context)?;
  info!(vsn = config.vsn(), domain = config.domain(), "synthesizing");

  let assembly = synthesize(&config).context("Synthesis failed")?;
  let manifest = assembly
    .write(out)
    .with_context(|| format!("Failed to write cloud assembly: {}", out.display()))?;

  if output.is_json() {
    return print_json(&manifest);
  }

  for stack in assembly.stacks() {
    print_stack(&stack.name, stack.template.len(), &stack.hash.0);
    if verbose {
      print_stat("Template", &out.join(stack.template_file()).display().to_string());
      print_stat("Environment", &stack.environment.to_string());
      print_stat("Factories", &stack.stats.factories.to_string());
      print_stat("Effects", &stack.stats.effects.to_string());
      print_stat("Memo hits", &stack.stats.memo_hits.to_string());
    }
  }

  println!();
  print_success(&format!("Synthesized {} stack(s) to {}", assembly.stacks().len(), out.display()));
  Ok(())
}
