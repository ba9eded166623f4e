mod info;
mod list;
mod request;
mod synth;

use anyhow::{Context, Result};

use purestack_lib::config::AppConfig;

pub use info::cmd_info;
pub use list::cmd_list;
pub use request::{cmd_request, cmd_request_event};
pub use synth::cmd_synth;

/// Resolve configuration from the environment and `--context` arguments.
fn load_config(context: &[String]) -> Result<AppConfig> {
  AppConfig::from_env()
    .context("Invalid context in environment")?
    .with_context_args(context)
    .context("Invalid --context argument")
}
