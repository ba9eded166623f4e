mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use purestack_lib::consts::DEFAULT_OUT_DIR;
use purestack_lib::newsfeed::Request;

use crate::cmd::{cmd_info, cmd_list, cmd_request, cmd_request_event, cmd_synth};
use crate::output::{OutputFormat, print_error};

/// purestack - Lazily composed infrastructure stacks
#[derive(Parser)]
#[command(name = "purestack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Context value as key=value (repeatable), e.g. -c vsn=v2
  #[arg(short = 'c', long = "context", value_name = "KEY=VALUE", global = true)]
  context: Vec<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Synthesize every stack and write the cloud assembly
  Synth {
    /// Output directory for templates and manifest
    #[arg(short = 'd', long, default_value = DEFAULT_OUT_DIR)]
    out: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// List stacks and their resource counts without writing anything
  List {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Serve one request against the news feed locally
  Request {
    /// Request path
    #[arg(default_value = "/news")]
    path: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Accept header, e.g. text/html
    #[arg(short, long)]
    accept: Option<String>,

    /// Read an API gateway proxy event from stdin and print the proxy response
    #[arg(long, conflicts_with_all = ["path", "method", "accept"])]
    event: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show version and resolved configuration
  Info {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(err) = run(cli) {
    print_error(&format!("{err:#}"));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Synth { out, output } => cmd_synth(&cli.context, &out, cli.verbose, output),
    Commands::List { output } => cmd_list(&cli.context, cli.verbose, output),
    Commands::Request { event: true, .. } => cmd_request_event(),
    Commands::Request {
      path,
      method,
      accept,
      output,
      ..
    } => cmd_request(Request { method, path, accept }, cli.verbose, output),
    Commands::Info { output } => cmd_info(&cli.context, output),
  }
}
