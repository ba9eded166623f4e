//! Implementation of the `purestack request` command.
//!
//! Serves one request against the news feed the service function ships,
//! either from command-line arguments or as an API gateway proxy event read
//! from stdin.

use std::io::Read;

use anyhow::{Context, Result, bail};

use purestack_lib::newsfeed::{NewsFeed, Request};

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_request(request: Request, verbose: bool, output: OutputFormat) -> Result<()> {
  let response = NewsFeed::fixtures().handle(&request);

  if output.is_json() {
    print_json(&response.to_proxy())?;
  } else {
    if verbose {
      print_stat("Status", &response.status.to_string());
      print_stat("Content-Type", response.content_type);
    }
    println!("{}", response.body);
  }

  if !response.is_success() {
    bail!("{} {} returned {}", request.method, request.path, response.status);
  }
  Ok(())
}

/// Answer a proxy event from stdin with a proxy response on stdout.
pub fn cmd_request_event() -> Result<()> {
  let mut input = String::new();
  std::io::stdin()
    .read_to_string(&mut input)
    .context("Failed to read event from stdin")?;
  let event = serde_json::from_str(&input).context("Event is not valid JSON")?;
  print_json(&NewsFeed::fixtures().handle_event(event))
}
