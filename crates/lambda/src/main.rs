//! Function entry point serving the news feed.
//!
//! Built as `target/lambda/newsfeed/bootstrap` for the `provided.al2`
//! runtime, which is the asset the versioned stack deploys.

use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use purestack_lib::newsfeed::{NewsFeed, ProxyResponse};

async fn handle_request(event: LambdaEvent<Value>) -> Result<ProxyResponse, Error> {
  Ok(NewsFeed::fixtures().handle_event(event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .without_time()
    .init();

  info!("news feed function starting");
  lambda_runtime::run(service_fn(handle_request)).await
}
