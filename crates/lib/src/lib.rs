//! purestack-lib: lazy composition of infrastructure resources
//!
//! This crate provides:
//! - `pure`: builders, chaining, context combination, effects and `join`
//! - `stack`: the template a joined scope declares resources into
//! - `cloud`: reusable resource declarations (DNS, IAM, lambda, API gateway)
//! - `app`: the news-feed service stacks
//! - `newsfeed`: the feed the service function serves
//! - `synth`: joining stacks and writing the cloud assembly

pub mod app;
pub mod cloud;
pub mod config;
pub mod consts;
pub mod newsfeed;
pub mod pure;
pub mod stack;
pub mod synth;
pub mod util;
