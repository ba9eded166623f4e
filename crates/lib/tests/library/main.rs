mod common;
mod engine_tests;
mod newsfeed_tests;
mod synth_tests;
