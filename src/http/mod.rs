//! HTTP transport for the catalog API.

mod client;
mod json;

pub use client::HttpService;
