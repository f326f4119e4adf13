//! HTTP API: route table, request pipeline, and request/response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
pub mod pipeline;
