//! HTTP API: product operations, routing, and request/response mapping.

pub mod app;
