//! # Quillpress API Server Library
//!
//! HTTP surface of the Quillpress blog backend: token issuance plus tag and
//! article CRUD, every response wrapped in the `{code, msg, data}` envelope.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Layered configuration (defaults, `conf/app.ini`, environment)
//! - `error`: Error handling and envelope code mapping
//! - `extractors`: Path and query extractors that reject with the envelope
//! - `middleware`: Token authentication
//! - `response`: Envelope and result codes
//! - `routes`: API route handlers
//! - `telemetry`: Tracing subscriber and daily log files

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod telemetry;
