#![deny(missing_docs)]

//! Core library for the docinsight document analysis server.

/// Summaries, key points, suggested questions, sentiment, and question answering.
pub mod analysis;
/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Plain-text extraction from PDF, image, Word, and text documents.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Request and outcome metrics helpers.
pub mod metrics;
/// Model backend abstractions and HTTP adapters.
pub mod models;
/// Document service shared by the HTTP and CLI surfaces.
pub mod service;
/// Upload storage and retention.
pub mod uploads;
