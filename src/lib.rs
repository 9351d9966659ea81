//! cardgen - Turn an exported backlog into printable index cards.
//!
//! This library provides the pipeline behind the `cardgen` CLI:
//! record extraction from a backlog XML export, card styling and placement,
//! and rendering to a four-cards-per-page PDF.

pub mod cli;
pub mod commands;
pub mod config;
pub mod extract;
pub mod layout;
pub mod models;
pub mod render;
pub mod sys;

/// Library-level error type for cardgen operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// A backlog item is missing something a record cannot be built without.
    #[error("Malformed input in item {item} ({field}): {reason}")]
    MalformedInput {
        /// Zero-based position of the `item` element in the document
        item: usize,
        /// Name of the offending child element
        field: &'static str,
        reason: String,
    },

    /// The renderer rejected a text even after it was escaped.
    #[error("Unrenderable content in card {key}: field '{field}' was rejected after escaping")]
    UnrenderableContent { key: String, field: &'static str },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for cardgen operations.
pub type Result<T> = std::result::Result<T, Error>;
