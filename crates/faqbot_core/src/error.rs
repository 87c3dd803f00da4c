use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset must contain 'qtype', 'Question', and 'Answer' columns (missing: {})", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Unsupported attachment: {0}")]
    UnsupportedAttachment(String),

    #[error("OCR backend unavailable: tesseract not found on PATH")]
    OcrUnavailable,

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model service returned {status}: {body}")]
    ModelStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed model reply: {0}")]
    MalformedReply(String),

    #[error("Model '{0}' is not available on the model service")]
    ModelNotFound(String),

    #[error("Invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
