#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the yaml-readme crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Only a subset of the variants is fatal. Per-file variants ([`Error::Io`],
//! [`Error::Parse`], [`Error::Document`]) are produced by the loader and
//! reported as diagnostics before the file is skipped.

use std::path::{Path, PathBuf};

/// Unified error type returned by the loader, renderer and CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// The metadata glob pattern could not be compiled.
    #[error("invalid metadata pattern {pattern:?}: {source}")]
    Pattern {
        /// Pattern supplied by the caller.
        pattern: String,
        /// Underlying glob syntax error.
        source:  glob::PatternError
    },
    /// Wraps I/O errors that occur while reading metadata files.
    #[error("failed to read file [{path:?}]: {source}")]
    Io {
        /// Location of the metadata file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors for a single metadata file.
    #[error("failed to parse file [{path:?}] as YAML: {source}")]
    Parse {
        /// Location of the metadata file.
        path:   PathBuf,
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when a metadata document is valid YAML but not a mapping.
    #[error("metadata file [{path:?}] is not a mapping: {message}")]
    Document {
        /// Location of the metadata file.
        path:    PathBuf,
        /// Human readable description of the document shape.
        message: String
    },
    /// Template parse or execution failure.
    #[error("failed to render template: {message}")]
    Template {
        /// Message including the full engine cause chain.
        message: String
    },
    /// Wraps serialization errors when building the render context.
    #[error("failed to serialize records: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps I/O errors that occur while writing the rendered document.
    #[error("failed to write rendered output: {source}")]
    Output {
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Service errors when interacting with external APIs.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    }
}

impl Error {
    /// Constructs a template error from a Tera error, flattening its cause
    /// chain into a single message.
    ///
    /// Tera reports the interesting part (unknown function, bad argument,
    /// syntax position) in nested sources, so the chain is joined with `: `.
    pub fn template(error: &tera::Error) -> Self {
        let mut message = error.to_string();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Template {
            message
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<masterror::AppError> for Error {
    fn from(error: masterror::AppError) -> Self {
        Self::Service {
            message: error.to_string()
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the metadata file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::Parse`] variant capturing the failing path and source.
pub fn parse_error(path: &Path, source: serde_yaml::Error) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        source
    }
}
