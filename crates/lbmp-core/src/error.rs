// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Error types for the LBMP pipeline

use thiserror::Error;

/// A single raw record or day that could not be turned into a normalized line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("record {line} has {fields} fields, price column {column} is missing")]
    MissingField {
        line: usize,
        fields: usize,
        column: usize,
    },

    #[error("record {line}: '{value}' is not a price")]
    InvalidPrice { line: usize, value: String },

    /// A stored line holds a non-numeric value at the 0-based `position`
    #[error("stored value {position}: '{value}' is not a price")]
    InvalidToken { position: usize, value: String },

    /// Two records of the same raw hour carry different timestamps, so the
    /// hour-major ordering assumption does not hold for this file.
    #[error("record {line}: timestamp '{found}' breaks hour group started at '{expected}'")]
    Misaligned {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("day produced {actual} values, expected {expected}")]
    IncompleteDay { expected: usize, actual: usize },

    #[error("csv error: {0}")]
    Csv(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Csv(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum LbmpError {
    #[error("config error: {0}")]
    Config(String),

    #[error("fetch failed for {target}: {reason}")]
    Fetch { target: String, reason: String },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("parse error in {unit}: {source}")]
    Parse {
        unit: String,
        #[source]
        source: ParseError,
    },

    #[error("store error: {0}")]
    Io(#[from] std::io::Error),
}

impl LbmpError {
    pub fn parse(unit: impl Into<String>, source: ParseError) -> Self {
        LbmpError::Parse {
            unit: unit.into(),
            source,
        }
    }

    /// Whether the aggregator may skip the failed unit and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LbmpError::Fetch { .. } | LbmpError::Archive(_) | LbmpError::Parse { .. }
        )
    }
}

impl From<zip::result::ZipError> for LbmpError {
    fn from(err: zip::result::ZipError) -> Self {
        LbmpError::Archive(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LbmpError>;
