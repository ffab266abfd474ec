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

//! Rebuilding the line store into `[day, hour, location]` arrays

use crate::error::{LbmpError, ParseError, Result};
use crate::store::read_lines;
use crate::topology::{HOURS_PER_DAY, ZoneTopology};
use ndarray::{Array2, Array3, s};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    used_zones: usize,
}

impl MatrixBuilder {
    pub fn new(topology: &ZoneTopology) -> Self {
        Self {
            used_zones: topology.used_zones(),
        }
    }

    pub fn used_zones(&self) -> usize {
        self.used_zones
    }

    /// Parse one stored line into a `[24, used_zones]` slice.
    ///
    /// Blank tokens (the trailing comma, stray whitespace) do not take a
    /// position. Values past hour 23 are ignored, missing ones stay 0.0.
    pub fn parse_line(&self, line: &str) -> std::result::Result<Array2<f64>, ParseError> {
        let mut slice = Array2::<f64>::zeros((HOURS_PER_DAY, self.used_zones));
        let capacity = HOURS_PER_DAY * self.used_zones;

        let tokens = line.split(',').map(str::trim).filter(|t| !t.is_empty());
        for (position, token) in tokens.enumerate().take(capacity) {
            let value = token.parse::<f64>().map_err(|_| ParseError::InvalidToken {
                position,
                value: token.to_owned(),
            })?;
            slice[[position / self.used_zones, position % self.used_zones]] = value;
        }

        Ok(slice)
    }

    /// Stack parsed lines day-major into a `[days, 24, used_zones]` tensor.
    pub fn build_tensor<S: AsRef<str>>(&self, lines: &[S]) -> Result<Array3<f64>> {
        let mut tensor = Array3::<f64>::zeros((lines.len(), HOURS_PER_DAY, self.used_zones));

        for (day, line) in lines.iter().enumerate() {
            let slice = self
                .parse_line(line.as_ref())
                .map_err(|e| LbmpError::parse(format!("store line {}", day + 1), e))?;
            tensor.slice_mut(s![day, .., ..]).assign(&slice);
        }

        Ok(tensor)
    }

    /// Read the whole line store at `path` and build its tensor
    pub fn read_tensor<P: AsRef<Path>>(&self, path: P) -> Result<Array3<f64>> {
        let lines = read_lines(path.as_ref())?;
        let tensor = self.build_tensor(&lines)?;
        info!(
            "Built tensor {:?} from {}",
            tensor.shape(),
            path.as_ref().display()
        );
        Ok(tensor)
    }
}

/// Write a 2-D matrix as CSV, one row per line
pub fn write_matrix_csv<P: AsRef<Path>>(matrix: &Array2<f64>, path: P) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path.as_ref())
        .map_err(|e| LbmpError::Io(std::io::Error::other(e)))?;

    for row in matrix.rows() {
        writer
            .write_record(row.iter().map(f64::to_string))
            .map_err(|e| LbmpError::Io(std::io::Error::other(e)))?;
    }
    writer.flush()?;
    Ok(())
}
