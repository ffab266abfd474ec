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

//! Fixed reporting-location layout of one grid operator

use crate::error::{LbmpError, Result};
use serde::{Deserialize, Serialize};

/// Hour slots in every normalized day, DST or not
pub const HOURS_PER_DAY: usize = 24;

/// NYISO zonal files list 15 locations per timestamp, alphabetically:
/// CAPITL, CENTRL, DUNWOD, GENESE, H Q, HUD VL, LONGIL, MHK VL, MILLWD,
/// N.Y.C., NORTH, NPX, O H, PJM, WEST.
pub const NYISO_NUM_ZONES: usize = 15;

/// External proxies (H Q, NPX, O H, PJM)
pub const NYISO_SKIP_ZONES: [usize; 4] = [4, 11, 12, 13];

fn default_num_zones() -> usize {
    NYISO_NUM_ZONES
}

fn default_skip_zones() -> Vec<usize> {
    NYISO_SKIP_ZONES.to_vec()
}

/// Immutable description of which raw locations exist and which are kept.
///
/// Every component receives the same topology so the retained-column order is
/// identical for every processed day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneTopology {
    /// Number of location records per hour in the raw files
    #[serde(default = "default_num_zones")]
    pub num_zones: usize,

    /// Raw location indices excluded from the output
    #[serde(default = "default_skip_zones")]
    pub skip_zones: Vec<usize>,
}

impl Default for ZoneTopology {
    fn default() -> Self {
        Self::nyiso()
    }
}

impl ZoneTopology {
    pub fn nyiso() -> Self {
        Self {
            num_zones: NYISO_NUM_ZONES,
            skip_zones: NYISO_SKIP_ZONES.to_vec(),
        }
    }

    pub fn new(num_zones: usize, skip_zones: Vec<usize>) -> Result<Self> {
        let topology = Self {
            num_zones,
            skip_zones,
        };
        topology.validate()?;
        Ok(topology)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_zones == 0 {
            return Err(LbmpError::Config("num_zones must be > 0".to_owned()));
        }
        if let Some(bad) = self.skip_zones.iter().find(|&&z| z >= self.num_zones) {
            return Err(LbmpError::Config(format!(
                "skip zone {bad} out of range (num_zones = {})",
                self.num_zones
            )));
        }
        let used = self.used_zones();
        if used == 0 {
            return Err(LbmpError::Config(
                "topology skips every zone, nothing to keep".to_owned(),
            ));
        }
        // The hour buffer replays one hour of retained values
        if used > HOURS_PER_DAY {
            return Err(LbmpError::Config(format!(
                "{used} retained zones exceed the hour buffer capacity ({HOURS_PER_DAY})"
            )));
        }
        Ok(())
    }

    pub fn is_skipped(&self, location: usize) -> bool {
        self.skip_zones.contains(&location)
    }

    pub fn used_zones(&self) -> usize {
        (0..self.num_zones).filter(|&z| !self.is_skipped(z)).count()
    }

    /// Values per normalized day line
    pub fn values_per_day(&self) -> usize {
        self.used_zones() * HOURS_PER_DAY
    }

    /// Column of a retained raw location in the output, `None` for skipped ones
    pub fn column_of(&self, location: usize) -> Option<usize> {
        if location >= self.num_zones || self.is_skipped(location) {
            return None;
        }
        Some((0..location).filter(|&z| !self.is_skipped(z)).count())
    }
}
