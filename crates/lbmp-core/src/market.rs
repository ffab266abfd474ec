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

//! Market type selector (real-time vs day-ahead)

use crate::error::LbmpError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// NYISO publishes separate LBMP datasets for the two settlement markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum MarketType {
    RealTime,
    #[default]
    DayAhead,
}

impl MarketType {
    pub fn code(self) -> &'static str {
        match self {
            Self::RealTime => "RT",
            Self::DayAhead => "DA",
        }
    }

    /// Directory and file-name segment used on the NYISO public site
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::RealTime => "rtlbmp",
            Self::DayAhead => "damlbmp",
        }
    }
}

impl FromStr for MarketType {
    type Err = LbmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RT" => Ok(Self::RealTime),
            "DA" => Ok(Self::DayAhead),
            other => Err(LbmpError::Config(format!(
                "unknown market type '{other}' (must be 'RT' or 'DA')"
            ))),
        }
    }
}

impl TryFrom<String> for MarketType {
    type Error = LbmpError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MarketType> for String {
    fn from(market: MarketType) -> Self {
        market.code().to_owned()
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
