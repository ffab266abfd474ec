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

pub mod aggregator;
pub mod buffer;
pub mod config;
pub mod dst;
pub mod error;
pub mod filter;
pub mod market;
pub mod matrix;
pub mod normalizer;
pub mod source;
pub mod store;
pub mod topology;

pub use aggregator::{RangeAggregator, RangeSummary, SkippedUnit, nyiso_today};
pub use buffer::SlidingHourBuffer;
pub use config::{DstRuleKind, DstSettings, LbmpConfig, SourceSettings, load_config};
pub use dst::{DstResolver, DstRule, DstTransition};
pub use error::{LbmpError, ParseError, Result};
pub use filter::RecordFilter;
pub use market::MarketType;
pub use matrix::{MatrixBuilder, write_matrix_csv};
pub use normalizer::{DayNormalizer, DayOutcome, MonthNormalizer, NormalizedDayLine};
pub use source::{NyisoClient, PriceSource};
pub use store::{LineStore, read_lines};
pub use topology::{HOURS_PER_DAY, ZoneTopology};
