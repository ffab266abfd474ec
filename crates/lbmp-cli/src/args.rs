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

//! CLI argument definitions using clap.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lbmp")]
#[command(author, version, about = "NYISO zonal LBMP downloader and normalizer")]
#[command(
    long_about = "Downloads NYISO zonal LBMP files, normalizes every day to 24 hourly rows\n\
    (compensating DST transition days) and appends them to a line store.\n\
    \nExamples:\n  \
    lbmp range --start 2016-01-01 --end 2016-04-01     # Bulk months\n  \
    lbmp present --start 2026-09-01 --market RT       # Up to yesterday\n  \
    lbmp tensor --start 2016-03-01 --end 2016-03-15   # Fetch, then print tensor shape\n  \
    lbmp export --day 0 --out day0.csv                # One stored day as CSV"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// TOML config file; built-in NYISO defaults when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Market type, overrides the config file ("RT" or "DA")
    #[arg(short, long, global = true)]
    pub market: Option<String>,

    /// Line store file, overrides the config file
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Base URL of the CSV site, overrides the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Print the collection summary as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect every day in [start, end) into the store
    Range(RangeArgs),

    /// Collect every day from start up to (not including) today
    Present(PresentArgs),

    /// Fetch and append a single day
    Day(DayArgs),

    /// Collect [start, end), then load the whole store as a tensor
    Tensor(TensorArgs),

    /// Write one stored day as a 24-row CSV matrix
    Export(ExportArgs),
}

#[derive(Args)]
pub struct RangeArgs {
    /// First day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day, exclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,
}

#[derive(Args)]
pub struct PresentArgs {
    #[arg(long)]
    pub start: NaiveDate,
}

#[derive(Args)]
pub struct DayArgs {
    #[arg(long)]
    pub date: NaiveDate,
}

#[derive(Args)]
pub struct TensorArgs {
    #[arg(long)]
    pub start: NaiveDate,

    #[arg(long)]
    pub end: NaiveDate,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Zero-based line in the store
    #[arg(long)]
    pub day: usize,

    /// Output CSV path
    #[arg(short, long)]
    pub out: PathBuf,
}
