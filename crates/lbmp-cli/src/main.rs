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

use anyhow::{Context, Result, bail};
use clap::Parser;
use lbmp_core::{
    LbmpConfig, LineStore, MarketType, MatrixBuilder, NyisoClient, RangeAggregator, RangeSummary,
    load_config, write_matrix_csv,
};
use ndarray::{Axis, s};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

mod args;

use args::{Cli, Commands, GlobalArgs};

fn main() -> Result<()> {
    // Respects RUST_LOG
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let cli = Cli::parse();
    let config = resolve_config(&cli.global)?;
    info!(
        "Market {}, store {}, source {}",
        config.market,
        config.store_path.display(),
        config.source.base_url
    );

    match cli.command {
        Commands::Range(args) => {
            let aggregator = aggregator(&config)?;
            let mut store = open_store(&config)?;
            let summary = aggregator.collect_range(args.start, args.end, &mut store)?;
            report(&summary, cli.global.json)?;
        }
        Commands::Present(args) => {
            let aggregator = aggregator(&config)?;
            let mut store = open_store(&config)?;
            let summary = aggregator.collect_to_present(args.start, &mut store)?;
            report(&summary, cli.global.json)?;
        }
        Commands::Day(args) => {
            let aggregator = aggregator(&config)?;
            let mut store = open_store(&config)?;
            aggregator
                .append_day(args.date, &mut store)
                .with_context(|| format!("Failed to append {}", args.date))?;
            info!("Appended {} to {}", args.date, config.store_path.display());
        }
        Commands::Tensor(args) => {
            let aggregator = aggregator(&config)?;
            let tensor = aggregator
                .collect_tensor(
                    config.market.code(),
                    args.start,
                    args.end,
                    &config.store_path,
                )
                .with_context(|| {
                    format!(
                        "Failed to build tensor from {}",
                        config.store_path.display()
                    )
                })?;
            println!("{:?}", tensor.shape());
        }
        Commands::Export(args) => {
            let tensor = MatrixBuilder::new(&config.topology)
                .read_tensor(&config.store_path)
                .with_context(|| format!("Failed to read {}", config.store_path.display()))?;
            let days = tensor.len_of(Axis(0));
            if args.day >= days {
                bail!("Store holds {days} days, day {} does not exist", args.day);
            }
            let slice = tensor.slice(s![args.day, .., ..]).to_owned();
            write_matrix_csv(&slice, &args.out)
                .with_context(|| format!("Failed to write {}", args.out.display()))?;
            info!("Wrote day {} to {}", args.day, args.out.display());
        }
    }

    Ok(())
}

/// Config file (or defaults) with command-line overrides applied
fn resolve_config(global: &GlobalArgs) -> Result<LbmpConfig> {
    let mut config = match &global.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LbmpConfig::default(),
    };

    if let Some(market) = &global.market {
        config.market = market.parse::<MarketType>()?;
    }
    if let Some(store) = &global.store {
        config.store_path.clone_from(store);
    }
    if let Some(base_url) = &global.base_url {
        config.source.base_url.clone_from(base_url);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn aggregator(config: &LbmpConfig) -> Result<RangeAggregator<NyisoClient>> {
    Ok(RangeAggregator::new(
        config.client()?,
        config.normalizer()?,
        config.market,
    ))
}

fn open_store(config: &LbmpConfig) -> Result<LineStore> {
    LineStore::open(&config.store_path)
        .with_context(|| format!("Failed to open store {}", config.store_path.display()))
}

fn report(summary: &RangeSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!(
            "{} days written, {} month fetches, {} day fetches, {} skipped",
            summary.days_written,
            summary.month_fetches,
            summary.day_fetches,
            summary.skipped.len()
        );
        for skipped in &summary.skipped {
            println!("  skipped {}: {}", skipped.unit, skipped.reason);
        }
    }
    Ok(())
}
