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

//! Fetching raw day files and monthly archives

use crate::error::{LbmpError, Result};
use crate::market::MarketType;
use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "http://mis.nyiso.com/public/csv";

const USER_AGENT: &str = "lbmp/0.1.0";

/// Source of raw LBMP data. One attempt per call, no retries.
pub trait PriceSource {
    /// URL (or other identifier) of a day file; also used for DST detection
    fn day_target(&self, market: MarketType, date: NaiveDate) -> String;

    fn month_target(&self, market: MarketType, month: NaiveDate) -> String;

    /// Decoded CSV text of one day
    fn fetch_day(&self, market: MarketType, date: NaiveDate) -> Result<String>;

    /// Raw zip bytes holding every published day of `month`'s month
    fn fetch_month(&self, market: MarketType, month: NaiveDate) -> Result<Vec<u8>>;
}

/// `{base}/damlbmp/20160313damlbmp_zone.csv`
pub fn day_url(base_url: &str, market: MarketType, date: NaiveDate) -> String {
    let segment = market.path_segment();
    format!(
        "{}/{segment}/{}{segment}_zone.csv",
        base_url.trim_end_matches('/'),
        date.format("%Y%m%d")
    )
}

/// `{base}/damlbmp/20160301damlbmp_zone_csv.zip`
pub fn month_url(base_url: &str, market: MarketType, month: NaiveDate) -> String {
    let segment = market.path_segment();
    format!(
        "{}/{segment}/{:04}{:02}01{segment}_zone_csv.zip",
        base_url.trim_end_matches('/'),
        month.year(),
        month.month()
    )
}

/// HTTP client for the NYISO public CSV site
#[derive(Debug, Clone)]
pub struct NyisoClient {
    base_url: String,
    client: Client,
}

impl NyisoClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| LbmpError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        info!("Downloading NYISO data from: {url}");

        let response = self.client.get(url).send().map_err(|e| LbmpError::Fetch {
            target: url.to_owned(),
            reason: format!("Request failed: {e}"),
        })?;

        if !response.status().is_success() {
            return Err(LbmpError::Fetch {
                target: url.to_owned(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        Ok(response)
    }
}

impl PriceSource for NyisoClient {
    fn day_target(&self, market: MarketType, date: NaiveDate) -> String {
        day_url(&self.base_url, market, date)
    }

    fn month_target(&self, market: MarketType, month: NaiveDate) -> String {
        month_url(&self.base_url, market, month)
    }

    fn fetch_day(&self, market: MarketType, date: NaiveDate) -> Result<String> {
        let url = self.day_target(market, date);
        self.get(&url)?.text().map_err(|e| LbmpError::Fetch {
            target: url,
            reason: format!("Failed to read response: {e}"),
        })
    }

    fn fetch_month(&self, market: MarketType, month: NaiveDate) -> Result<Vec<u8>> {
        let url = self.month_target(market, month);
        let bytes = self.get(&url)?.bytes().map_err(|e| LbmpError::Fetch {
            target: url,
            reason: format!("Failed to read response bytes: {e}"),
        })?;
        Ok(bytes.to_vec())
    }
}
