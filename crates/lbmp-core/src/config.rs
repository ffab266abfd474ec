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

use crate::dst::{DstResolver, DstRule, LEGACY_FALL_TOKENS, LEGACY_SPRING_TOKENS};
use crate::error::{LbmpError, Result};
use crate::market::MarketType;
use crate::normalizer::DayNormalizer;
use crate::source::{DEFAULT_BASE_URL, NyisoClient};
use crate::topology::ZoneTopology;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LbmpConfig {
    #[serde(default)]
    pub market: MarketType,

    /// Line store file, one normalized day per line
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub topology: ZoneTopology,

    #[serde(default)]
    pub dst: DstSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout, 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DstRuleKind {
    #[default]
    Timezone,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DstSettings {
    #[serde(default)]
    pub rule: DstRuleKind,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// `YYYYMMDD` tokens, only read by the table rule
    #[serde(default = "default_spring")]
    pub spring: Vec<String>,

    #[serde(default = "default_fall")]
    pub fall: Vec<String>,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/lbmp.txt")
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_timezone() -> String {
    "America/New_York".to_owned()
}

fn default_spring() -> Vec<String> {
    LEGACY_SPRING_TOKENS.iter().map(|&t| t.to_owned()).collect()
}

fn default_fall() -> Vec<String> {
    LEGACY_FALL_TOKENS.iter().map(|&t| t.to_owned()).collect()
}

impl Default for LbmpConfig {
    fn default() -> Self {
        Self {
            market: MarketType::default(),
            store_path: default_store_path(),
            source: SourceSettings::default(),
            topology: ZoneTopology::default(),
            dst: DstSettings::default(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DstSettings {
    fn default() -> Self {
        Self {
            rule: DstRuleKind::default(),
            timezone: default_timezone(),
            spring: default_spring(),
            fall: default_fall(),
        }
    }
}

impl SourceSettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl DstSettings {
    pub fn to_rule(&self) -> Result<DstRule> {
        match self.rule {
            DstRuleKind::Timezone => {
                let tz: Tz = self.timezone.parse().map_err(|e| {
                    LbmpError::Config(format!("dst.timezone '{}': {e}", self.timezone))
                })?;
                Ok(DstRule::TimeZone(tz))
            }
            DstRuleKind::Table => Ok(DstRule::Table {
                spring: self.spring.clone(),
                fall: self.fall.clone(),
            }),
        }
    }
}

impl LbmpConfig {
    pub fn validate(&self) -> Result<()> {
        self.topology.validate()?;
        self.dst.to_rule()?;

        if self.source.base_url.trim().is_empty() {
            return Err(LbmpError::Config("source.base_url must be set".to_owned()));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(LbmpError::Config("store_path must be set".to_owned()));
        }
        if self.dst.rule == DstRuleKind::Table {
            let malformed = self
                .dst
                .spring
                .iter()
                .chain(&self.dst.fall)
                .find(|t| t.len() != 8 || !t.bytes().all(|b| b.is_ascii_digit()));
            if let Some(bad) = malformed {
                return Err(LbmpError::Config(format!(
                    "dst table token '{bad}' is not YYYYMMDD"
                )));
            }
        }
        Ok(())
    }

    pub fn normalizer(&self) -> Result<DayNormalizer> {
        Ok(DayNormalizer::new(
            self.topology.clone(),
            DstResolver::new(self.dst.to_rule()?),
        ))
    }

    pub fn client(&self) -> Result<NyisoClient> {
        NyisoClient::new(self.source.base_url.clone(), self.source.timeout())
    }
}

/// Read, parse and validate a TOML config file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LbmpConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        LbmpError::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    let config: LbmpConfig = toml::from_str(&content)
        .map_err(|e| LbmpError::Config(format!("Failed to parse config TOML: {e}")))?;
    config.validate()?;
    Ok(config)
}
