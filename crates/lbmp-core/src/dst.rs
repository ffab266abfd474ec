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

//! Daylight-saving transition detection
//!
//! NYISO files are published in local wall-clock time. On the spring-forward
//! day the 02:00 hour is missing (23 hours), on the fall-back day the 01:00
//! hour appears twice (25 hours). The resolver only answers *whether* a day is
//! a transition day; compensation happens in the day normalizer.

use chrono::{NaiveDate, Offset, TimeZone};
use chrono_tz::Tz;

/// Spring-forward dates hard-coded by the first NYISO download scripts
pub const LEGACY_SPRING_TOKENS: [&str; 3] = ["20150308", "20160313", "20170312"];

/// Fall-back dates hard-coded by the first NYISO download scripts
pub const LEGACY_FALL_TOKENS: [&str; 2] = ["20151101", "20161106"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DstTransition {
    /// Clocks jump forward, one wall-clock hour is missing
    SpringForward,
    /// Clocks fall back, one wall-clock hour is repeated
    FallBack,
}

#[derive(Debug, Clone)]
pub enum DstRule {
    /// Derive transitions from the zone's UTC offsets. Works for any year.
    TimeZone(Tz),

    /// Exact substring match against fixed date tokens (`YYYYMMDD`).
    ///
    /// Only covers the listed dates; later years need new entries.
    Table {
        spring: Vec<String>,
        fall: Vec<String>,
    },
}

impl DstRule {
    pub fn legacy_table() -> Self {
        Self::Table {
            spring: LEGACY_SPRING_TOKENS.iter().map(|&t| t.to_owned()).collect(),
            fall: LEGACY_FALL_TOKENS.iter().map(|&t| t.to_owned()).collect(),
        }
    }
}

impl Default for DstRule {
    fn default() -> Self {
        Self::TimeZone(chrono_tz::America::New_York)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DstResolver {
    rule: DstRule,
}

impl DstResolver {
    pub fn new(rule: DstRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &DstRule {
        &self.rule
    }

    /// Classify the day named by `identifier` (a URL or archive entry name).
    ///
    /// Only the last path segment is inspected; dates in the host or in
    /// parent directories never count.
    pub fn transition_for(&self, identifier: &str) -> Option<DstTransition> {
        let name = file_name(identifier);
        match &self.rule {
            DstRule::TimeZone(tz) => date_token(name).and_then(|d| offset_transition(*tz, d)),
            DstRule::Table { spring, fall } => {
                if spring.iter().any(|t| name.contains(t.as_str())) {
                    Some(DstTransition::SpringForward)
                } else if fall.iter().any(|t| name.contains(t.as_str())) {
                    Some(DstTransition::FallBack)
                } else {
                    None
                }
            }
        }
    }

    pub fn transition_for_date(&self, date: NaiveDate) -> Option<DstTransition> {
        match &self.rule {
            DstRule::TimeZone(tz) => offset_transition(*tz, date),
            DstRule::Table { .. } => self.transition_for(&date.format("%Y%m%d").to_string()),
        }
    }

    pub fn is_spring_forward(&self, identifier: &str) -> bool {
        self.transition_for(identifier) == Some(DstTransition::SpringForward)
    }

    pub fn is_fall_back(&self, identifier: &str) -> bool {
        self.transition_for(identifier) == Some(DstTransition::FallBack)
    }
}

fn file_name(identifier: &str) -> &str {
    identifier.rsplit('/').next().unwrap_or(identifier)
}

/// First 8-digit run in `identifier` that reads as a `YYYYMMDD` date.
pub fn date_token(identifier: &str) -> Option<NaiveDate> {
    identifier
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| run.len() == 8)
        .find_map(|run| NaiveDate::parse_from_str(run, "%Y%m%d").ok())
}

fn offset_transition(tz: Tz, date: NaiveDate) -> Option<DstTransition> {
    let today = utc_offset_at_day_start(tz, date)?;
    let tomorrow = utc_offset_at_day_start(tz, date.succ_opt()?)?;

    match tomorrow.cmp(&today) {
        std::cmp::Ordering::Greater => Some(DstTransition::SpringForward),
        std::cmp::Ordering::Less => Some(DstTransition::FallBack),
        std::cmp::Ordering::Equal => None,
    }
}

fn utc_offset_at_day_start(tz: Tz, date: NaiveDate) -> Option<i32> {
    // Zones that switch at midnight have no 00:00 on the spring day
    let local = [0, 1]
        .into_iter()
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())?;
    Some(local.offset().fix().local_minus_utc())
}
