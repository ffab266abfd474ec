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

//! Day and month normalization into fixed 24-hour lines
//!
//! # Raw layout
//!
//! A NYISO zonal file has one header row followed by one row per
//! (hour, zone), hour-major:
//!
//! ```text
//! "Time Stamp","Name","PTID","LBMP ($/MWHr)","Marginal Cost Losses ($/MWHr)","Marginal Cost Congestion ($/MWHr)"
//! "03/13/2016 00:00","CAPITL",61757,23.45,1.02,-3.10
//! "03/13/2016 00:00","CENTRL",61754,19.80,0.33,0.00
//! ...
//! ```
//!
//! Row `i` (after the header) belongs to raw hour `i / num_zones` and raw
//! location `i % num_zones`. The output is always 24 hour slots, so DST days
//! are remapped:
//!
//! - spring-forward (23 raw hours): slot 1 is replayed into slot 2 and raw
//!   hour `h >= 2` lands in slot `h + 1`
//! - fall-back (25 raw hours): raw hour 2 (the repeated 01:00) is dropped and
//!   raw hour `h > 2` lands in slot `h - 1`

use crate::buffer::SlidingHourBuffer;
use crate::dst::{DstResolver, DstTransition, date_token};
use crate::error::{LbmpError, ParseError, Result};
use crate::filter::{RecordFilter, record_timestamp};
use crate::topology::{HOURS_PER_DAY, ZoneTopology};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::io::{Cursor, Read};
use std::ops::Range;
use tracing::{debug, warn};
use zip::ZipArchive;

/// One processed day: `24 * used_zones` price tokens, hour-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDayLine {
    values: Vec<String>,
}

impl NormalizedDayLine {
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Store representation: every value followed by a comma
    pub fn to_line(&self) -> String {
        let mut line = String::with_capacity(self.values.len() * 8);
        for value in &self.values {
            line.push_str(value);
            line.push(',');
        }
        line
    }
}

#[derive(Debug, Clone)]
pub struct DayNormalizer {
    filter: RecordFilter,
    dst: DstResolver,
}

impl DayNormalizer {
    pub fn new(topology: ZoneTopology, dst: DstResolver) -> Self {
        Self {
            filter: RecordFilter::new(topology),
            dst,
        }
    }

    pub fn topology(&self) -> &ZoneTopology {
        self.filter.topology()
    }

    /// Normalize one decoded day file. `identifier` (URL or file name) decides
    /// whether DST compensation applies.
    pub fn normalize(
        &self,
        identifier: &str,
        content: &str,
    ) -> std::result::Result<NormalizedDayLine, ParseError> {
        self.normalize_reader(identifier, content.as_bytes())
    }

    /// Normalize the file of a known calendar day. DST handling follows `date`,
    /// `identifier` only labels log output.
    pub fn normalize_date(
        &self,
        date: NaiveDate,
        identifier: &str,
        content: &str,
    ) -> std::result::Result<NormalizedDayLine, ParseError> {
        let transition = self.dst.transition_for_date(date);
        self.normalize_with(identifier, transition, content.as_bytes())
    }

    pub fn normalize_reader<R: Read>(
        &self,
        identifier: &str,
        reader: R,
    ) -> std::result::Result<NormalizedDayLine, ParseError> {
        let transition = self.dst.transition_for(identifier);
        self.normalize_with(identifier, transition, reader)
    }

    fn normalize_with<R: Read>(
        &self,
        identifier: &str,
        transition: Option<DstTransition>,
        reader: R,
    ) -> std::result::Result<NormalizedDayLine, ParseError> {
        let topology = self.filter.topology();
        let num_zones = topology.num_zones;
        let used_zones = topology.used_zones();
        let expected = topology.values_per_day();

        if let Some(t) = transition {
            debug!("{identifier}: applying {t:?} compensation");
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut cells: Vec<Option<String>> = vec![None; expected];
        let mut buffer = SlidingHourBuffer::new();
        let mut hour_timestamp = String::new();
        let mut dropped = 0_usize;

        for (index, result) in reader.records().enumerate() {
            let record = result?;
            // 1-based, header is line 1
            let line = index + 2;
            let raw_hour = index / num_zones;
            let location = index % num_zones;

            let timestamp = record_timestamp(&record);
            if location == 0 {
                hour_timestamp = timestamp.to_owned();
                buffer.clear();
            } else if timestamp != hour_timestamp {
                return Err(ParseError::Misaligned {
                    line,
                    expected: hour_timestamp,
                    found: timestamp.to_owned(),
                });
            }

            let Some(column) = topology.column_of(location) else {
                continue;
            };

            let slot = match (transition, raw_hour) {
                (Some(DstTransition::FallBack), 2) => continue,
                (Some(DstTransition::FallBack), h) if h > 2 => h - 1,
                (Some(DstTransition::SpringForward), h) if h >= 2 => h + 1,
                (_, h) => h,
            };
            if slot >= HOURS_PER_DAY {
                dropped += 1;
                continue;
            }

            let value = self.filter.extract_value(&record, line)?;
            buffer.push(value);
            cells[slot * used_zones + column] = Some(value.to_owned());

            // Slot 1 complete: the missing 02:00 hour repeats it
            if transition == Some(DstTransition::SpringForward)
                && slot == 1
                && column + 1 == used_zones
            {
                for (replay_column, replayed) in buffer.snapshot_all().into_iter().enumerate() {
                    cells[2 * used_zones + replay_column] = Some(replayed);
                }
            }
        }

        if dropped > 0 {
            warn!("{identifier}: dropped {dropped} records past hour {HOURS_PER_DAY}");
        }

        let actual = cells.iter().filter(|c| c.is_some()).count();
        if actual != expected {
            return Err(ParseError::IncompleteDay { expected, actual });
        }

        Ok(NormalizedDayLine {
            values: cells.into_iter().flatten().collect(),
        })
    }
}

/// Result of normalizing one file inside a monthly archive
#[derive(Debug)]
pub struct DayOutcome {
    pub entry: String,
    pub date: Option<NaiveDate>,
    pub result: std::result::Result<NormalizedDayLine, ParseError>,
}

#[derive(Debug, Clone)]
pub struct MonthNormalizer {
    day: DayNormalizer,
}

impl MonthNormalizer {
    pub fn new(day: DayNormalizer) -> Self {
        Self { day }
    }

    /// Normalize every day file of a monthly zip archive, in archive order.
    ///
    /// Entries whose name carries a date outside `window` are left out.
    pub fn normalize_archive(
        &self,
        bytes: &[u8],
        window: Option<&Range<NaiveDate>>,
    ) -> Result<Vec<DayOutcome>> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        if archive.is_empty() {
            return Err(LbmpError::Archive("archive contains no files".to_owned()));
        }
        let mut outcomes = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }

            let entry = file.name().to_owned();
            let date = date_token(&entry);
            if window.zip(date).is_some_and(|(w, d)| !w.contains(&d)) {
                debug!("{entry}: outside requested range, skipped");
                continue;
            }

            let result = self.day.normalize_reader(&entry, file);
            outcomes.push(DayOutcome {
                entry,
                date,
                result,
            });
        }

        Ok(outcomes)
    }
}
