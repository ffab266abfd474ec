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

//! Date-range collection: monthly archives first, then the current month day by day

use crate::error::{LbmpError, Result};
use crate::market::MarketType;
use crate::matrix::MatrixBuilder;
use crate::normalizer::{DayNormalizer, MonthNormalizer};
use crate::source::PriceSource;
use crate::store::LineStore;
use chrono::{Datelike, Months, NaiveDate, Utc};
use ndarray::Array3;
use serde::Serialize;
use std::ops::Range;
use std::path::Path;
use tracing::{info, warn};

/// A month, archive or day that was skipped instead of written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUnit {
    pub unit: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeSummary {
    pub days_written: usize,
    pub month_fetches: usize,
    pub day_fetches: usize,
    pub skipped: Vec<SkippedUnit>,
}

impl RangeSummary {
    /// Record a recoverable failure and keep going; anything else is returned.
    fn recover(&mut self, unit: impl Into<String>, err: LbmpError) -> Result<()> {
        if !err.is_recoverable() {
            return Err(err);
        }
        let unit = unit.into();
        warn!("Skipping {unit}: {err}");
        self.skipped.push(SkippedUnit {
            unit,
            reason: err.to_string(),
        });
        Ok(())
    }
}

/// Current date on the NYISO wall clock
pub fn nyiso_today() -> NaiveDate {
    Utc::now()
        .with_timezone(&chrono_tz::America::New_York)
        .date_naive()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    (a.year(), a.month()) == (b.year(), b.month())
}

#[derive(Debug)]
pub struct RangeAggregator<S: PriceSource> {
    source: S,
    day: DayNormalizer,
    month: MonthNormalizer,
    market: MarketType,
    today: NaiveDate,
}

impl<S: PriceSource> RangeAggregator<S> {
    pub fn new(source: S, normalizer: DayNormalizer, market: MarketType) -> Self {
        Self {
            source,
            month: MonthNormalizer::new(normalizer.clone()),
            day: normalizer,
            market,
            today: nyiso_today(),
        }
    }

    /// Pin "today", which decides whether the terminal month is fetched per day
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn market(&self) -> MarketType {
        self.market
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Append every available day in `[start, end)` to `store`, oldest first.
    pub fn collect_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        store: &mut LineStore,
    ) -> Result<RangeSummary> {
        self.collect_range_for(self.market, start, end, store)
    }

    /// `[start, today)`
    pub fn collect_to_present(
        &self,
        start: NaiveDate,
        store: &mut LineStore,
    ) -> Result<RangeSummary> {
        self.collect_range(start, self.today, store)
    }

    /// Collect `[start, end)` for `market` into the store at `store_path`, then
    /// read the whole store back as a `[days, 24, used_zones]` tensor.
    pub fn collect_tensor<P: AsRef<Path>>(
        &self,
        market: &str,
        start: NaiveDate,
        end: NaiveDate,
        store_path: P,
    ) -> Result<Array3<f64>> {
        let market: MarketType = market.parse()?;

        let mut store = LineStore::open(store_path.as_ref())?;
        self.collect_range_for(market, start, end, &mut store)?;
        drop(store);

        MatrixBuilder::new(self.day.topology()).read_tensor(store_path)
    }

    /// Fetch and append one day. Unlike range collection, failure is returned.
    pub fn append_day(&self, date: NaiveDate, store: &mut LineStore) -> Result<()> {
        let target = self.source.day_target(self.market, date);
        let content = self.source.fetch_day(self.market, date)?;
        let line = self
            .day
            .normalize_date(date, &target, &content)
            .map_err(|e| LbmpError::parse(target, e))?;
        store.append(&line)?;
        store.flush()
    }

    fn collect_range_for(
        &self,
        market: MarketType,
        start: NaiveDate,
        end: NaiveDate,
        store: &mut LineStore,
    ) -> Result<RangeSummary> {
        let mut summary = RangeSummary::default();
        if start >= end {
            warn!("Empty range {start}..{end}, nothing to collect");
            return Ok(summary);
        }

        info!("Collecting {market} LBMP for {start}..{end}");
        let window = start..end;
        let mut current = first_of_month(start);

        while !same_month(current, end) {
            self.bulk_month(market, current, &window, store, &mut summary)?;
            current = current
                .checked_add_months(Months::new(1))
                .ok_or_else(|| LbmpError::Config(format!("date overflow after {current}")))?;
        }

        let tail_start = current.max(start);
        if tail_start < end {
            if same_month(current, self.today) {
                for date in tail_start.iter_days().take_while(|d| *d < end) {
                    self.single_day(market, date, store, &mut summary)?;
                }
            } else {
                self.bulk_month(market, current, &window, store, &mut summary)?;
            }
        }

        store.flush()?;
        info!(
            "Wrote {} days ({} month fetches, {} day fetches, {} skipped)",
            summary.days_written,
            summary.month_fetches,
            summary.day_fetches,
            summary.skipped.len()
        );
        Ok(summary)
    }

    fn bulk_month(
        &self,
        market: MarketType,
        month: NaiveDate,
        window: &Range<NaiveDate>,
        store: &mut LineStore,
        summary: &mut RangeSummary,
    ) -> Result<()> {
        summary.month_fetches += 1;
        let target = self.source.month_target(market, month);

        let bytes = match self.source.fetch_month(market, month) {
            Ok(bytes) => bytes,
            Err(e) => return summary.recover(target, e),
        };
        let outcomes = match self.month.normalize_archive(&bytes, Some(window)) {
            Ok(outcomes) => outcomes,
            Err(e) => return summary.recover(target, e),
        };

        for outcome in outcomes {
            match outcome.result {
                Ok(line) => {
                    store.append(&line)?;
                    summary.days_written += 1;
                }
                Err(e) => {
                    let unit = format!("{target}:{}", outcome.entry);
                    summary.recover(unit.clone(), LbmpError::parse(unit, e))?;
                }
            }
        }
        Ok(())
    }

    fn single_day(
        &self,
        market: MarketType,
        date: NaiveDate,
        store: &mut LineStore,
        summary: &mut RangeSummary,
    ) -> Result<()> {
        summary.day_fetches += 1;
        let target = self.source.day_target(market, date);

        let content = match self.source.fetch_day(market, date) {
            Ok(content) => content,
            Err(e) => return summary.recover(target, e),
        };
        match self.day.normalize_date(date, &target, &content) {
            Ok(line) => {
                store.append(&line)?;
                summary.days_written += 1;
                Ok(())
            }
            Err(e) => summary.recover(target.clone(), LbmpError::parse(target, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dst::DstResolver;
    use crate::store::read_lines;
    use crate::topology::ZoneTopology;
    use std::cell::RefCell;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Raw day file whose every price encodes the day of month
    fn day_file(day: NaiveDate, raw_hours: usize) -> String {
        let mut content = String::from("\"Time Stamp\",\"Name\",\"PTID\",\"LBMP ($/MWHr)\"\n");
        for h in 0..raw_hours {
            for z in 0..15 {
                content.push_str(&format!(
                    "\"{} {:02}:00\",\"Z{z}\",{},{}.{z:02}\n",
                    day.format("%m/%d/%Y"),
                    h % 24,
                    61750 + z,
                    day.day()
                ));
            }
        }
        content
    }

    fn raw_hours(day: NaiveDate) -> usize {
        match DstResolver::default().transition_for_date(day) {
            Some(crate::dst::DstTransition::SpringForward) => 23,
            Some(crate::dst::DstTransition::FallBack) => 25,
            None => 24,
        }
    }

    fn month_zip(month: NaiveDate, market: MarketType) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let seg = market.path_segment();
        let mut day = month;
        while same_month(day, month) {
            let name = format!("{}{seg}_zone.csv", day.format("%Y%m%d"));
            writer
                .start_file(name, SimpleFileOptions::default())
                .unwrap();
            writer
                .write_all(day_file(day, raw_hours(day)).as_bytes())
                .unwrap();
            day = day.succ_opt().unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// In-memory source recording every call
    #[derive(Default)]
    struct FakeSource {
        month_calls: RefCell<Vec<NaiveDate>>,
        day_calls: RefCell<Vec<NaiveDate>>,
        missing_months: Vec<NaiveDate>,
        broken_days: Vec<NaiveDate>,
    }

    impl PriceSource for FakeSource {
        fn day_target(&self, market: MarketType, date: NaiveDate) -> String {
            format!("mem://{}{}_zone.csv", date.format("%Y%m%d"), market.path_segment())
        }

        fn month_target(&self, market: MarketType, month: NaiveDate) -> String {
            format!("mem://{}01{}_zone_csv.zip", month.format("%Y%m"), market.path_segment())
        }

        fn fetch_day(&self, _market: MarketType, date: NaiveDate) -> Result<String> {
            self.day_calls.borrow_mut().push(date);
            if self.broken_days.contains(&date) {
                return Ok(day_file(date, 3));
            }
            Ok(day_file(date, raw_hours(date)))
        }

        fn fetch_month(&self, market: MarketType, month: NaiveDate) -> Result<Vec<u8>> {
            self.month_calls.borrow_mut().push(month);
            if self.missing_months.contains(&month) {
                return Err(LbmpError::Fetch {
                    target: self.month_target(market, month),
                    reason: "HTTP 404 Not Found".to_owned(),
                });
            }
            Ok(month_zip(month, market))
        }
    }

    fn aggregator(source: FakeSource, today: NaiveDate) -> RangeAggregator<FakeSource> {
        let normalizer = DayNormalizer::new(ZoneTopology::nyiso(), DstResolver::default());
        RangeAggregator::new(source, normalizer, MarketType::RealTime).with_today(today)
    }

    fn first_values(path: &Path) -> Vec<String> {
        read_lines(path)
            .unwrap()
            .iter()
            .map(|l| l.split(',').next().unwrap().to_owned())
            .collect()
    }

    #[test]
    fn test_two_bulk_months_then_daily_tail() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lbmp.txt");
        let agg = aggregator(FakeSource::default(), date(2026, 10, 17));

        let mut store = LineStore::open(&path).unwrap();
        let summary = agg
            .collect_range(date(2026, 8, 1), date(2026, 10, 10), &mut store)
            .unwrap();

        assert_eq!(summary.month_fetches, 2);
        assert_eq!(summary.day_fetches, 9);
        assert_eq!(summary.days_written, 31 + 30 + 9);
        assert!(summary.skipped.is_empty());
        assert_eq!(
            *agg.source().month_calls.borrow(),
            vec![date(2026, 8, 1), date(2026, 9, 1)]
        );
        assert_eq!(agg.source().day_calls.borrow().last(), Some(&date(2026, 10, 9)));
        assert_eq!(read_lines(&path).unwrap().len(), 70);
    }

    #[test]
    fn test_past_terminal_month_is_bulk_and_clipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lbmp.txt");
        let agg = aggregator(FakeSource::default(), date(2026, 10, 17));

        let mut store = LineStore::open(&path).unwrap();
        let summary = agg
            .collect_range(date(2016, 2, 27), date(2016, 3, 3), &mut store)
            .unwrap();

        assert_eq!(summary.month_fetches, 2);
        assert_eq!(summary.day_fetches, 0);
        // Feb 27, 28, 29 and Mar 1, 2
        assert_eq!(
            first_values(&path),
            vec!["27.00", "28.00", "29.00", "1.00", "2.00"]
        );
    }

    #[test]
    fn test_dst_days_in_bulk_month_are_full() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lbmp.txt");
        let agg = aggregator(FakeSource::default(), date(2026, 10, 17));

        let mut store = LineStore::open(&path).unwrap();
        let summary = agg
            .collect_range(date(2016, 3, 12), date(2016, 3, 15), &mut store)
            .unwrap();

        assert_eq!(summary.days_written, 3);
        for line in read_lines(&path).unwrap() {
            assert_eq!(line.matches(',').count(), 264);
        }
    }

    #[test]
    fn test_missing_month_is_skipped() {
        let source = FakeSource {
            missing_months: vec![date(2026, 8, 1)],
            ..FakeSource::default()
        };
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lbmp.txt");
        let agg = aggregator(source, date(2026, 10, 17));

        let mut store = LineStore::open(&path).unwrap();
        let summary = agg
            .collect_range(date(2026, 8, 1), date(2026, 10, 1), &mut store)
            .unwrap();

        assert_eq!(summary.month_fetches, 2);
        assert_eq!(summary.days_written, 30);
        assert_eq!(summary.skipped.len(), 1);
        assert!(summary.skipped[0].unit.contains("20260801rtlbmp_zone_csv.zip"));
        assert!(summary.skipped[0].reason.contains("404"));
    }

    #[test]
    fn test_incomplete_tail_day_is_skipped() {
        let source = FakeSource {
            broken_days: vec![date(2026, 10, 2)],
            ..FakeSource::default()
        };
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lbmp.txt");
        let agg = aggregator(source, date(2026, 10, 17));

        let mut store = LineStore::open(&path).unwrap();
        let summary = agg.collect_to_present(date(2026, 10, 1), &mut store).unwrap();

        assert_eq!(summary.day_fetches, 16);
        assert_eq!(summary.days_written, 15);
        assert_eq!(summary.skipped.len(), 1);
        assert!(summary.skipped[0].reason.contains("expected 264"));
        assert_eq!(first_values(&path)[1], "3.00");
    }

    #[test]
    fn test_empty_range_fetches_nothing() {
        let dir = TempDir::new().unwrap();
        let agg = aggregator(FakeSource::default(), date(2026, 10, 17));
        let mut store = LineStore::open(dir.path().join("lbmp.txt")).unwrap();

        let summary = agg
            .collect_range(date(2026, 5, 5), date(2026, 5, 5), &mut store)
            .unwrap();
        assert_eq!(summary, RangeSummary::default());
        assert!(agg.source().month_calls.borrow().is_empty());
    }

    #[test]
    fn test_end_on_month_boundary_skips_terminal_month() {
        let dir = TempDir::new().unwrap();
        let agg = aggregator(FakeSource::default(), date(2026, 10, 17));
        let mut store = LineStore::open(dir.path().join("lbmp.txt")).unwrap();

        let summary = agg
            .collect_range(date(2016, 1, 15), date(2016, 2, 1), &mut store)
            .unwrap();
        assert_eq!(summary.month_fetches, 1);
        assert_eq!(summary.days_written, 17);
    }

    #[test]
    fn test_collect_tensor_unknown_market() {
        let dir = TempDir::new().unwrap();
        let agg = aggregator(FakeSource::default(), date(2026, 10, 17));

        let err = agg
            .collect_tensor("XX", date(2016, 1, 1), date(2016, 2, 1), dir.path().join("t.txt"))
            .unwrap_err();

        assert!(matches!(err, LbmpError::Config(_)));
        assert!(agg.source().month_calls.borrow().is_empty());
        assert!(agg.source().day_calls.borrow().is_empty());
        assert!(!dir.path().join("t.txt").exists());
    }

    #[test]
    fn test_collect_tensor_shape() {
        let dir = TempDir::new().unwrap();
        let agg = aggregator(FakeSource::default(), date(2026, 10, 17));

        let tensor = agg
            .collect_tensor("DA", date(2016, 11, 5), date(2016, 11, 8), dir.path().join("t.txt"))
            .unwrap();

        assert_eq!(tensor.shape(), &[3, 24, 11]);
        assert_eq!(tensor[[0, 0, 0]], 5.0);
        // Fall-back day still fills the last slot
        assert_eq!(tensor[[1, 23, 10]], 6.14);
        assert_eq!(agg.source().month_calls.borrow().len(), 1);
    }

    #[test]
    fn test_collect_tensor_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("lbmp.txt");
        let agg = aggregator(FakeSource::default(), date(2026, 10, 17));

        let tensor = agg
            .collect_tensor("RT", date(2016, 1, 1), date(2016, 1, 3), &path)
            .unwrap();

        assert_eq!(tensor.shape(), &[2, 24, 11]);
        assert!(path.exists());
    }

    #[test]
    fn test_append_day() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lbmp.txt");
        let agg = aggregator(FakeSource::default(), date(2026, 10, 17));

        let mut store = LineStore::open(&path).unwrap();
        agg.append_day(date(2026, 3, 8), &mut store).unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].matches(',').count(), 264);
        assert_eq!(*agg.source().day_calls.borrow(), vec![date(2026, 3, 8)]);
    }

    #[test]
    fn test_append_day_failure_is_returned() {
        let source = FakeSource {
            broken_days: vec![date(2026, 1, 5)],
            ..FakeSource::default()
        };
        let dir = TempDir::new().unwrap();
        let agg = aggregator(source, date(2026, 10, 17));
        let mut store = LineStore::open(dir.path().join("lbmp.txt")).unwrap();

        let err = agg.append_day(date(2026, 1, 5), &mut store).unwrap_err();
        assert!(matches!(err, LbmpError::Parse { .. }));
    }
}
