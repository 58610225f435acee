use std::collections::BTreeMap;

use meter_domain::{AggregatedPoint, AggregationPolicy, Bucket, ColumnName, Granularity, Reading, TouPeriod};
use time::{Date, Duration, PrimitiveDateTime};

use crate::tou;

/// Requested report window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub from: PrimitiveDateTime,
    pub to: PrimitiveDateTime,
}

impl TimeRange {
    pub fn new(from: PrimitiveDateTime, to: PrimitiveDateTime) -> Self {
        Self { from, to }
    }

    fn contains(&self, instant: PrimitiveDateTime) -> bool {
        instant >= self.from && instant <= self.to
    }
}

/// On-peak / off-peak totals of one cumulative column over a period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TouTotals {
    pub on_peak: f64,
    pub off_peak: f64,
}

/// Group a reading stream into fixed buckets and combine each requested
/// column under the given policy.
///
/// Buckets with zero contributing readings are omitted, never synthesized,
/// and a column absent from every reading of a bucket is left out of that
/// point's value map. Output is chronological by bucket start; the bucket
/// index wraps at calendar boundaries (a day view spanning midnight keeps
/// 23:45 before 00:00 of the next day even though 95 > 0).
///
/// An inverted or zero-length range yields an empty result: "no data in an
/// invalid range" is a renderable state, not an error.
pub fn aggregate(
    readings: &[Reading],
    range: TimeRange,
    granularity: Granularity,
    policy: AggregationPolicy,
    columns: &[ColumnName],
) -> Vec<AggregatedPoint> {
    if range.from >= range.to {
        return Vec::new();
    }

    let mut grouped: BTreeMap<Bucket, Vec<&Reading>> = BTreeMap::new();
    for reading in readings {
        if !range.contains(reading.instant) {
            continue;
        }
        let bucket = bucket_for(reading.instant, granularity, range.from);
        grouped.entry(bucket).or_default().push(reading);
    }

    grouped
        .into_iter()
        .map(|(bucket, members)| {
            let mut values = BTreeMap::new();
            for &column in columns {
                let combined = match policy {
                    AggregationPolicy::MaxInWindow => max_in_window(&members, column),
                    AggregationPolicy::SumOverPeriod => sum_over_period(&members, column),
                };
                if let Some(value) = combined {
                    values.insert(column, value);
                }
            }
            AggregatedPoint {
                bucket,
                values,
                source_count: members.len(),
            }
        })
        .collect()
}

/// Sum one cumulative column over the range, split by Time-of-Use period.
/// This is the energy reduction consumed by the tariff engine.
pub fn tou_split(readings: &[Reading], range: TimeRange, column: ColumnName) -> TouTotals {
    let mut totals = TouTotals::default();
    if range.from >= range.to {
        return totals;
    }
    for reading in readings {
        if !range.contains(reading.instant) {
            continue;
        }
        let Some(&value) = reading.fields.get(&column) else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        match tou::classify(reading.instant) {
            TouPeriod::OnPeak => totals.on_peak += value,
            TouPeriod::OffPeak => totals.off_peak += value,
        }
    }
    totals
}

/// Maximum of one demand column over the whole range, `None` when the
/// column never appears. This is the demand reduction consumed by the
/// tariff engine.
pub fn peak_demand(readings: &[Reading], range: TimeRange, column: ColumnName) -> Option<f64> {
    if range.from >= range.to {
        return None;
    }
    let mut best: Option<f64> = None;
    for reading in readings {
        if !range.contains(reading.instant) {
            continue;
        }
        if let Some(&value) = reading.fields.get(&column) {
            if !value.is_finite() {
                continue;
            }
            match best {
                Some(current) if value <= current => {}
                _ => best = Some(value),
            }
        }
    }
    best
}

fn bucket_for(
    instant: PrimitiveDateTime,
    granularity: Granularity,
    range_start: PrimitiveDateTime,
) -> Bucket {
    match granularity {
        Granularity::FifteenMinute => {
            let elapsed = (instant - range_start).whole_minutes();
            let slot = elapsed.div_euclid(15);
            let start = range_start + Duration::minutes(slot * 15);
            let index = (u16::from(start.hour()) * 60 + u16::from(start.minute())) / 15;
            Bucket {
                start,
                granularity,
                index,
                tou: Some(tou::classify(start)),
            }
        }
        Granularity::Day => {
            let date = instant.date();
            Bucket {
                start: date.midnight(),
                granularity,
                index: u16::from(date.day()),
                tou: None,
            }
        }
        Granularity::Month => {
            let date = instant.date();
            let first = Date::from_calendar_date(date.year(), date.month(), 1).unwrap_or(date);
            Bucket {
                start: first.midnight(),
                granularity,
                index: u16::from(u8::from(date.month())),
                tou: None,
            }
        }
    }
}

// Ties keep the first occurrence; non-finite values are excluded from the
// comparison, not treated as zero.
fn max_in_window(members: &[&Reading], column: ColumnName) -> Option<f64> {
    let mut best: Option<f64> = None;
    for reading in members {
        if let Some(&value) = reading.fields.get(&column) {
            if !value.is_finite() {
                continue;
            }
            match best {
                Some(current) if value <= current => {}
                _ => best = Some(value),
            }
        }
    }
    best
}

// Missing and non-finite values contribute 0 to the sum; a column no reading
// in the bucket carries at all yields `None` so it stays absent downstream.
fn sum_over_period(members: &[&Reading], column: ColumnName) -> Option<f64> {
    let mut sum = 0.0;
    let mut seen = false;
    for reading in members {
        if let Some(&value) = reading.fields.get(&column) {
            seen = true;
            if value.is_finite() {
                sum += value;
            }
        }
    }
    seen.then_some(sum)
}
