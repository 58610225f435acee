use std::collections::BTreeMap;

use meter_domain::{AggregatedPoint, AlignedSeries, Bucket, SeriesKey};

/// Merge the aggregated series of several meters onto one shared bucket axis.
///
/// The axis is the union of all buckets present across the inputs, in
/// chronological order. For a given bucket, a `SeriesKey` is absent (not
/// zero) when that meter produced no point there; how absent values are
/// drawn is the renderer's decision.
pub fn align(per_meter: &BTreeMap<String, Vec<AggregatedPoint>>) -> AlignedSeries {
    let mut merged: BTreeMap<Bucket, BTreeMap<SeriesKey, AggregatedPoint>> = BTreeMap::new();

    for (meter_id, points) in per_meter {
        for point in points {
            let slot = merged.entry(point.bucket).or_default();
            for &column in point.values.keys() {
                slot.insert(
                    SeriesKey {
                        meter_id: meter_id.clone(),
                        column,
                    },
                    point.clone(),
                );
            }
        }
    }

    let mut buckets = Vec::with_capacity(merged.len());
    let mut points = Vec::with_capacity(merged.len());
    for (bucket, series) in merged {
        buckets.push(bucket);
        points.push(series);
    }

    AlignedSeries { buckets, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, TimeRange};
    use meter_domain::{AggregationPolicy, ColumnName, Granularity, Reading};
    use time::macros::datetime;
    use time::PrimitiveDateTime;

    fn reading(instant: PrimitiveDateTime, meter_id: &str, value: f64) -> Reading {
        let mut fields = std::collections::BTreeMap::new();
        fields.insert(ColumnName::DemandW, value);
        Reading {
            instant,
            meter_id: meter_id.to_string(),
            fields,
        }
    }

    #[test]
    fn axis_is_the_union_of_all_buckets() {
        let range = TimeRange::new(datetime!(2024-03-05 09:00), datetime!(2024-03-05 10:00));
        let columns = [ColumnName::DemandW];

        // MDB-1 reports in the first and third slot, MDB-2 only in the second.
        let a = aggregate(
            &[
                reading(datetime!(2024-03-05 09:05), "MDB-1", 10.0),
                reading(datetime!(2024-03-05 09:35), "MDB-1", 20.0),
            ],
            range,
            Granularity::FifteenMinute,
            AggregationPolicy::MaxInWindow,
            &columns,
        );
        let b = aggregate(
            &[reading(datetime!(2024-03-05 09:20), "MDB-2", 15.0)],
            range,
            Granularity::FifteenMinute,
            AggregationPolicy::MaxInWindow,
            &columns,
        );

        let mut per_meter = BTreeMap::new();
        per_meter.insert("MDB-1".to_string(), a);
        per_meter.insert("MDB-2".to_string(), b);

        let aligned = align(&per_meter);

        let starts: Vec<PrimitiveDateTime> = aligned.buckets.iter().map(|b| b.start).collect();
        assert_eq!(
            starts,
            vec![
                datetime!(2024-03-05 09:00),
                datetime!(2024-03-05 09:15),
                datetime!(2024-03-05 09:30),
            ]
        );

        let key_a = SeriesKey {
            meter_id: "MDB-1".to_string(),
            column: ColumnName::DemandW,
        };
        let key_b = SeriesKey {
            meter_id: "MDB-2".to_string(),
            column: ColumnName::DemandW,
        };

        // First slot: only MDB-1. Second: only MDB-2. Third: only MDB-1.
        assert!(aligned.points[0].contains_key(&key_a));
        assert!(!aligned.points[0].contains_key(&key_b));
        assert!(!aligned.points[1].contains_key(&key_a));
        assert_eq!(
            aligned.points[1][&key_b].values[&ColumnName::DemandW],
            15.0
        );
        assert_eq!(
            aligned.points[2][&key_a].values[&ColumnName::DemandW],
            20.0
        );
    }

    #[test]
    fn empty_input_aligns_to_an_empty_axis() {
        let aligned = align(&BTreeMap::new());
        assert!(aligned.buckets.is_empty());
        assert!(aligned.points.is_empty());
    }
}
