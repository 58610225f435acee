use meter_domain::TouPeriod;
use time::{PrimitiveDateTime, Weekday};

/// On-peak window on weekdays, inclusive start.
const ON_PEAK_START_HOUR: u8 = 9;
/// End of the on-peak window, exclusive.
const ON_PEAK_END_HOUR: u8 = 22;

/// Map an instant to its Time-of-Use period.
///
/// Rules, in priority order:
/// 1. Saturday and Sunday are off-peak for the entire day.
/// 2. On weekdays, on-peak is `09:00 <= time < 22:00`; everything else is
///    off-peak.
///
/// Pure and total. Chart banding must call this same function so the
/// rendered bands always agree with aggregation.
pub fn classify(instant: PrimitiveDateTime) -> TouPeriod {
    match instant.weekday() {
        Weekday::Saturday | Weekday::Sunday => TouPeriod::OffPeak,
        Weekday::Monday
        | Weekday::Tuesday
        | Weekday::Wednesday
        | Weekday::Thursday
        | Weekday::Friday => {
            let hour = instant.hour();
            if (ON_PEAK_START_HOUR..ON_PEAK_END_HOUR).contains(&hour) {
                TouPeriod::OnPeak
            } else {
                TouPeriod::OffPeak
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn weekday_on_peak_window() {
        // 2024-03-05 is a Tuesday.
        assert_eq!(classify(datetime!(2024-03-05 08:59)), TouPeriod::OffPeak);
        assert_eq!(classify(datetime!(2024-03-05 09:00)), TouPeriod::OnPeak);
        assert_eq!(classify(datetime!(2024-03-05 21:59)), TouPeriod::OnPeak);
        assert_eq!(classify(datetime!(2024-03-05 22:00)), TouPeriod::OffPeak);
        assert_eq!(classify(datetime!(2024-03-05 00:00)), TouPeriod::OffPeak);
    }

    #[test]
    fn weekends_are_off_peak_all_day() {
        // 2024-03-09 / 2024-03-10 are Saturday and Sunday.
        assert_eq!(classify(datetime!(2024-03-09 12:00)), TouPeriod::OffPeak);
        assert_eq!(classify(datetime!(2024-03-10 15:30)), TouPeriod::OffPeak);
        assert_eq!(classify(datetime!(2024-03-09 09:00)), TouPeriod::OffPeak);
    }

    #[test]
    fn classification_is_deterministic() {
        let instant = datetime!(2024-03-05 10:30);
        assert_eq!(classify(instant), classify(instant));
    }
}
