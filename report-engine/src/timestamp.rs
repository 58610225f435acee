use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Unparsable timestamp string. The offending reading is dropped by the
/// caller and counted, never escalated into a fatal error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized timestamp '{0}'")]
pub struct NormalizeError(pub String);

const ISO_FRACTIONAL: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
const ISO_PLAIN: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const SQL_STYLE: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DAY_FIRST: &[FormatItem<'static>] =
    format_description!("[day]/[month]/[year] [hour]:[minute]");

/// Parse a heterogeneous timestamp representation into a canonical instant
/// at minute resolution.
///
/// Formats are tried in a fixed priority order and the first successful
/// parse wins:
/// 1. RFC 3339 / ISO-8601 with a UTC offset (converted to UTC)
/// 2. `YYYY-MM-DDTHH:mm:ss.fff`
/// 3. `YYYY-MM-DDTHH:mm:ss`
/// 4. `YYYY-MM-DD HH:mm:ss`
/// 5. `DD/MM/YYYY HH:mm`
///
/// Naive timestamps are taken as the meter's local site time; no timezone
/// conversion is applied to them.
pub fn normalize(raw: &str) -> Result<PrimitiveDateTime, NormalizeError> {
    let trimmed = raw.trim();

    if let Ok(odt) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        let utc = odt.to_offset(UtcOffset::UTC);
        return Ok(truncate_to_minute(PrimitiveDateTime::new(
            utc.date(),
            utc.time(),
        )));
    }

    for format in [ISO_FRACTIONAL, ISO_PLAIN, SQL_STYLE, DAY_FIRST] {
        if let Ok(dt) = PrimitiveDateTime::parse(trimmed, format) {
            return Ok(truncate_to_minute(dt));
        }
    }

    Err(NormalizeError(raw.to_string()))
}

fn truncate_to_minute(dt: PrimitiveDateTime) -> PrimitiveDateTime {
    dt.replace_second(0)
        .and_then(|dt| dt.replace_nanosecond(0))
        .unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_iso_8601() {
        assert_eq!(
            normalize("2024-03-05T09:12:44"),
            Ok(datetime!(2024-03-05 09:12))
        );
    }

    #[test]
    fn parses_iso_8601_with_fractional_seconds() {
        assert_eq!(
            normalize("2024-03-05T09:12:44.250"),
            Ok(datetime!(2024-03-05 09:12))
        );
    }

    #[test]
    fn parses_sql_style() {
        assert_eq!(
            normalize("2024-03-05 09:12:44"),
            Ok(datetime!(2024-03-05 09:12))
        );
    }

    #[test]
    fn parses_day_first() {
        assert_eq!(normalize("05/03/2024 09:12"), Ok(datetime!(2024-03-05 09:12)));
    }

    #[test]
    fn rfc3339_offset_is_converted_to_utc() {
        assert_eq!(
            normalize("2024-03-05T09:12:00+07:00"),
            Ok(datetime!(2024-03-05 02:12))
        );
    }

    #[test]
    fn seconds_are_truncated_to_minute_resolution() {
        assert_eq!(
            normalize("2024-03-05 09:12:59"),
            Ok(datetime!(2024-03-05 09:12))
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = normalize("yesterday at nine").unwrap_err();
        assert_eq!(err, NormalizeError("yesterday at nine".to_string()));
    }

    #[test]
    fn rejects_month_first_ambiguity() {
        // Month 13 is not a calendar month, so this cannot parse day-first.
        assert!(normalize("25/13/2024 09:00").is_err());
    }
}
