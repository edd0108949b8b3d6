use crate::error::{Error, Result};
use std::any;
use time::{OffsetDateTime, PrimitiveDateTime, format_description::parse_borrowed};

/// Date and time with either separator, seconds mandatory, fraction
/// optional. Parsing demands a full match, so the order is immaterial.
const LOCAL_FORMATS: [&str; 4] = [
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]",
    "[year]-[month]-[day]T[hour]:[minute]:[second]",
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]",
    "[year]-[month]-[day] [hour]:[minute]:[second]",
];

/// Numeric zone suffixes: `±HH:MM`, `±HHMM`, `±HH`.
const OFFSET_SUFFIXES: [&str; 3] = [
    "[offset_hour sign:mandatory]:[offset_minute]",
    "[offset_hour sign:mandatory][offset_minute]",
    "[offset_hour sign:mandatory]",
];

/// Permissive ISO-8601-ish parser:
/// `YYYY-MM-DD (T|space) HH:MM:SS (.fff)? (Z | ±HH(:MM|MM)?)?`.
/// Without a zone suffix the input is taken as UTC.
pub(crate) fn parse_datetime(text: &str) -> Result<OffsetDateTime> {
    let error = || Error::TypeMismatch {
        target: any::type_name::<OffsetDateTime>(),
        found: "TEXT",
    };
    let text = text.trim();
    if let Some(local) = text.strip_suffix(['Z', 'z']) {
        return parse_local(local)
            .map(PrimitiveDateTime::assume_utc)
            .ok_or_else(error);
    }
    if let Some(datetime) = parse_local(text) {
        return Ok(datetime.assume_utc());
    }
    parse_with_offset(text).ok_or_else(error)
}

fn parse_local(text: &str) -> Option<PrimitiveDateTime> {
    for format in LOCAL_FORMATS {
        let format = parse_borrowed::<2>(format).expect("the format was not valid");
        if let Ok(datetime) = PrimitiveDateTime::parse(text, format.as_slice()) {
            return Some(datetime);
        }
    }
    None
}

fn parse_with_offset(text: &str) -> Option<OffsetDateTime> {
    for base in LOCAL_FORMATS {
        for suffix in OFFSET_SUFFIXES {
            let pattern = format!("{base}{suffix}");
            let format = parse_borrowed::<2>(&pattern).expect("the format was not valid");
            if let Ok(datetime) = OffsetDateTime::parse(text, format.as_slice()) {
                return Some(datetime);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::parse_datetime;
    use time::macros::datetime;

    #[test]
    fn zulu_with_millis() {
        assert_eq!(
            parse_datetime("2024-05-18T14:11:35.069Z").unwrap(),
            datetime!(2024-05-18 14:11:35.069 UTC),
        );
    }

    #[test]
    fn space_separator_no_zone_is_utc() {
        assert_eq!(
            parse_datetime("2024-05-18 14:11:35").unwrap(),
            datetime!(2024-05-18 14:11:35 UTC),
        );
    }

    #[test]
    fn numeric_offsets() {
        let expected = datetime!(2024-05-18 14:11:35 +05:30);
        assert_eq!(parse_datetime("2024-05-18T14:11:35+05:30").unwrap(), expected);
        assert_eq!(parse_datetime("2024-05-18T14:11:35+0530").unwrap(), expected);
        assert_eq!(
            parse_datetime("2024-05-18 14:11:35.500-02").unwrap(),
            datetime!(2024-05-18 14:11:35.5 -02:00),
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_datetime("2024-05-18").is_err());
        assert!(parse_datetime("14:11:35").is_err());
        assert!(parse_datetime("2024-05-18T14:11").is_err());
        assert!(parse_datetime("not a datetime").is_err());
        assert!(parse_datetime("2024-05-18T14:11:35 trailing").is_err());
    }
}
