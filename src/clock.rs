use chrono::{DateTime, FixedOffset, Offset, Utc};
use thiserror::Error;

/// Offset every displayed timestamp is normalized to (UTC+07:00, no DST).
const TARGET_OFFSET_SECS: i32 = 7 * 3600;

const NOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const CONVERTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

#[derive(Debug, Error)]
#[error("could not parse {input:?} as an RFC 3339 timestamp: {source}")]
pub struct ConversionError {
    pub input: String,
    #[source]
    pub source: chrono::ParseError,
}

fn target_zone() -> FixedOffset {
    FixedOffset::east_opt(TARGET_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn now_in_target_zone() -> String {
    format_now(Utc::now())
}

fn format_now(now: DateTime<Utc>) -> String {
    now.with_timezone(&target_zone()).format(NOW_FORMAT).to_string()
}

/// Re-expresses an RFC 3339 timestamp at UTC+07:00. Sub-second precision is dropped.
pub fn convert_to_target_zone(input: &str) -> Result<String, ConversionError> {
    let parsed = DateTime::parse_from_rfc3339(input).map_err(|source| ConversionError {
        input: input.to_string(),
        source,
    })?;

    Ok(parsed.with_timezone(&target_zone()).format(CONVERTED_FORMAT).to_string())
}
