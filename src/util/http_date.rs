//! IMF-fixdate rendering for `Last-Modified` headers.

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

const IMF_FIXDATE: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short], [day padding:zero] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Render `value` as `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_imf_fixdate(value: OffsetDateTime) -> String {
    value
        .to_offset(UtcOffset::UTC)
        .format(IMF_FIXDATE)
        .unwrap_or_else(|_| value.unix_timestamp().to_string())
}
