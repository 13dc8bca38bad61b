use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

/// "January 5, 2026, 10:20", in the browser's time zone.
pub fn display_datetime(datetime: DateTime<Utc>) -> String {
    format_long(&datetime.with_timezone(&Local))
}

/// "Jan 5, 2026, 10:20", in the browser's time zone.
pub fn display_datetime_short(datetime: DateTime<Utc>) -> String {
    format_short(&datetime.with_timezone(&Local))
}

fn format_long<Tz: TimeZone>(datetime: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    datetime.format("%B %-d, %Y, %H:%M").to_string()
}

fn format_short<Tz: TimeZone>(datetime: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    datetime.format("%b %-d, %Y, %H:%M").to_string()
}
