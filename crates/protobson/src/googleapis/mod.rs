//! Codecs for `google.type` common types.

mod datetime;

pub use datetime::{
    chrono_to_date_time, date_time_to_chrono, DateTime, DateTimeCodec, TimeOffset, TimeZone,
};
