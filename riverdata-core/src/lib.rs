//! RiverData Core - Reading Types and Series Logic
//!
//! Data types shared by every RiverData crate: readings and series, the
//! persisted cache entry, the reading parser and merge rule, measure id
//! parsing, time helpers, and the error hierarchy. Nothing here performs I/O.

pub mod entry;
pub mod error;
pub mod format;
pub mod measure;
pub mod parser;
pub mod reading;
pub mod series;
pub mod source;
pub mod time;

pub use entry::CacheEntry;
pub use error::{
    ConfigError, ParseError, RiverDataError, RiverDataResult, SeriesError, StoreError,
    TransportError,
};
pub use format::{format_date, format_time, format_value};
pub use measure::{validate_measure_id, MeasureId, MeasureLabels};
pub use parser::{measure_id_from_ref, parse_readings, parse_response_body};
pub use reading::{RawReadingEvent, Reading, ReadingsResponse, Timestamp};
pub use series::{Series, SeriesLimits};
pub use source::ReadingSource;
pub use time::{
    now_timestamp, parse_timestamp, start_of_day, start_of_day_in, to_time_parameter,
    DayAlignment, DAY_SECS, MINUTE_SECS,
};
