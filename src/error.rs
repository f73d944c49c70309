use thiserror::Error;

/// Why a `month/day/year` string could not be turned into a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("expected month/day/year with three parts, got {0:?}")]
    Shape(String),

    #[error("non-numeric date component in {0:?}")]
    NotNumeric(String),

    #[error("{0:?} is not a calendar date")]
    OutOfRange(String),
}

/// Row-level failures that are not simply skipped.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("reading line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: bad {column} {source}")]
    Date {
        line: usize,
        column: &'static str,
        #[source]
        source: DateError,
    },
}

/// Failures building or applying a UTM transform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("UTM zone {0} is outside 1..=60")]
    InvalidZone(u8),

    #[error("coordinates ({easting}, {northing}) do not map to a finite lat/lon in zone {zone}")]
    NonFinite {
        zone: u8,
        easting: f64,
        northing: f64,
    },
}
