// src/schema/types.rs

use chrono::{Datelike, NaiveDate};

use super::{col, column_index};

/// A single point-of-diversion row that survived filtering.
///
/// The columns the pipeline works with are lifted into typed fields; the
/// remaining columns stay reachable by name through [`WellRecord::field`].
#[derive(Debug, Clone, PartialEq)]
pub struct WellRecord {
    pub pod_basin: String,
    pub pod_nbr: String,
    pub pod_suffix: String,
    pub pod_name: String,
    pub pod_status: String,
    pub county: String,
    pub use_of_well: String,
    pub utm_zone: u8,
    pub easting: f64,
    pub northing: f64,
    pub start_date: Option<NaiveDate>,
    pub finish_date: NaiveDate,
    /// Every cleaned field of the source row, in header order.
    raw: Vec<String>,
}

/// Coordinates already validated by the reader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmPosition {
    pub zone: u8,
    pub easting: f64,
    pub northing: f64,
}

impl WellRecord {
    /// Build a record from a full-width row. `raw` must be in header order.
    pub fn from_row(
        raw: Vec<String>,
        position: UtmPosition,
        start_date: Option<NaiveDate>,
        finish_date: NaiveDate,
    ) -> Self {
        let get = |i: usize| raw.get(i).cloned().unwrap_or_default();
        Self {
            pod_basin: get(col::POD_BASIN),
            pod_nbr: get(col::POD_NBR),
            pod_suffix: get(col::POD_SUFFIX),
            pod_name: get(col::POD_NAME),
            pod_status: get(col::POD_STATUS),
            county: get(col::COUNTY),
            use_of_well: get(col::USE_OF_WELL),
            utm_zone: position.zone,
            easting: position.easting,
            northing: position.northing,
            start_date,
            finish_date,
            raw,
        }
    }

    /// Raw value of any published column.
    pub fn field(&self, name: &str) -> Option<&str> {
        column_index(name)
            .and_then(|i| self.raw.get(i))
            .map(String::as_str)
    }

    /// Basin, number and suffix joined the way permits are cited, e.g. `RG 12345 S`.
    pub fn pod_id(&self) -> String {
        [&self.pod_basin, &self.pod_nbr, &self.pod_suffix]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn finish_year(&self) -> i32 {
        self.finish_date.year()
    }

    pub fn position(&self) -> UtmPosition {
        UtmPosition {
            zone: self.utm_zone,
            easting: self.easting,
            northing: self.northing,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_typed_fields_and_lookup() {
        let w = well("RG", "12345", "ACT", (1975, 6, 15));
        assert_eq!(w.pod_basin, "RG");
        assert_eq!(w.pod_status, "ACT");
        assert_eq!(w.utm_zone, 13);
        assert_eq!(w.finish_year(), 1975);
        assert_eq!(w.field("pod_nbr"), Some("12345"));
        assert_eq!(w.field("easting"), Some("350000"));
        assert_eq!(w.field("depth_well"), Some(""));
        assert_eq!(w.field("bogus"), None);
    }

    #[test]
    fn test_pod_id_skips_empty_parts() {
        let w = well("RG", "12345", "ACT", (1975, 6, 15));
        assert_eq!(w.pod_id(), "RG 12345");
    }
}
