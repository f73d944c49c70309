//! Year / decade grouping with running totals.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::schema::WellRecord;

/// Anything that can be placed on the timeline by its completion date.
pub trait Dated {
    fn date(&self) -> NaiveDate;

    fn year(&self) -> i32 {
        self.date().year()
    }
}

impl Dated for WellRecord {
    fn date(&self) -> NaiveDate {
        self.finish_date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Decade,
}

impl Granularity {
    /// Grouping key for `year`: the year itself, or `year // 10`.
    pub fn key(&self, year: i32) -> i32 {
        match self {
            Granularity::Year => year,
            Granularity::Decade => year.div_euclid(10),
        }
    }

    /// First calendar year covered by `key`.
    pub fn label(&self, key: i32) -> i32 {
        match self {
            Granularity::Year => key,
            Granularity::Decade => key * 10,
        }
    }

    /// Last calendar year covered by `key`.
    pub fn last_year(&self, key: i32) -> i32 {
        match self {
            Granularity::Year => key,
            Granularity::Decade => key * 10 + 9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Year => "year",
            Granularity::Decade => "decade",
        }
    }

    pub fn axis_title(&self) -> &'static str {
        match self {
            Granularity::Year => "Year",
            Granularity::Decade => "Decade",
        }
    }
}

/// One animation step: every member shares `key`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderGroup<T> {
    pub key: i32,
    /// Index of this group in the run, used to pick its ramp color
    pub position: usize,
    pub members: Vec<T>,
    /// Members of this group and every group before it
    pub cumulative: usize,
}

impl<T> RenderGroup<T> {
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// Group by `granularity`, oldest first.
///
/// Input order does not matter: records are stable-sorted by date first, so a
/// key never shows up in two separate groups.
pub fn group_records<T: Dated>(mut records: Vec<T>, granularity: Granularity) -> Vec<RenderGroup<T>> {
    records.sort_by_key(|r| r.date());

    let mut groups: Vec<RenderGroup<T>> = Vec::new();
    let mut cumulative = 0;
    for record in records {
        let key = granularity.key(record.year());
        cumulative += 1;
        match groups.last_mut() {
            Some(group) if group.key == key => {
                group.members.push(record);
                group.cumulative = cumulative;
            }
            _ => {
                let position = groups.len();
                groups.push(RenderGroup {
                    key,
                    position,
                    members: vec![record],
                    cumulative,
                });
            }
        }
    }
    groups
}

/// `(first year of group, cumulative count)` pairs, ready for charting.
pub fn cumulative_series<T>(groups: &[RenderGroup<T>], granularity: Granularity) -> Vec<(i32, usize)> {
    groups
        .iter()
        .map(|g| (granularity.label(g.key), g.cumulative))
        .collect()
}
