// src/project/mod.rs
pub mod utm;

pub use utm::UtmProjection;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info};

use crate::aggregate::Dated;
use crate::error::ProjectionError;
use crate::schema::WellRecord;

/// Zone → transform, built on first use and reused for the rest of the run.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    zones: HashMap<u8, Arc<UtmProjection>>,
    constructed: usize,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transform for `zone`, constructing it on a miss.
    pub fn get(&mut self, zone: u8) -> Result<Arc<UtmProjection>, ProjectionError> {
        if let Some(p) = self.zones.get(&zone) {
            return Ok(Arc::clone(p));
        }
        let p = Arc::new(UtmProjection::new(zone)?);
        self.constructed += 1;
        debug!(zone, "built UTM projection");
        self.zones.insert(zone, Arc::clone(&p));
        Ok(p)
    }

    /// (zone, easting, northing) → (lat, lon) in degrees.
    pub fn project(
        &mut self,
        zone: u8,
        easting: f64,
        northing: f64,
    ) -> Result<(f64, f64), ProjectionError> {
        self.get(zone)?.inverse(easting, northing)
    }

    /// How many transforms have been built so far (one per distinct zone).
    pub fn constructed(&self) -> usize {
        self.constructed
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// A record together with its geographic position.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedWell {
    pub record: WellRecord,
    pub lat: f64,
    pub lon: f64,
}

impl Dated for ProjectedWell {
    fn date(&self) -> NaiveDate {
        self.record.finish_date
    }
}

/// Project every record, failing on the first one whose zone cannot be handled.
#[tracing::instrument(level = "info", skip_all, fields(records = records.len()))]
pub fn project_wells(
    records: Vec<WellRecord>,
    cache: &mut ProjectionCache,
) -> Result<Vec<ProjectedWell>> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let (lat, lon) = cache
            .project(record.utm_zone, record.easting, record.northing)
            .with_context(|| format!("projecting POD {}", record.pod_id()))?;
        out.push(ProjectedWell { record, lat, lon });
    }
    info!(wells = out.len(), zones = cache.len(), "projected wells");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::fixtures::well;

    #[test]
    fn test_cache_reuses_transform_per_zone() {
        let mut cache = ProjectionCache::new();
        let a = cache.get(13).unwrap();
        let b = cache.get(13).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.constructed(), 1);

        for _ in 0..10 {
            cache.project(13, 350_000.0, 3_800_000.0).unwrap();
        }
        assert_eq!(cache.constructed(), 1);

        let c = cache.get(12).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.constructed(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let mut cache = ProjectionCache::new();
        let first = cache.project(13, 412_345.6, 3_876_543.2).unwrap();
        let second = cache.project(13, 412_345.6, 3_876_543.2).unwrap();
        assert!((first.0 - second.0).abs() < 1e-9);
        assert!((first.1 - second.1).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_zone_is_not_cached() {
        let mut cache = ProjectionCache::new();
        assert_eq!(
            cache.project(0, 350_000.0, 3_800_000.0),
            Err(ProjectionError::InvalidZone(0))
        );
        assert!(cache.is_empty());
        assert_eq!(cache.constructed(), 0);
    }

    #[test]
    fn test_project_wells() {
        let mut cache = ProjectionCache::new();
        let wells = project_wells(
            vec![
                well("RG", "1", "ACT", (1971, 1, 1)),
                well("RG", "2", "PLG", (1982, 1, 1)),
            ],
            &mut cache,
        )
        .unwrap();
        assert_eq!(wells.len(), 2);
        assert!((wells[0].lat - 34.330_445).abs() < 1e-5);
        assert!((wells[0].lon - -106.630_554).abs() < 1e-5);
        assert_eq!(cache.constructed(), 1);
    }

    #[test]
    fn test_project_wells_fails_on_bad_zone() {
        let mut cache = ProjectionCache::new();
        let mut bad = well("RG", "9", "ACT", (1990, 1, 1));
        bad.utm_zone = 99;
        let err = project_wells(vec![bad], &mut cache).unwrap_err();
        assert!(format!("{:#}", err).contains("RG 9"));
    }
}
