//! Point export for GIS tools: an ESRI shapefile for `.shp` paths, GeoJSON
//! for anything else. Both carry `name` and `status` per well.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use std::{fs::File, io::BufWriter, path::Path};
use tracing::{info, instrument};

use super::ensure_parent;
use crate::config::{StatusCodes, StatusFilter};
use crate::project::ProjectedWell;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Point,
    pub properties: PointProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointProperties {
    pub name: String,
    pub status: String,
}

impl From<&ProjectedWell> for Feature {
    fn from(w: &ProjectedWell) -> Self {
        Feature {
            kind: "Feature".into(),
            geometry: Point {
                kind: "Point".into(),
                coordinates: [w.lon, w.lat],
            },
            properties: PointProperties {
                name: w.record.pod_id(),
                status: w.record.pod_status.clone(),
            },
        }
    }
}

pub fn feature_collection(
    wells: &[ProjectedWell],
    filter: StatusFilter,
    codes: &StatusCodes,
) -> FeatureCollection {
    FeatureCollection {
        kind: "FeatureCollection".into(),
        features: wells
            .iter()
            .filter(|w| filter.matches(&w.record.pod_status, codes))
            .map(Feature::from)
            .collect(),
    }
}

/// dbase character column widths.
const NAME_WIDTH: u8 = 64;
const STATUS_WIDTH: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointFormat {
    Shapefile,
    GeoJson,
}

impl PointFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("shp") => PointFormat::Shapefile,
            _ => PointFormat::GeoJson,
        }
    }
}

/// Write the wells selected by `filter` and return how many were written.
#[instrument(level = "info", skip(wells, codes), fields(path = %path.display()))]
pub fn write_points(
    path: &Path,
    wells: &[ProjectedWell],
    filter: StatusFilter,
    codes: &StatusCodes,
) -> Result<usize> {
    ensure_parent(path)?;
    let format = PointFormat::from_path(path);
    let n = match format {
        PointFormat::Shapefile => {
            let selected: Vec<&ProjectedWell> = wells
                .iter()
                .filter(|w| filter.matches(&w.record.pod_status, codes))
                .collect();
            write_shapefile(path, &selected)?;
            selected.len()
        }
        PointFormat::GeoJson => {
            let collection = feature_collection(wells, filter, codes);
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer(BufWriter::new(file), &collection)
                .with_context(|| format!("writing {}", path.display()))?;
            collection.features.len()
        }
    };

    info!(features = n, filter = filter.as_str(), ?format, "wrote points");
    Ok(n)
}

fn field_name(name: &str) -> Result<FieldName> {
    FieldName::try_from(name).map_err(|e| anyhow!("dbase field name {:?}: {:?}", name, e))
}

fn truncate(s: &str, width: u8) -> String {
    s.chars().take(width as usize).collect()
}

/// Point shapes in (lon, lat) with a `name` / `status` attribute table.
fn write_shapefile(path: &Path, wells: &[&ProjectedWell]) -> Result<()> {
    let table = TableWriterBuilder::new()
        .add_character_field(field_name("name")?, NAME_WIDTH)
        .add_character_field(field_name("status")?, STATUS_WIDTH);
    let mut writer = shapefile::Writer::from_path(path, table)
        .map_err(|e| anyhow!("creating shapefile {}: {}", path.display(), e))?;

    for w in wells {
        let mut record = Record::default();
        record.insert(
            "name".to_string(),
            FieldValue::Character(Some(truncate(&w.record.pod_id(), NAME_WIDTH))),
        );
        record.insert(
            "status".to_string(),
            FieldValue::Character(Some(truncate(&w.record.pod_status, STATUS_WIDTH))),
        );
        writer
            .write_shape_and_record(&shapefile::Point::new(w.lon, w.lat), &record)
            .map_err(|e| {
                anyhow!("writing POD {} to {}: {}", w.record.pod_id(), path.display(), e)
            })?;
    }
    Ok(())
}
