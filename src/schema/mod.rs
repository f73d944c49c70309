// src/schema/mod.rs
pub mod types;

pub use types::WellRecord;

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Published column list of the OSE points-of-diversion export, in file order.
pub const POD_HEADER: &str = "pod_basin|pod_nbr|pod_suffix|ref|pod_name|tws|rng|sec|qtr_4th|qtr_16th|qtr_64th|qtr_256th|qtr_1024th|qtr_4096|blk|zone|x|y|grant|legal|county|license_nbr|driller|start_date|finish_date|plug_date|pcw_rcv_date|elevation|depth_well|grnd_wtr_src|percent_shallow|depth_water|log_file_date|sched_date|usgs_map_code|usgs_map_suffix|usgs_map_quad1|usgs_map_quad2|use_of_well|pump_type|pump_serial|discharge|photo|photo_date|photo_punch|aquifer|sys_date|measure|subdiv_name|subdiv_location|municipality|municipality_loc|restrict|usgs_pod_nbr|lat_deg|lat_min|lat_sec|lon_deg|lon_min|lon_sec|surface_code|estimate_yield|pod_status|casing_size|ditch_name|utm_zone|easting|northing|datum|utm_source|utm_accuracy|xy_source|xy_accuracy|lat_lon_source|lat_lon_accuracy|tract_nbr|map_nbr|surv_map|other_loc|pod_rec_nbr|cfs_start_mday|cfs_end_mday|cfs_cnv_factor|cs_code|wrats_s_id|utm_error|pod_sub_basin|well_tag|static_level";

/// Column names split out of [`POD_HEADER`].
pub static POD_COLUMNS: Lazy<Vec<&'static str>> = Lazy::new(|| POD_HEADER.split('|').collect());

/// Column name → position in a row.
static COLUMN_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    POD_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, i))
        .collect()
});

/// Number of fields a well-formed row carries.
pub fn schema_width() -> usize {
    POD_COLUMNS.len()
}

/// Position of `name` in the published header, if it is one of ours.
pub fn column_index(name: &str) -> Option<usize> {
    COLUMN_INDEX.get(name).copied()
}

/// Fixed positions of the columns the pipeline reads by name.
pub mod col {
    pub const POD_BASIN: usize = 0;
    pub const POD_NBR: usize = 1;
    pub const POD_SUFFIX: usize = 2;
    pub const POD_NAME: usize = 4;
    pub const COUNTY: usize = 20;
    pub const START_DATE: usize = 23;
    pub const FINISH_DATE: usize = 24;
    pub const USE_OF_WELL: usize = 38;
    pub const POD_STATUS: usize = 62;
    pub const UTM_ZONE: usize = 65;
    pub const EASTING: usize = 66;
    pub const NORTHING: usize = 67;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_width_and_positions() {
        assert_eq!(schema_width(), 89);
        assert_eq!(column_index("pod_basin"), Some(col::POD_BASIN));
        assert_eq!(column_index("pod_nbr"), Some(col::POD_NBR));
        assert_eq!(column_index("pod_suffix"), Some(col::POD_SUFFIX));
        assert_eq!(column_index("pod_name"), Some(col::POD_NAME));
        assert_eq!(column_index("county"), Some(col::COUNTY));
        assert_eq!(column_index("start_date"), Some(col::START_DATE));
        assert_eq!(column_index("finish_date"), Some(col::FINISH_DATE));
        assert_eq!(column_index("use_of_well"), Some(col::USE_OF_WELL));
        assert_eq!(column_index("pod_status"), Some(col::POD_STATUS));
        assert_eq!(column_index("utm_zone"), Some(col::UTM_ZONE));
        assert_eq!(column_index("easting"), Some(col::EASTING));
        assert_eq!(column_index("northing"), Some(col::NORTHING));
        assert_eq!(column_index("no_such_column"), None);
    }
}
