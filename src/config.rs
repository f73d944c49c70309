//! Run configuration
//!
//! Everything the pipeline does is decided here, once, before the first row is
//! read. A YAML file can override any subset of the defaults; the defaults
//! reproduce the classic "decade animation over New Mexico" run.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::aggregate::Granularity;
use crate::render::palette::{parse_hex_color, PALETTE_REGISTRY};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipe-delimited POD export to read
    pub input: PathBuf,

    /// Directory every relative output path is resolved against
    pub output_dir: PathBuf,

    /// Group wells by finish year or by finish decade
    pub granularity: Granularity,

    pub filter: FilterConfig,
    pub map: MapConfig,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub colors: ColorScheme,
    pub overlay: OverlayConfig,

    /// Logo composited bottom-right on every animation frame
    pub logo: Option<PathBuf>,

    pub animation: AnimationConfig,

    /// When set, every animation frame is also written here as a PNG
    pub frames_dir: Option<PathBuf>,

    /// Cumulative count chart; `None` disables it
    pub chart: Option<ChartConfig>,

    /// Point dataset for GIS tools (`.shp` or GeoJSON); `None` disables it
    pub points: Option<PointsConfig>,

    pub static_maps: StaticMapsConfig,
    pub status: StatusCodes,

    /// Free-text speech-bubble labels pinned to coordinates
    pub callouts: Vec<CalloutConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("static/data/pod__04-01-2022.txt"),
            output_dir: PathBuf::from("output"),
            granularity: Granularity::Decade,
            filter: FilterConfig::default(),
            map: MapConfig::default(),
            colors: ColorScheme::default(),
            overlay: OverlayConfig::default(),
            logo: None,
            animation: AnimationConfig::default(),
            frames_dir: None,
            chart: Some(ChartConfig::default()),
            points: None,
            static_maps: StaticMapsConfig::default(),
            status: StatusCodes::default(),
            callouts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Basins whose rows are dropped outright
    pub excluded_basins: Vec<String>,
    /// Inclusive finish-year window
    pub min_year: i32,
    pub max_year: i32,
    /// Abort on the first unparseable date instead of skipping the row
    pub strict_dates: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_basins: vec!["SP".into(), "SD".into()],
            min_year: 1900,
            max_year: 2022,
            strict_dates: true,
        }
    }
}

impl FilterConfig {
    pub fn is_excluded(&self, basin: &str) -> bool {
        self.excluded_basins.iter().any(|b| b == basin)
    }

    pub fn year_in_range(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    /// Slippy-map zoom level
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    /// Marker radius in pixels
    pub marker_radius: u32,
    pub tiles: TilesConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 34.5,
            center_lon: -106.0,
            zoom: 7,
            width: 800,
            height: 800,
            marker_radius: 2,
            tiles: TilesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Http,
    Blank,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesConfig {
    pub kind: TileKind,
    /// `{z}`, `{x}` and `{y}` are substituted per tile
    pub url_template: String,
    pub user_agent: String,
    /// Downloaded tiles are kept here and reused on later runs
    pub cache_dir: Option<PathBuf>,
    /// Background for `kind: blank`
    pub blank_color: String,
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self {
            kind: TileKind::Http,
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            user_agent: concat!("podviz/", env!("CARGO_PKG_VERSION")).into(),
            cache_dir: Some(PathBuf::from("tile_cache")),
            blank_color: "#f2efe9".into(),
        }
    }
}

/// How frame markers are colored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Every group in the same color
    Uniform { color: String },
    /// Group `i` gets `palette(i / steps)`
    Ramp { palette: String, steps: usize },
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::Ramp {
            palette: "magma".into(),
            steps: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,
    /// TrueType font used for every piece of text we draw
    pub font_path: PathBuf,
    pub font_size: u32,
    /// Distance from the top edge to the first text line, in pixels
    pub top_offset: i32,
    pub line_spacing: i32,
    /// Second line with the running POD total
    pub show_cumulative: bool,
    pub color: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            font_size: 40,
            top_offset: 50,
            line_spacing: 8,
            show_cumulative: true,
            color: "#000000".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    pub frame_duration_ms: u32,
    /// Defaults to `drill_<granularity>_<duration>[_with_n][_<palette>].gif`
    pub file_name: Option<String>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frame_duration_ms: 500,
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cumulative_pods.png"),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    pub path: PathBuf,
    pub filter: StatusFilter,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("pods.shp"),
            filter: StatusFilter::Combined,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticMapsConfig {
    /// One PNG per entry, named `pods_<filter>.png`
    pub filters: Vec<StatusFilter>,
    pub active_color: String,
    pub other_color: String,
}

impl Default for StaticMapsConfig {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            active_color: "#2ca02c".into(),
            other_color: "#d62728".into(),
        }
    }
}

/// Which wells a status-based output includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    Active,
    Plugged,
    NonActive,
    /// Everything, with active wells told apart from the rest
    Combined,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::Plugged => "plugged",
            StatusFilter::NonActive => "non-active",
            StatusFilter::Combined => "combined",
        }
    }

    pub fn matches(&self, status: &str, codes: &StatusCodes) -> bool {
        match self {
            StatusFilter::Active => codes.is_active(status),
            StatusFilter::Plugged => codes.is_plugged(status),
            StatusFilter::NonActive => !codes.is_active(status),
            StatusFilter::Combined => true,
        }
    }
}

/// `pod_status` values that count as active or plugged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCodes {
    pub active: Vec<String>,
    pub plugged: Vec<String>,
}

impl Default for StatusCodes {
    fn default() -> Self {
        Self {
            active: vec!["ACT".into()],
            plugged: vec!["PLG".into()],
        }
    }
}

impl StatusCodes {
    pub fn is_active(&self, status: &str) -> bool {
        let status = status.trim();
        self.active.iter().any(|c| c.eq_ignore_ascii_case(status))
    }

    pub fn is_plugged(&self, status: &str) -> bool {
        let status = status.trim();
        self.plugged.iter().any(|c| c.eq_ignore_ascii_case(status))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalloutConfig {
    pub lat: f64,
    pub lon: f64,
    pub text: String,
}

impl Config {
    /// Load `path` as YAML on top of the defaults, or return the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(p) => {
                let file = File::open(p)
                    .with_context(|| format!("opening config {}", p.display()))?;
                serde_yaml::from_reader(BufReader::new(file))
                    .with_context(|| format!("parsing config {}", p.display()))?
            }
            None => Config::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that would only fail halfway through a run.
    pub fn validate(&self) -> Result<()> {
        if self.filter.min_year > self.filter.max_year {
            bail!(
                "filter.min_year {} is after filter.max_year {}",
                self.filter.min_year,
                self.filter.max_year
            );
        }
        if self.map.zoom > 19 {
            bail!("map.zoom {} is beyond slippy-map range 0..=19", self.map.zoom);
        }
        if self.map.width == 0 || self.map.height == 0 {
            bail!("map size must be non-zero");
        }
        match &self.colors {
            ColorScheme::Uniform { color } => {
                parse_hex_color(color)
                    .with_context(|| format!("colors.uniform.color {:?}", color))?;
            }
            ColorScheme::Ramp { palette, steps } => {
                if PALETTE_REGISTRY.get(palette).is_none() {
                    bail!(
                        "unknown palette {:?}; known: {}",
                        palette,
                        PALETTE_REGISTRY.names().join(", ")
                    );
                }
                if *steps == 0 {
                    bail!("colors.ramp.steps must be at least 1");
                }
            }
        }
        for (what, hex) in [
            ("overlay.color", &self.overlay.color),
            ("map.tiles.blank_color", &self.map.tiles.blank_color),
            ("static_maps.active_color", &self.static_maps.active_color),
            ("static_maps.other_color", &self.static_maps.other_color),
        ] {
            parse_hex_color(hex).with_context(|| format!("{} {:?}", what, hex))?;
        }
        if self.animation.frame_duration_ms == 0 {
            bail!("animation.frame_duration_ms must be positive");
        }
        Ok(())
    }

    /// Resolve `p` against `output_dir` unless it is already absolute.
    pub fn output_path(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.output_dir.join(p)
        }
    }

    pub fn animation_path(&self) -> PathBuf {
        let name = match &self.animation.file_name {
            Some(name) => name.clone(),
            None => {
                let mut name = format!(
                    "drill_{}_{}",
                    self.granularity.as_str(),
                    self.animation.frame_duration_ms
                );
                if self.overlay.show_cumulative {
                    name.push_str("_with_n");
                }
                if let ColorScheme::Ramp { palette, .. } = &self.colors {
                    name.push('_');
                    name.push_str(palette);
                }
                name.push_str(".gif");
                name
            }
        };
        self.output_dir.join(name)
    }

    /// Whether any enabled output draws text and therefore needs the font.
    pub fn needs_font(&self) -> bool {
        let frames = self.animation.enabled || self.frames_dir.is_some();
        (frames && self.overlay.enabled) || self.chart.is_some() || !self.callouts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() -> Result<()> {
        let cfg = Config::default();
        cfg.validate()?;
        assert_eq!(cfg.granularity, Granularity::Decade);
        assert!(cfg.filter.is_excluded("SP"));
        assert!(cfg.filter.is_excluded("SD"));
        assert!(!cfg.filter.is_excluded("RG"));
        assert_eq!(
            cfg.animation_path(),
            PathBuf::from("output/drill_decade_500_with_n_magma.gif")
        );
        Ok(())
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() -> Result<()> {
        let yaml = r##"
input: wells.txt
granularity: year
colors:
  uniform:
    color: "#ff0000"
map:
  zoom: 6
  tiles:
    kind: blank
static_maps:
  filters: [active, non-active, combined]
points:
  path: out/pods.geojson
  filter: plugged
"##;
        let mut f = NamedTempFile::new()?;
        f.write_all(yaml.as_bytes())?;
        let cfg = Config::load(Some(f.path()))?;
        assert_eq!(cfg.input, PathBuf::from("wells.txt"));
        assert_eq!(cfg.granularity, Granularity::Year);
        assert_eq!(cfg.map.zoom, 6);
        assert_eq!(cfg.map.width, 800);
        assert_eq!(cfg.map.tiles.kind, TileKind::Blank);
        assert_eq!(
            cfg.static_maps.filters,
            vec![
                StatusFilter::Active,
                StatusFilter::NonActive,
                StatusFilter::Combined
            ]
        );
        let points = cfg.points.as_ref().expect("points configured");
        assert_eq!(points.filter, StatusFilter::Plugged);
        assert_eq!(cfg.filter.min_year, 1900);
        assert_eq!(
            cfg.animation_path(),
            PathBuf::from("output/drill_year_500_with_n.gif")
        );
        Ok(())
    }

    fn load_yaml(yaml: &str) -> Result<Config> {
        let mut f = NamedTempFile::new()?;
        f.write_all(yaml.as_bytes())?;
        Config::load(Some(f.path()))
    }

    #[test]
    fn test_color_scheme_variants_from_yaml() -> Result<()> {
        let cfg = load_yaml("colors:\n  ramp:\n    palette: viridis\n    steps: 8\n")?;
        assert_eq!(
            cfg.colors,
            ColorScheme::Ramp {
                palette: "viridis".into(),
                steps: 8
            }
        );
        assert_eq!(
            cfg.animation_path(),
            PathBuf::from("output/drill_decade_500_with_n_viridis.gif")
        );

        let cfg = load_yaml("colors:\n  uniform:\n    color: \"#ff0000\"\n")?;
        assert_eq!(
            cfg.colors,
            ColorScheme::Uniform {
                color: "#ff0000".into()
            }
        );

        assert!(load_yaml("colors:\n  ramp:\n    palette: nope\n    steps: 8\n").is_err());
        Ok(())
    }

    #[test]
    fn test_color_scheme_round_trips_through_yaml() -> Result<()> {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg)?;
        assert!(yaml.contains("ramp:"));
        let back: Config = serde_yaml::from_str(&yaml)?;
        assert_eq!(back.colors, cfg.colors);
        Ok(())
    }

    #[test]
    fn test_validate_rejects_unknown_palette() {
        let cfg = Config {
            colors: ColorScheme::Ramp {
                palette: "rainbow-unicorn".into(),
                steps: 12,
            },
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_years() {
        let mut cfg = Config::default();
        cfg.filter.min_year = 2000;
        cfg.filter.max_year = 1990;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_status_filters() {
        let codes = StatusCodes::default();
        assert!(StatusFilter::Active.matches("ACT", &codes));
        assert!(StatusFilter::Active.matches(" act ", &codes));
        assert!(!StatusFilter::Active.matches("PLG", &codes));
        assert!(StatusFilter::Plugged.matches("PLG", &codes));
        assert!(StatusFilter::NonActive.matches("PLG", &codes));
        assert!(StatusFilter::NonActive.matches("", &codes));
        assert!(!StatusFilter::NonActive.matches("ACT", &codes));
        assert!(StatusFilter::Combined.matches("anything", &codes));
    }

    #[test]
    fn test_output_path_resolution() {
        let cfg = Config::default();
        assert_eq!(
            cfg.output_path(Path::new("chart.png")),
            PathBuf::from("output/chart.png")
        );
        assert_eq!(
            cfg.output_path(Path::new("/tmp/chart.png")),
            PathBuf::from("/tmp/chart.png")
        );
    }
}
