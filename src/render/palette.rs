//! Sequential color ramps for coloring groups by their place on the timeline.
//!
//! Ramps are embedded from `palettes.json` at compile time and looked up by
//! case-insensitive name.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::ColorScheme;

const PALETTES_JSON: &str = include_str!("palettes.json");

/// Global palette registry, initialized lazily on first access
pub static PALETTE_REGISTRY: Lazy<PaletteRegistry> = Lazy::new(|| {
    PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        tracing::error!("failed to load embedded palettes: {:#}", e);
        PaletteRegistry::default()
    })
});

#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    fn stop(&self, index: usize) -> [u8; 3] {
        self.colors
            .get(index)
            .and_then(|hex| parse_hex_color(hex))
            .unwrap_or([128, 128, 128])
    }

    /// Color at position t ∈ [0, 1]; values outside are clamped.
    pub fn interpolate(&self, t: f64) -> [u8; 3] {
        let n = self.colors.len();
        if n == 0 {
            return [128, 128, 128];
        }
        if n == 1 {
            return self.stop(0);
        }

        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (n - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(n - 1);
        let frac = pos - lo as f64;

        let a = self.stop(lo);
        let b = self.stop(hi);
        let mix = |i: usize| (a[i] as f64 * (1.0 - frac) + b[i] as f64 * frac).round() as u8;
        [mix(0), mix(1), mix(2)]
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    palettes: HashMap<String, PaletteDefinition>,
    names: Vec<String>,
}

impl PaletteRegistry {
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<PaletteDefinition> =
            serde_json::from_str(json).context("parsing palettes JSON")?;

        let mut registry = Self::default();
        for def in definitions {
            if let Some(bad) = def.colors.iter().find(|c| parse_hex_color(c).is_none()) {
                return Err(anyhow!("palette {} has invalid color {:?}", def.name, bad));
            }
            registry.names.push(def.name.clone());
            registry.palettes.insert(def.name.to_lowercase(), def);
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Parse `#RRGGBB` / `#RRGGBBAA` (alpha ignored), with or without the `#`.
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim().trim_start_matches('#');
    if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Resolved form of [`ColorScheme`].
#[derive(Debug, Clone)]
pub enum GroupColors {
    Uniform([u8; 3]),
    Ramp {
        palette: &'static PaletteDefinition,
        steps: usize,
    },
}

impl GroupColors {
    pub fn from_scheme(scheme: &ColorScheme) -> Result<Self> {
        match scheme {
            ColorScheme::Uniform { color } => parse_hex_color(color)
                .map(GroupColors::Uniform)
                .ok_or_else(|| anyhow!("invalid color {:?}", color)),
            ColorScheme::Ramp { palette, steps } => {
                let palette = PALETTE_REGISTRY
                    .get(palette)
                    .ok_or_else(|| anyhow!("unknown palette {:?}", palette))?;
                Ok(GroupColors::Ramp {
                    palette,
                    steps: (*steps).max(1),
                })
            }
        }
    }

    /// Color for the group at `position`: `palette(position / steps)`.
    pub fn color_for(&self, position: usize) -> [u8; 3] {
        match self {
            GroupColors::Uniform(rgb) => *rgb,
            GroupColors::Ramp { palette, steps } => {
                palette.interpolate(position as f64 / *steps as f64)
            }
        }
    }
}
