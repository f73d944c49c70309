// src/fetch/mod.rs
pub mod tiles;

pub use tiles::{tile_source_from_config, BlankTileSource, HttpTileSource, TileSource, TILE_SIZE};
