//! # Overview
//!
//! Classifies document images as figures or tables, and locates figure/table regions
//! on page images, using the PubLayNet Detectron2 layout model from
//! [LayoutParser](https://github.com/Layout-Parser/layout-parser) exported to ONNX and
//! run through onnxruntime (bindings via [ort](https://github.com/pykeio/ort)).
//!
//! ```no_run
//! use classify_visual::{classify_image, ModelLoader, DEFAULT_MIN_SCORE};
//!
//! let loader = ModelLoader::new();
//! let result = classify_image(&loader, "figure.png".as_ref(), DEFAULT_MIN_SCORE)?;
//! println!("{}", serde_json::to_string(&result).unwrap());
//! # Ok::<(), classify_visual::Error>(())
//! ```

mod classify;
mod detected_block;
mod error;
mod loader;
mod regions;
mod utils;
pub mod visual;

pub use error::{Error, Result, SetupError};

// re-exports
pub use geo_types;
pub use image;
pub use ort;

pub mod models;

pub use classify::{classify_blocks, classify_image};
pub use detected_block::{BlockLabel, DetectedBlock};
pub use loader::{default_cache_dir, LocalModelConfig, ModelLoader};
pub use regions::{collect_regions, detect_regions};
pub use utils::round_score;

/// Confidence floor applied when the caller does not pick one.
pub const DEFAULT_MIN_SCORE: f32 = 0.5;
