//! Numeric color-space engine for a 60-entry HSL palette.
//!
//! - [`color`]: HSL → sRGB → relative luminance, and the lightness estimate
//!   used by the relaxation.
//! - [`search`]: inverse searches from a target luminance back to HSL.
//! - [`spring`]: spring relaxation over connected palette entries.
//! - [`gradient`]: interpolation sequences under several policies.
//!
//! The remaining modules sit at the engine's boundary: palette generation,
//! the text listing format, configuration and an application-side store.

pub mod color;
pub mod config;
mod error;
pub mod gradient;
pub mod interchange;
pub mod opponent;
pub mod palette;
pub mod search;
pub mod spring;
pub mod store;

pub use color::Color;
pub use config::EngineConfig;
pub use error::Error;
pub use palette::Palette;
pub use spring::{LockedSet, SpringNetwork};
