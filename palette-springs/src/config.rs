use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::Error;
use crate::gradient::GradientConfig;
use crate::palette::GeneratorConfig;
use crate::spring::SpringParams;

/// Engine tuning, usually read from a TOML file. Every section and field is
/// optional and falls back to the built-in defaults.
///
/// ```toml
/// [spring]
/// spring_constant = 0.1
/// damping = 0.2
/// timestep = 1.0
///
/// [generator]
/// hues = [0, 60, 120, 180, 240, 300, 30, 90, 150, 210, 270, 330]
/// start_saturation = 40
/// tolerance = 0.005
///
/// [generator.luminance]
/// high = 0.5
/// mid = 0.216
/// low = 0.05
///
/// [gradient]
/// steps = 20
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub spring: SpringParams,
    pub generator: GeneratorConfig,
    pub gradient: GradientConfig,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;

        debug!("loaded config from {}", path.display());

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let SpringParams {
            spring_constant,
            damping,
            timestep,
        } = self.spring;

        if !spring_constant.is_finite() || spring_constant < 0.0 {
            return Err(invalid(format!("spring_constant {spring_constant} must be >= 0")));
        }

        if !(0.0..=1.0).contains(&damping) {
            return Err(invalid(format!("damping {damping} must be within [0, 1]")));
        }

        if !timestep.is_finite() || timestep <= 0.0 {
            return Err(invalid(format!("timestep {timestep} must be > 0")));
        }

        let generator = &self.generator;

        if let Some(h) = generator.hues.iter().find(|h| !h.is_finite()) {
            return Err(invalid(format!("hue {h} is not a number")));
        }

        if !(0.0..=100.0).contains(&generator.start_saturation) {
            return Err(invalid(format!(
                "start_saturation {} must be within [0, 100]",
                generator.start_saturation
            )));
        }

        if generator.tolerance.is_nan() || generator.tolerance <= 0.0 {
            return Err(invalid(format!(
                "tolerance {} must be > 0",
                generator.tolerance
            )));
        }

        let lum = generator.luminance;

        for (name, value) in [("high", lum.high), ("mid", lum.mid), ("low", lum.low)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("luminance.{name} {value} must be within [0, 1]")));
            }
        }

        Ok(())
    }
}

fn invalid(reason: String) -> Error {
    Error::InvalidConfig(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.spring.spring_constant, 0.1);
        assert_eq!(config.generator.luminance.mid, 0.216);
        assert_eq!(config.gradient.steps, 20);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [spring]
            damping = 0.5

            [generator.luminance]
            low = 0.02
            "#,
        )
        .unwrap();

        assert_eq!(config.spring.damping, 0.5);
        assert_eq!(config.spring.timestep, 1.0);
        assert_eq!(config.generator.luminance.low, 0.02);
        assert_eq!(config.generator.luminance.high, 0.5);
    }

    #[test]
    fn integer_hues_are_accepted() {
        let config = EngineConfig::from_toml_str(
            "[generator]\nhues = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120]\n",
        )
        .unwrap();

        assert_eq!(config.generator.hues[11], 120.0);
    }

    #[test]
    fn wrong_hue_count_fails_to_decode() {
        let result = EngineConfig::from_toml_str("[generator]\nhues = [0, 60, 120]\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn out_of_range_values_are_invalid() {
        for doc in [
            "[spring]\ndamping = 1.5\n",
            "[spring]\ntimestep = 0.0\n",
            "[spring]\nspring_constant = -1.0\n",
            "[generator]\ntolerance = 0.0\n",
            "[generator]\nstart_saturation = 120.0\n",
            "[generator.luminance]\nhigh = 2.0\n",
        ] {
            let result = EngineConfig::from_toml_str(doc);
            assert!(matches!(result, Err(Error::InvalidConfig(_))), "{doc}: {result:?}");
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = EngineConfig::load("/nonexistent/palette-springs.toml");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
