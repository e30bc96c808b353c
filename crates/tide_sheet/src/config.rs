//! Sheet configuration (tide.toml `[sheet]` style files)
//!
//! Every layout constant and velocity threshold the sheet uses lives here so
//! behavior can be tuned per device class and tested without a display.
//! All fields are optional in TOML; missing values take the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tide_animation::SpringConfig;

use crate::detent::SheetDetent;
use crate::error::{ConfigError, ConfigResult};

/// Top-level sheet configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SheetConfig {
    pub detents: DetentConfig,
    pub velocity: VelocityConfig,
    pub dimming: DimmingConfig,
    pub springs: SpringTuning,
    pub scroll: ContentScrollConfig,
    pub presenting: PresentingTransformConfig,
    /// Content offsets within this distance of the top count as "at top"
    pub scrolled_to_top_tolerance: f32,
    /// Maximum-detent progress at which the status bar switches to light content
    pub light_status_bar_progress: f32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            detents: DetentConfig::default(),
            velocity: VelocityConfig::default(),
            dimming: DimmingConfig::default(),
            springs: SpringTuning::default(),
            scroll: ContentScrollConfig::default(),
            presenting: PresentingTransformConfig::default(),
            scrolled_to_top_tolerance: 3.0,
            light_status_bar_progress: 0.5,
        }
    }
}

/// Visible sheet height per detent, as a fraction of screen height
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DetentConfig {
    pub maximum_fraction: f32,
    pub middle_fraction: f32,
    pub minimum_fraction: f32,
    /// Lift the minimum detent above the bottom safe area (home indicator)
    pub minimum_respects_safe_area: bool,
}

impl Default for DetentConfig {
    fn default() -> Self {
        Self {
            maximum_fraction: 0.92,
            middle_fraction: 0.54,
            minimum_fraction: 0.16,
            minimum_respects_safe_area: true,
        }
    }
}

impl DetentConfig {
    pub fn fraction(&self, detent: SheetDetent) -> f32 {
        match detent {
            SheetDetent::Maximum => self.maximum_fraction,
            SheetDetent::Middle => self.middle_fraction,
            SheetDetent::Minimum => self.minimum_fraction,
        }
    }
}

/// Release velocity thresholds in points per second
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Above this speed the middle detent is skipped
    pub skip_middle: f32,
    /// Above this downward speed the sheet dismisses (when enabled)
    pub fling_dismiss: f32,
    /// Upward speed that lifts a low sheet to the middle detent
    pub minimum_to_middle: f32,
    /// Magnitude substituted for infinite or NaN velocity samples
    pub non_finite_fallback: f32,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            skip_middle: SheetDetent::SKIP_MIDDLE_VELOCITY,
            fling_dismiss: SheetDetent::FLING_DISMISS_VELOCITY,
            minimum_to_middle: SheetDetent::MINIMUM_TO_MIDDLE_VELOCITY,
            non_finite_fallback: 10_000.0,
        }
    }
}

/// Dimming overlay alpha at each detent (zero at minimum)
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DimmingConfig {
    pub middle_alpha: f32,
    pub maximum_alpha: f32,
}

impl Default for DimmingConfig {
    fn default() -> Self {
        Self {
            middle_alpha: 0.25,
            maximum_alpha: 0.45,
        }
    }
}

/// Spring timing curves for snapping and dismissal
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpringTuning {
    /// Response (seconds) of snap animations
    pub snap_response: f32,
    /// Response (seconds) of the dismissal animation
    pub dismiss_response: f32,
    /// Damping ratio when released without velocity
    pub resting_damping_ratio: f32,
    /// Damping ratio when released with velocity
    pub moving_damping_ratio: f32,
    /// Remaining distances shorter than this start with zero velocity
    pub min_velocity_distance: f32,
}

impl Default for SpringTuning {
    fn default() -> Self {
        Self {
            snap_response: 0.45,
            dismiss_response: 0.35,
            resting_damping_ratio: 1.0,
            moving_damping_ratio: 0.82,
            min_velocity_distance: 0.5,
        }
    }
}

/// Content scroll physics
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentScrollConfig {
    /// Momentum deceleration in points/second²
    pub deceleration: f32,
    /// Momentum stops below this speed (points/second)
    pub velocity_threshold: f32,
    /// Maximum overscroll as a fraction of the visible height
    pub max_overscroll: f32,
    /// Resistance applied at the start of an overscroll
    pub resistance_start: f32,
    /// Resistance applied at maximum stretch
    pub resistance_end: f32,
    pub bounce_stiffness: f32,
    pub bounce_damping: f32,
}

impl Default for ContentScrollConfig {
    fn default() -> Self {
        let bounce = SpringConfig::edge_bounce();
        Self {
            deceleration: 1500.0,
            velocity_threshold: 10.0,
            max_overscroll: 0.3,
            resistance_start: 0.55,
            resistance_end: 0.10,
            bounce_stiffness: bounce.stiffness,
            bounce_damping: bounce.damping,
        }
    }
}

/// Transform applied to the presenting screen at full maximum progress
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PresentingTransformConfig {
    /// Scale of the presenting screen when the sheet is fully expanded
    pub scale_at_maximum: f32,
    /// Push the presenting screen down by the top safe-area inset
    pub translate_by_safe_area: bool,
    /// Extra downward translation at full progress
    pub extra_translation: f32,
}

impl Default for PresentingTransformConfig {
    fn default() -> Self {
        Self {
            scale_at_maximum: 0.92,
            translate_by_safe_area: true,
            extra_translation: 0.0,
        }
    }
}

impl SheetConfig {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: SheetConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check ordering and range constraints
    pub fn validate(&self) -> ConfigResult<()> {
        let d = &self.detents;
        let in_unit = |f: f32| f > 0.0 && f <= 1.0;
        if !(in_unit(d.maximum_fraction) && in_unit(d.middle_fraction) && in_unit(d.minimum_fraction))
        {
            return Err(ConfigError::Invalid(
                "detent fractions must be in (0, 1]".to_string(),
            ));
        }
        if !(d.maximum_fraction > d.middle_fraction && d.middle_fraction > d.minimum_fraction) {
            return Err(ConfigError::Invalid(format!(
                "detent fractions must decrease from maximum to minimum, got {} / {} / {}",
                d.maximum_fraction, d.middle_fraction, d.minimum_fraction
            )));
        }

        let v = &self.velocity;
        if v.skip_middle <= 0.0 || v.fling_dismiss <= 0.0 || v.minimum_to_middle <= 0.0 {
            return Err(ConfigError::Invalid(
                "velocity thresholds must be positive".to_string(),
            ));
        }

        let s = &self.springs;
        if s.snap_response <= 0.0 || s.dismiss_response <= 0.0 {
            return Err(ConfigError::Invalid(
                "spring responses must be positive".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.dimming.middle_alpha)
            || !(0.0..=1.0).contains(&self.dimming.maximum_alpha)
        {
            return Err(ConfigError::Invalid(
                "dimming alphas must be in [0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}
