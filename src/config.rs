//! Effect configuration: mode selection, filter parameters and presets.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::effect_constants::{
    DEFAULT_BUTTON_TAG, DEFAULT_DAMP_STRENGTH, DEFAULT_LATENCY_SECONDS,
    DEFAULT_PROXIMITY_EPSILON, MAX_BUFFER_LENGTH, MAX_LATENCY_SECONDS, MIN_DAMP_STRENGTH,
    MIN_LATENCY_SECONDS,
};
use crate::error::ConfigError;

/// Which filter runs while the effect is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMode {
    /// Exponential smoothing toward the tracked pose
    Damping,
    /// Fixed-delay playback of the tracked pose
    #[default]
    Latency,
}

/// Mode resolved for one frame, including the disabled state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveMode {
    Off,
    Damping,
    Latency,
}

/// Filter parameters for the impairment effect.
///
/// Out-of-range values are clamped rather than rejected; see [`EffectConfig::sanitized`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Initial value of the effect flag
    pub enabled: bool,
    pub mode: EffectMode,
    /// Larger => converges faster (less sluggish)
    pub damp_strength: f32,
    /// Delay in seconds, clamped to [0, 1]
    pub latency_seconds: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: EffectMode::Latency,
            damp_strength: DEFAULT_DAMP_STRENGTH,
            latency_seconds: DEFAULT_LATENCY_SECONDS,
        }
    }
}

const PRESETS: [(&str, &str); 3] = [
    ("mild", include_str!("../presets/mild.json")),
    ("moderate", include_str!("../presets/moderate.json")),
    ("severe", include_str!("../presets/severe.json")),
];

impl EffectConfig {
    /// Parse from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EffectConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Convert to JSON string
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load one of the built-in presets (`mild`, `moderate`, `severe`)
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        PRESETS
            .iter()
            .find(|(preset, _)| *preset == name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
            .and_then(|(_, json)| Self::from_json(json))
    }

    /// Names of the built-in presets
    pub fn preset_names() -> impl Iterator<Item = &'static str> {
        PRESETS.iter().map(|(name, _)| *name)
    }

    /// Return a copy with numeric fields forced into safe ranges
    pub fn sanitized(self) -> Self {
        let latency_seconds = if self.latency_seconds.is_nan() {
            log::warn!("latency_seconds is NaN, using default");
            DEFAULT_LATENCY_SECONDS
        } else {
            let clamped = self
                .latency_seconds
                .clamp(MIN_LATENCY_SECONDS, MAX_LATENCY_SECONDS);
            if clamped != self.latency_seconds {
                log::warn!(
                    "latency_seconds {} clamped to {}",
                    self.latency_seconds,
                    clamped
                );
            }
            clamped
        };

        let damp_strength = if self.damp_strength.is_finite() {
            if self.damp_strength < MIN_DAMP_STRENGTH {
                log::warn!(
                    "damp_strength {} is below {}, the filter will use the floor",
                    self.damp_strength,
                    MIN_DAMP_STRENGTH
                );
            }
            self.damp_strength
        } else {
            log::warn!("damp_strength is not finite, using default");
            DEFAULT_DAMP_STRENGTH
        };

        Self {
            latency_seconds,
            damp_strength,
            ..self
        }
    }

    /// Damp strength as used by the filter, never below the convergence floor
    #[inline]
    pub fn effective_damp_strength(&self) -> f32 {
        self.damp_strength.max(MIN_DAMP_STRENGTH)
    }

    /// Fixed buffer cap shared by all latency filters
    #[inline]
    pub const fn max_buffer_length(&self) -> usize {
        MAX_BUFFER_LENGTH
    }

    /// Resolve the filter to run this frame given the current effect flag
    pub fn active_mode(&self, enabled: bool) -> ActiveMode {
        match (enabled, self.mode) {
            (false, _) => ActiveMode::Off,
            (true, EffectMode::Damping) => ActiveMode::Damping,
            (true, EffectMode::Latency) => ActiveMode::Latency,
        }
    }
}

/// Where an orchestrator reads its parameters from.
///
/// A global scope is one config shared by several orchestrators (both hands);
/// a local scope belongs to a single orchestrator. Built only through
/// [`ConfigScope::global`] / [`ConfigScope::local`], so values are always sanitized.
#[derive(Debug, Clone)]
pub struct ConfigScope(Scope);

#[derive(Debug, Clone)]
enum Scope {
    Global(Rc<RefCell<EffectConfig>>),
    Local(EffectConfig),
}

impl ConfigScope {
    /// Create a fresh shared config. Clone the scope to share it.
    pub fn global(config: EffectConfig) -> Self {
        Self(Scope::Global(Rc::new(RefCell::new(config.sanitized()))))
    }

    pub fn local(config: EffectConfig) -> Self {
        Self(Scope::Local(config.sanitized()))
    }

    pub fn is_global(&self) -> bool {
        matches!(self.0, Scope::Global(_))
    }

    /// Snapshot of the current parameters
    pub fn get(&self) -> EffectConfig {
        match &self.0 {
            Scope::Global(shared) => *shared.borrow(),
            Scope::Local(config) => *config,
        }
    }

    /// Mutate the parameters in place; changes to a global scope are seen by every holder
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut EffectConfig),
    {
        match &mut self.0 {
            Scope::Global(shared) => {
                let mut config = shared.borrow_mut();
                f(&mut *config);
                *config = config.sanitized();
            }
            Scope::Local(config) => {
                f(config);
                *config = config.sanitized();
            }
        }
    }
}

impl Default for ConfigScope {
    fn default() -> Self {
        Self::local(EffectConfig::default())
    }
}

/// Settings for the fingertip toggle button
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToggleConfig {
    /// Max fingertip distance from the button surface that counts as inside
    pub epsilon: f32,
    /// Share the effect flag with the other hand
    pub sync_with_other_hand: bool,
    /// Ask the host to locate the button by tag when none is bound
    pub auto_find_by_tag: bool,
    pub tag: String,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_PROXIMITY_EPSILON,
            sync_with_other_hand: true,
            auto_find_by_tag: true,
            tag: DEFAULT_BUTTON_TAG.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EffectConfig::default();
        assert!(config.enabled);
        assert_eq!(config.mode, EffectMode::Latency);
        assert_eq!(config.damp_strength, 3.0);
        assert!((config.latency_seconds - 0.35).abs() < 1e-6);
        assert_eq!(config.max_buffer_length(), 120);
    }

    #[test]
    fn test_parse_partial_json() {
        let config = EffectConfig::from_json(r#"{ "mode": "damping" }"#).unwrap();
        assert_eq!(config.mode, EffectMode::Damping);
        assert_eq!(config.damp_strength, DEFAULT_DAMP_STRENGTH);
    }

    #[test]
    fn test_latency_clamped() {
        let config = EffectConfig::from_json(r#"{ "latency_seconds": 4.0 }"#).unwrap();
        assert_eq!(config.latency_seconds, 1.0);

        let config = EffectConfig::from_json(r#"{ "latency_seconds": -0.5 }"#).unwrap();
        assert_eq!(config.latency_seconds, 0.0);
    }

    #[test]
    fn test_damp_strength_floor() {
        let config = EffectConfig {
            damp_strength: -2.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.effective_damp_strength(), MIN_DAMP_STRENGTH);

        let config = EffectConfig {
            damp_strength: f32::INFINITY,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.damp_strength, DEFAULT_DAMP_STRENGTH);
    }

    #[test]
    fn test_malformed_json_is_error() {
        let result = EffectConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_presets_load() {
        for name in EffectConfig::preset_names() {
            let config = EffectConfig::preset(name).unwrap();
            assert!(config.latency_seconds <= MAX_LATENCY_SECONDS);
        }
        assert_eq!(
            EffectConfig::preset("moderate").unwrap().mode,
            EffectMode::Latency
        );
        assert!(matches!(
            EffectConfig::preset("unknown"),
            Err(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_active_mode() {
        let mut config = EffectConfig::default();
        assert_eq!(config.active_mode(false), ActiveMode::Off);
        assert_eq!(config.active_mode(true), ActiveMode::Latency);
        config.mode = EffectMode::Damping;
        assert_eq!(config.active_mode(true), ActiveMode::Damping);
    }

    #[test]
    fn test_global_scope_is_shared() {
        let left = ConfigScope::global(EffectConfig::default());
        let mut right = left.clone();

        right.update(|c| c.mode = EffectMode::Damping);
        assert_eq!(left.get().mode, EffectMode::Damping);

        let mut local = ConfigScope::local(EffectConfig::default());
        local.update(|c| c.latency_seconds = 2.0);
        assert_eq!(local.get().latency_seconds, 1.0);
        assert_eq!(left.get().latency_seconds, DEFAULT_LATENCY_SECONDS);
    }

    #[test]
    fn test_scope_never_hands_out_unclamped_latency() {
        let wild = EffectConfig {
            latency_seconds: 5.0,
            damp_strength: f32::NAN,
            ..Default::default()
        };

        for mut scope in [ConfigScope::global(wild), ConfigScope::local(wild)] {
            assert_eq!(scope.get().latency_seconds, MAX_LATENCY_SECONDS);
            assert_eq!(scope.get().damp_strength, DEFAULT_DAMP_STRENGTH);

            scope.update(|c| c.latency_seconds = f32::NAN);
            assert_eq!(scope.get().latency_seconds, DEFAULT_LATENCY_SECONDS);
        }
        assert!(ConfigScope::global(wild).is_global());
        assert!(!ConfigScope::default().is_global());
    }

    #[test]
    fn test_json_round_trip_keeps_mode_name() {
        let json = EffectConfig::default().to_json_string().unwrap();
        assert!(json.contains("\"latency\""));
    }
}
