//! Build script for effect preset validation
//!
//! This script runs at compile time and validates all preset JSON files
//! to ensure latency and damping values are inside the ranges the filters accept.

// Include the shared effect constants
#[path = "src/effect_constants.rs"]
mod effect_constants;

use effect_constants::{preset_in_range, LATENCY_RANGE, MIN_DAMP_STRENGTH};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Preset fields checked at build time. Other fields are ignored here.
#[derive(Debug, Deserialize)]
struct Preset {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default = "default_latency")]
    latency_seconds: f32,
    #[serde(default = "default_damp")]
    damp_strength: f32,
}

fn default_latency() -> f32 {
    effect_constants::DEFAULT_LATENCY_SECONDS
}

fn default_damp() -> f32 {
    effect_constants::DEFAULT_DAMP_STRENGTH
}

/// Validate a single preset file
fn validate_preset_file(path: &Path) -> Result<(), String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let preset: Preset = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    let mut errors = Vec::new();

    if let Some(mode) = preset.mode.as_deref() {
        if mode != "latency" && mode != "damping" {
            errors.push(format!("  unknown mode '{}'", mode));
        }
    }

    if !preset_in_range(preset.latency_seconds, preset.damp_strength) {
        errors.push(format!(
            "  latency_seconds {:.3} must be in [{}, {}], damp_strength {:.3} must be >= {}",
            preset.latency_seconds, LATENCY_RANGE.0, LATENCY_RANGE.1, preset.damp_strength,
            MIN_DAMP_STRENGTH
        ));
    }

    if errors.is_empty() {
        println!("cargo:warning=✓ {} validated", path.display());
        Ok(())
    } else {
        Err(format!(
            "Preset '{}' is out of range:\n{}",
            path.display(),
            errors.join("\n")
        ))
    }
}

fn main() {
    let preset_dir = Path::new("presets");

    if !preset_dir.exists() {
        println!("cargo:warning=Preset directory not found, skipping validation");
        return;
    }

    // Rerun if shared constants change
    println!("cargo:rerun-if-changed=src/effect_constants.rs");

    let mut has_errors = false;

    if let Ok(entries) = fs::read_dir(preset_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                println!("cargo:rerun-if-changed={}", path.display());

                if let Err(e) = validate_preset_file(&path) {
                    println!("cargo:warning=VALIDATION ERROR: {}", e);
                    has_errors = true;
                }
            }
        }
    }

    if has_errors {
        panic!("Preset validation failed! Fix the values in the preset files.");
    }

    println!("cargo:rerun-if-changed={}", preset_dir.display());
}
