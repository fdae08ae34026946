//! WASM bindings for a WebXR host
//!
//! Thin wrappers over the global `AppState`. Per frame the host calls
//! `begin_frame` once, then `update_hands` with both hand buffers after the
//! XR input source has delivered this frame's joint poses.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use wasm_bindgen::prelude::*;

use crate::clock::{FrameClock, PerformanceClock};
use crate::config::{EffectConfig, EffectMode, ToggleConfig};
use crate::hands::Hand;
use crate::state::{initialize_app_state, with_app_state, with_app_state_mut};
use crate::toggle::{BoxVolume, SphereVolume};

thread_local! {
    static CLOCK: RefCell<PerformanceClock> = RefCell::new(PerformanceClock::new());
}

fn hand_arg(hand: u8) -> Result<Hand, JsValue> {
    Hand::from_index(hand).ok_or_else(|| JsValue::from_str(&format!("Invalid hand index: {}", hand)))
}

fn not_initialized() -> JsValue {
    JsValue::from_str("Effect not initialized, call init_effect first")
}

/// Initialize the effect from JS config objects (missing fields use defaults)
#[wasm_bindgen]
pub fn init_effect(config: JsValue, toggle: JsValue) -> Result<(), JsValue> {
    crate::init_logging();

    let config: EffectConfig = if config.is_undefined() || config.is_null() {
        EffectConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
    };
    let toggle: ToggleConfig = if toggle.is_undefined() || toggle.is_null() {
        ToggleConfig::default()
    } else {
        serde_wasm_bindgen::from_value(toggle)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse toggle config: {}", e)))?
    };

    initialize_app_state(config.sanitized(), toggle);
    log::info!("Effect initialized: {:?}", config.mode);
    Ok(())
}

/// Initialize the effect from a built-in preset (`mild`, `moderate`, `severe`)
#[wasm_bindgen]
pub fn init_effect_preset(name: &str) -> Result<(), JsValue> {
    crate::init_logging();

    let config = EffectConfig::preset(name).map_err(|e| JsValue::from_str(&e.to_string()))?;
    initialize_app_state(config, ToggleConfig::default());
    log::info!("Effect initialized from preset: {}", name);
    Ok(())
}

/// Start a frame. `now_ms` is the XR frame time in milliseconds.
#[wasm_bindgen]
pub fn begin_frame(now_ms: f64) {
    with_app_state_mut(|app| {
        app.begin_frame_ms(now_ms);
    });
}

/// Start a frame timed by `performance.now()`, for hosts without an XR frame time
#[wasm_bindgen]
pub fn begin_frame_auto() {
    let now = CLOCK.with(|clock| clock.borrow_mut().tick().now);
    with_app_state_mut(|app| {
        app.begin_frame(now);
    });
}

/// Filter both hands in place (8 floats per joint, see `state`).
/// Pass an all-zero buffer for a hand that is not tracked.
#[wasm_bindgen]
pub fn update_hands(left: &mut [f32], right: &mut [f32]) -> Result<(), JsValue> {
    with_app_state_mut(|app| app.update_hands(left, right))
        .ok_or_else(not_initialized)?
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Filter one hand in place, for hosts that only track a single hand
#[wasm_bindgen]
pub fn update_hand(hand: u8, poses: &mut [f32]) -> Result<(), JsValue> {
    let hand = hand_arg(hand)?;
    with_app_state_mut(|app| app.update_hand(hand, poses))
        .ok_or_else(not_initialized)?
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Re-scan a hand's rig, seeding filter state from the given poses
#[wasm_bindgen]
pub fn rebuild_hand(hand: u8, poses: &[f32]) -> Result<(), JsValue> {
    let hand = hand_arg(hand)?;
    with_app_state_mut(|app| app.rebuild_hand(hand, poses))
        .ok_or_else(not_initialized)?
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn is_effect_enabled(hand: u8) -> bool {
    let Some(hand) = Hand::from_index(hand) else {
        return false;
    };
    with_app_state(|app| app.hands.hand(hand).enabled()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn set_effect_enabled(hand: u8, enabled: bool) {
    let Some(hand) = Hand::from_index(hand) else {
        return;
    };
    with_app_state(|app| app.hands.hand(hand).effect().flag().set(enabled));
}

/// Select `"latency"` or `"damping"`
#[wasm_bindgen]
pub fn set_effect_mode(mode: &str) -> Result<(), JsValue> {
    let mode = match mode {
        "latency" => EffectMode::Latency,
        "damping" => EffectMode::Damping,
        other => return Err(JsValue::from_str(&format!("Unknown mode: {}", other))),
    };
    with_app_state_mut(|app| app.hands.update_config(|c| c.mode = mode));
    log::info!("Effect mode set to: {:?}", mode);
    Ok(())
}

#[wasm_bindgen]
pub fn set_latency_seconds(seconds: f32) {
    with_app_state_mut(|app| app.hands.update_config(|c| c.latency_seconds = seconds));
}

#[wasm_bindgen]
pub fn set_damp_strength(strength: f32) {
    with_app_state_mut(|app| app.hands.update_config(|c| c.damp_strength = strength));
}

/// Bind a box-shaped toggle button (axis aligned)
#[wasm_bindgen]
pub fn set_button_box(cx: f32, cy: f32, cz: f32, hx: f32, hy: f32, hz: f32) {
    let volume = BoxVolume::axis_aligned(Vec3::new(cx, cy, cz), Vec3::new(hx, hy, hz).abs());
    with_app_state_mut(|app| app.hands.bind_button(Rc::new(volume)));
}

/// Bind a sphere-shaped toggle button
#[wasm_bindgen]
pub fn set_button_sphere(cx: f32, cy: f32, cz: f32, radius: f32) {
    let volume = SphereVolume {
        center: Vec3::new(cx, cy, cz),
        radius: radius.abs(),
    };
    with_app_state_mut(|app| app.hands.bind_button(Rc::new(volume)));
}

/// Register a box volume under a scene tag for `activate_toggles`
#[wasm_bindgen]
pub fn register_tagged_box(tag: &str, cx: f32, cy: f32, cz: f32, hx: f32, hy: f32, hz: f32) {
    let volume = BoxVolume::axis_aligned(Vec3::new(cx, cy, cz), Vec3::new(hx, hy, hz).abs());
    with_app_state_mut(|app| app.register_volume(tag, Rc::new(volume)));
}

/// Register a sphere volume under a scene tag for `activate_toggles`
#[wasm_bindgen]
pub fn register_tagged_sphere(tag: &str, cx: f32, cy: f32, cz: f32, radius: f32) {
    let volume = SphereVolume {
        center: Vec3::new(cx, cy, cz),
        radius: radius.abs(),
    };
    with_app_state_mut(|app| app.register_volume(tag, Rc::new(volume)));
}

/// Re-activate both toggles: forget the inside state and, where no button is
/// bound and auto-find is on, look the button up by its configured tag
#[wasm_bindgen]
pub fn activate_toggles() -> Result<(), JsValue> {
    with_app_state_mut(|app| app.activate_toggles()).ok_or_else(not_initialized)
}

/// Fixed latency buffer cap
#[wasm_bindgen]
pub fn max_buffer_length() -> usize {
    crate::effect_constants::MAX_BUFFER_LENGTH
}

/// Floats expected per hand buffer
#[wasm_bindgen]
pub fn floats_per_hand() -> usize {
    crate::state::FLOATS_PER_HAND
}

/// Current config as JSON
#[wasm_bindgen]
pub fn export_config_json() -> Result<String, JsValue> {
    with_app_state(|app| app.hands.config().to_json_string())
        .ok_or_else(not_initialized)?
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
