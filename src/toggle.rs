//! Fingertip toggle button
//!
//! A `ToggleController` watches one tracked point against a proximity volume
//! and flips an `EffectFlag` on each outside -> inside transition. Flags are
//! shared by cloning: two controllers holding clones of one flag see each
//! other's flips immediately; controllers with separate flags never interact.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Quat, Vec3};

use crate::config::ToggleConfig;

/// Effect on/off cell. Clones share the same underlying value.
#[derive(Debug, Clone)]
pub struct EffectFlag(Rc<Cell<bool>>);

impl EffectFlag {
    pub fn new(enabled: bool) -> Self {
        Self(Rc::new(Cell::new(enabled)))
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.0.get()
    }

    #[inline]
    pub fn set(&self, enabled: bool) {
        self.0.set(enabled);
    }

    /// Invert the flag and return the new value
    pub fn flip(&self) -> bool {
        let enabled = !self.0.get();
        self.0.set(enabled);
        enabled
    }

    /// True if both handles refer to the same cell
    pub fn is_shared_with(&self, other: &EffectFlag) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for EffectFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Region the fingertip presses into
pub trait ProximityVolume {
    /// Closest point of the volume to `point`; `point` itself when inside.
    fn closest_point(&self, point: Vec3) -> Vec3;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereVolume {
    pub center: Vec3,
    pub radius: f32,
}

impl ProximityVolume for SphereVolume {
    fn closest_point(&self, point: Vec3) -> Vec3 {
        let offset = point - self.center;
        if offset.length_squared() <= self.radius * self.radius {
            point
        } else {
            self.center + offset.normalize_or_zero() * self.radius
        }
    }
}

/// Oriented box, the usual shape of a push button
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

impl BoxVolume {
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
            rotation: Quat::IDENTITY,
        }
    }
}

impl ProximityVolume for BoxVolume {
    fn closest_point(&self, point: Vec3) -> Vec3 {
        let local = self.rotation.inverse() * (point - self.center);
        let clamped = local.clamp(-self.half_extents, self.half_extents);
        self.center + self.rotation * clamped
    }
}

/// Host-side lookup of scene volumes by tag (bootstrap only)
pub trait VolumeLookup {
    fn find_by_tag(&self, tag: &str) -> Option<Rc<dyn ProximityVolume>>;
}

/// Volumes registered by the host under scene tags
#[derive(Default)]
pub struct TaggedVolumes {
    volumes: HashMap<String, Rc<dyn ProximityVolume>>,
}

impl TaggedVolumes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the volume for `tag`
    pub fn insert(&mut self, tag: impl Into<String>, volume: Rc<dyn ProximityVolume>) {
        self.volumes.insert(tag.into(), volume);
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        self.volumes.remove(tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

impl VolumeLookup for TaggedVolumes {
    fn find_by_tag(&self, tag: &str) -> Option<Rc<dyn ProximityVolume>> {
        self.volumes.get(tag).cloned()
    }
}

/// Edge-triggered toggle driven by a tracked point.
pub struct ToggleController {
    flag: EffectFlag,
    volume: Option<Rc<dyn ProximityVolume>>,
    config: ToggleConfig,
    was_inside: bool,
}

impl ToggleController {
    pub fn new(flag: EffectFlag, config: ToggleConfig) -> Self {
        Self {
            flag,
            volume: None,
            config,
            was_inside: false,
        }
    }

    /// Bind a volume explicitly
    pub fn with_volume(mut self, volume: Rc<dyn ProximityVolume>) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn bind_volume(&mut self, volume: Option<Rc<dyn ProximityVolume>>) {
        self.volume = volume;
    }

    pub fn has_volume(&self) -> bool {
        self.volume.is_some()
    }

    /// (Re)activate: forget the previous inside state and try to resolve the
    /// volume by tag if none is bound yet.
    pub fn activate(&mut self, lookup: Option<&dyn VolumeLookup>) {
        self.was_inside = false;

        if self.volume.is_some() || !self.config.auto_find_by_tag {
            return;
        }

        self.volume = lookup.and_then(|lookup| lookup.find_by_tag(&self.config.tag));
        if self.volume.is_none() {
            log::debug!("No toggle volume tagged '{}'", self.config.tag);
        }
    }

    /// Evaluate one frame. Returns true if the flag flipped.
    ///
    /// Skipped (no flip, state unchanged) when the point or the volume is missing.
    pub fn update(&mut self, point: Option<Vec3>) -> bool {
        let (Some(point), Some(volume)) = (point, self.volume.as_ref()) else {
            return false;
        };

        let closest = volume.closest_point(point);
        let epsilon = self.config.epsilon;
        let is_inside = closest.distance_squared(point) <= epsilon * epsilon;

        let flipped = is_inside && !self.was_inside;
        if flipped {
            let enabled = self.flag.flip();
            log::debug!("Effect toggled {}", if enabled { "on" } else { "off" });
        }

        self.was_inside = is_inside;
        flipped
    }

    pub fn is_inside(&self) -> bool {
        self.was_inside
    }

    pub fn flag(&self) -> &EffectFlag {
        &self.flag
    }

    pub fn config(&self) -> &ToggleConfig {
        &self.config
    }
}
