//! Per-bone temporal filters
//!
//! - **TemporalBuffer**: fixed-delay playback (latency mode)
//! - **DampState**: exponential convergence (damping mode)
//!
//! Both advance once per frame and hold no reference to the rig.

pub mod damping;
pub mod latency;

pub use damping::DampState;
pub use latency::TemporalBuffer;
