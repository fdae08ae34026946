pub mod id;
pub mod hierarchy;
pub mod pose;
pub mod registry;

pub use id::*;
pub use hierarchy::*;
pub use pose::*;
pub use registry::*;
