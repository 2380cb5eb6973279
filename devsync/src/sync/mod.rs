//! Device state synchronization

pub mod dispatcher;
pub mod normalize;
pub mod reconciler;
pub mod sampler;
pub mod sink;
