pub mod gradients;
pub mod network;
pub mod spec;

pub use gradients::Gradients;
pub use network::{Network, NetworkState};
pub use spec::NetworkSpec;
