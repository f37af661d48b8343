pub mod notifier;
pub mod protocol;
pub mod registry;
pub mod session;

pub use notifier::Notifier;
pub use registry::{ConnectionRegistry, Delivery};
