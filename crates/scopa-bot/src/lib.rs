pub mod policy;

pub use policy::{Policy, PolicyConfig, PolicyContext, PolicySeat, RandomPolicy};
