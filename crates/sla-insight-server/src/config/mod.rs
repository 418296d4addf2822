pub mod settings;
pub mod sla_policy;

pub use settings::*;
pub use sla_policy::SlaPolicy;
