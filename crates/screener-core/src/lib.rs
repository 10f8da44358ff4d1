pub mod derived;
pub mod error;
pub mod provider;
pub mod snapshot;
pub mod traits;
pub mod types;

pub use error::*;
pub use provider::StaticMetricsProvider;
pub use snapshot::MetricSnapshot;
pub use traits::*;
pub use types::*;
