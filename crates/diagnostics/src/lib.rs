mod local_tracing;

pub use miette;
pub use tracing;

pub use local_tracing::enable_tracing_by_env;
