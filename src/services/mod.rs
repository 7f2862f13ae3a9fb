pub mod fs;
pub mod log_dirs;

#[cfg(feature = "cli")]
pub mod tracing_setup;
