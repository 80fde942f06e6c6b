//! Layered configuration for `reqbind` binders.
//!
//! Loads a [`BindConfig`](reqbind::BindConfig) from:
//! - built-in defaults
//! - a TOML or JSON file (unknown keys are rejected)
//! - environment variables (`PREFIX__VACUUM`, `PREFIX__MAX_BODY_SIZE`,
//!   `PREFIX__MAX_MULTIPART_FIELDS`)
//!
//! and validates that both limits are non-zero.
//!
//! # Example
//!
//! ```no_run
//! use reqbind_config::ConfigLoader;
//!
//! # fn main() -> Result<(), reqbind_config::ConfigError> {
//! let binder = ConfigLoader::new()
//!     .with_optional_file("reqbind.toml")?
//!     .with_env_prefix("REQBIND")
//!     .load_binder()?;
//!
//! println!("vacuum enabled: {}", binder.config().vacuum);
//! # Ok(())
//! # }
//! ```
//!
//! # File Format
//!
//! ```toml
//! vacuum = true
//! max_body_size = 1048576
//! max_multipart_fields = 100
//! ```

#![doc(html_root_url = "https://docs.rs/reqbind-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::{validate, ConfigLoader};
