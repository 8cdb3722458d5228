//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FundingConfig (validated, immutable)
//!     → CLI overrides applied by the binary
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The funding key is never read from the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AccountsConfig, DepositorConfig, FundingConfig, ObservabilityConfig, RpcConfig};
pub use validation::{parse_amount, validate_config, ValidationError};
