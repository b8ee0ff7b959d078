//! Manifest metadata resolution.
//!
//! Resolves the provider's current manifest version and the per-language
//! archive locations. The API key is an explicit argument to every call;
//! nothing in this module stores one.
//!
//! # Example
//!
//! ```no_run
//! use manifest_core::manifest::{ApiKey, ManifestResolver};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = ManifestResolver::new()?;
//! let key = ApiKey::from_env("BUNGIE_API_KEY").ok_or("missing key")?;
//! let descriptor = resolver.resolve(&key).await?;
//! println!("manifest {}", descriptor.version);
//! # Ok(())
//! # }
//! ```

mod credential;
mod error;
mod resolver;

pub use credential::ApiKey;
pub use error::ManifestError;
pub use resolver::{ManifestDescriptor, ManifestResolver};
