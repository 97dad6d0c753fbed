//! parkobj core library: manifest types, run configuration, layout, errors.
//!
//! - [`types`]: [`ObjectRecord`], the [`ImageSet`] classification and
//!   [`ContainerReference`]
//! - [`config`]: external tools and [`BuildOptions`]
//! - [`layout`]: directory and file names the build works with
//! - [`error`]: [`ManifestError`]

pub mod config;
pub mod error;
pub mod layout;
pub mod types;

pub use config::{Archiver, ArchiverFlavor, BuildOptions, Tool, ToolConfig};
pub use error::ManifestError;
pub use layout::Layout;
pub use types::{ContainerReference, ImageSet, ObjectId, ObjectRecord};
