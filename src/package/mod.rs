//! Package metadata: the package manager's listing and release versions.

mod listing;
mod version;

pub use listing::{ListedDependency, PackageListing};
pub use version::{VersionCheck, VersionComponent, VersionError};
