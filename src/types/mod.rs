// ABOUTME: Validated domain types shared across configuration, planning and events.
// ABOUTME: Release names and namespaces are checked once at the config boundary.

mod namespace;
mod release_name;
mod run_id;

pub use namespace::{Namespace, NamespaceError};
pub use release_name::{MAX_RELEASE_NAME_LEN, ReleaseName, ReleaseNameError};
pub use run_id::RunId;
