//! Model acquisition: reference parsing, candidate naming, hub access and
//! local storage.

pub mod candidates;
pub mod hub;
pub mod provision;
pub mod reference;
pub mod resolver;
pub mod store;

pub use hub::{ArtifactSource, HfHubSource, HubError};
pub use provision::ensure_artifact;
pub use reference::ModelReference;
pub use resolver::{ArtifactResolver, ResolvedArtifact};
pub use store::LocalStore;
