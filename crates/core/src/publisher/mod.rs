//! Publisher module for making finished cuts reachable.
//!
//! A publisher takes a local file and a target name and returns the public
//! reference (usually a URL) recorded on the row. Two backends ship:
//! - [`ScpPublisher`] copies to a remote host with `scp`
//! - [`DirectoryPublisher`] copies into a local directory (a web root, a
//!   synced folder, or a test directory)

mod config;
mod directory;
mod error;
mod scp;
mod traits;

pub use config::{DirectoryConfig, PublisherBackend, PublisherConfig, ScpConfig};
pub use directory::DirectoryPublisher;
pub use error::PublishError;
pub use scp::ScpPublisher;
pub use traits::Publisher;

/// Builds the publisher selected by `config.backend`.
pub fn build_publisher(config: &PublisherConfig) -> Box<dyn Publisher> {
    match config.backend {
        PublisherBackend::Scp => Box::new(ScpPublisher::new(config.scp.clone())),
        PublisherBackend::Directory => Box::new(DirectoryPublisher::new(config.directory.clone())),
    }
}

/// Joins a base URL or remote path and a file name with exactly one `/`.
pub(crate) fn join_reference(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else if base.ends_with('/') || base.ends_with(':') {
        format!("{}{}", base, name)
    } else {
        format!("{}/{}", base, name)
    }
}
