pub mod real;
pub mod traits;

// Re-export I/O traits for convenient access
pub use real::{GitDiscovery, RealProcessRunner};
pub use traits::{Comment, CommentApi, Invocation, ProcessOutput, ProcessRunner, RepoDiscovery};
