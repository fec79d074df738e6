mod client;
mod probe;

pub mod github;

pub use self::github::GithubProvider;
pub use self::probe::{HttpProbe, MetadataProbe, RemoteMetadata};
