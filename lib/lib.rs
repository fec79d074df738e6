pub(crate) mod util;

pub mod assets;
pub mod config;
pub mod manifest;
pub mod release;
pub mod repo;
pub mod result;
pub mod sources;
pub mod updater;
