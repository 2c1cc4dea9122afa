//! Repositories, each adding methods to `HubDb` via `impl HubDb` blocks.

pub mod journal;
pub mod records;
