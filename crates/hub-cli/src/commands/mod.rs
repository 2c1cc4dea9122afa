pub mod agent;
pub mod cleanup;
pub mod dispatch;
pub mod forget;
pub mod info;
pub mod mine;
pub mod pack;
pub mod plugins;
pub mod publish;
pub mod releases;
pub mod serve;
pub mod shared;
pub mod validate;
