//! Typed wrappers for the Assetdesk REST endpoints

pub mod auth;
pub mod chat;
pub mod resources;

pub use resources::Resource;
