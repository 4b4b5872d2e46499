//! Process-wide player and room registry for howl.
//!
//! The [`Registry`] owns the two tables every request starts from: nickname
//! to player entry, and room id to room handle. It allocates room ids,
//! enforces nickname uniqueness, and orchestrates join/leave so that a room
//! whose last member leaves is deregistered automatically.

mod error;
mod registry;

pub use error::RegistryError;
pub use registry::Registry;
