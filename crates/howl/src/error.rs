//! Unified error type for the howl crates.

use howl_registry::RegistryError;
use howl_room::RoomError;

/// Top-level error that wraps the crate-specific errors.
///
/// When using the `howl` meta-crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]` attribute
/// on each variant lets the `?` operator convert sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum HowlError {
    /// A registry-level error (nickname taken, room not found, room full).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A room-level error (insufficient players, no vote open, invariants).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_registry_error() {
        let err = RegistryError::DuplicateNickname("alice".into());
        let howl_err: HowlError = err.into();
        assert!(matches!(howl_err, HowlError::Registry(_)));
        assert!(howl_err.to_string().contains("alice"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::InsufficientPlayers { need: 7, have: 2 };
        let howl_err: HowlError = err.into();
        assert!(matches!(howl_err, HowlError::Room(_)));
        assert!(howl_err.to_string().contains("2 of 7"));
    }
}
