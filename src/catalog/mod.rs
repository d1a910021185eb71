//! Track selection and cover art from the Deezer public API.

/// Square cover download and resize.
pub mod cover;
/// Playlist and track/album lookups.
pub mod deezer;
