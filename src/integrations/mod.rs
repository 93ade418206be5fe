//! Web framework integrations.
//!
//! | Feature | Module |
//! |---------|--------|
//! | `axum-integration` | [`axum`](crate::integrations::axum) |

#[cfg(feature = "axum-integration")]
pub mod axum;
