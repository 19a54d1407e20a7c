//! Resource clients layered over [`Session`](crate::http::Session).

pub mod devices;
pub mod legal_hold;

pub use devices::{DeviceClient, DeviceQuery};
pub use legal_hold::{LegalHoldClient, LegalHoldQuery, MembershipQuery, NewLegalHold};

/// `base/<id>` with `id` percent-encoded as a single path segment.
pub(crate) fn resource_path(base: &str, id: &str) -> String {
    format!("{base}/{}", urlencoding::encode(id))
}
