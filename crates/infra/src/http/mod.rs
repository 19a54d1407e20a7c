//! HTTP plumbing: the pluggable transport and the authenticated session
//! built on top of it.

pub mod session;
pub mod transport;

pub use session::{ErrorCallback, RequestCallbacks, Session, SessionBuilder, SuccessCallback};
pub use transport::{ReqwestTransport, ReqwestTransportBuilder, Transport};
