pub mod portal;

pub use portal::{Envelope, PortalClient};
