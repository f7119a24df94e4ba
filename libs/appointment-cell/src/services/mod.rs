pub mod booking;
pub mod lifecycle;
pub mod rating;

use crate::models::SchedulingError;

/// Transport failures from the portal client collapse to a uniform
/// upstream error; a backend 404 keeps its identity.
pub(crate) fn map_upstream(e: anyhow::Error) -> SchedulingError {
    let msg = e.to_string();
    if msg.starts_with("Resource not found") {
        SchedulingError::NotFound
    } else {
        SchedulingError::Upstream(msg)
    }
}
