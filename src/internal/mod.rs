//! Internal infrastructure not exposed in the public API.

mod stack;

pub(crate) use stack::with_resolution_frame;
