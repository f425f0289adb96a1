//! End-to-end tests driving scripts through the system manager

mod lifecycle;
