//! BorderDesk: curate country boundary records against a REST backend.

pub mod app;
