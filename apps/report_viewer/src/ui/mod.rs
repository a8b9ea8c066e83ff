//! Terminal presentation: catalog listing, session status and the result table.

pub mod render;
