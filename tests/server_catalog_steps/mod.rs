//! Step definitions for server catalog behaviour tests.

pub mod world;

mod given;
