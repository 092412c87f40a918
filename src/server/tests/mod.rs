//! Unit tests for the server catalog context.
