//! Process-level helpers for binaries embedding the dispatcher.

pub mod bootstrap;
