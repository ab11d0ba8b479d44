//! Unit tests for the bus, caches, search channel, sequencer and tools.
//!
//! Shared doubles live in `crate::testing`.



#[cfg(test)]
mod likes;

#[cfg(test)]
mod search;
