//! Core utilities shared by every engine subsystem.

pub mod rng;

pub use rng::{Rng, XorShift32};
