//! Drill simulation clock

mod clock;

pub use clock::*;
