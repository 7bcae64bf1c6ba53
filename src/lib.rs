//! Hierarchical 2‑D spatial hash grid plus the phase‑separated simulation
//! host that keeps it up to date.
//!
//! * [`grid`] – the index itself: levels, cell maths, add/move/remove and
//!   the two broad‑phase queries.
//! * [`sim`] – a `hecs` world driving the grid once per tic: one writer
//!   pass, then parallel read passes, with deferred commands in between.

pub mod grid;
pub mod sim;
