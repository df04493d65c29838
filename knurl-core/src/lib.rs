//! Board-agnostic core logic for the Knurl gadget firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Quadrature decoding for the rotary encoder
//! - Button gesture classification (click / double-click / long-press)
//! - Worker supervision (named background tasks with cooperative stop)
//! - Worker runtime abstraction trait
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod input;
pub mod supervisor;
pub mod traits;
