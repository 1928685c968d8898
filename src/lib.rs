//! Electrocell library
//!
//! An interactive 3D electrochemical cell: two electrode plates in an
//! electrolyte bath, wired through an LED and a push button.  Pressing the
//! button toggles the LED and sets the electrolyte bubbles drifting toward
//! their electrodes.

pub mod bubbles;
pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod indicator;
pub mod input;
pub mod scene;
pub mod simulation;
