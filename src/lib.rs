//! The Z-Machine core as a library: memory map, instruction decoder, and
//! processor for story files of versions 1 through 8.
//!
//! Presentation (windows, cursor, fonts) lives behind the [screen::Screen]
//! trait; debugger front-ends observe execution through
//! [event::EventListener] callbacks and the processor's read-only accessors.
#![crate_name = "zorkmid"]

#[macro_use]
extern crate log;

pub mod config;
pub mod error;
pub mod event;
pub mod instruction;
pub mod memory;
pub mod object;
pub mod processor;
pub mod screen;
pub mod text;

#[cfg(test)]
pub mod test_util;
