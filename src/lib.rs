//! # Gamepad Mapper Library
//!
//! Remap a gamepad's buttons and analog sticks onto virtual keyboard and
//! mouse events.
//!
//! This library provides the input-mapping engine together with its Linux
//! backends: an evdev reader for the gamepad and a uinput virtual device for
//! the synthetic keyboard/mouse output.

pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod observer;
pub mod output;
pub mod profile;
