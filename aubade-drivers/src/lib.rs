//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in aubade-core:
//!
//! - Stepper coil drivers (ULN2003 with a 28BYJ-48 geared motor)

#![no_std]
#![deny(unsafe_code)]

pub mod stepper;
