//! # nec-retina
//!
//! A portable, no_std Rust implementation of the NEC infrared remote-control
//! protocol, and of a small application built on top of it: an RGB light that
//! can both be driven by a Liluco IR remote and act as one.
//!
//! This crate implements both directions of the link in software:
//! - `embedded-hal` traits for digital I/O, PWM carrier and delays
//! - an edge-timestamp decoder working with tolerance windows
//! - a symbol-paced encoder switching a 38 kHz PWM carrier
//! - interrupt-safe edge capture with `critical-section`
//! - table-driven state machines polled from a single cooperative loop
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support |
//! | `delay-loop`          | Symbol timer paced with `embedded_hal::delay::DelayNs` |
//! | `timer-isr` (default) | `critical_section` globals and macros for interrupt handlers |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Software Features
//!
//! - **Decoder**: 32-bit commands, repetition codes, noise resynchronisation,
//!   timestamps from a wrapping 16-bit timer
//! - **Receive session**: end of message detected after 10 ms of silence
//! - **Transmitter**: prologue, 32 symbols and epilogue at 56.25 µs resolution
//! - **Retina**: transmit / receive modes switched with a long button press,
//!   sleep hints when nothing is going on
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nec_retina::button::Button;
//! use nec_retina::receiver::NecReceiver;
//! use nec_retina::retina::{Retina, RetinaConfig};
//! use nec_retina::rgb::RgbLed;
//! use nec_retina::transmitter::NecTransmitter;
//!
//! nec_retina::init_edge_capture!();
//! nec_retina::init_symbol_ticker!();
//!
//! let mut retina = Retina::new(
//!     Button::new(button_pin),
//!     NecTransmitter::new(ir_pwm_channel, &SYMBOL_TICKER),
//!     NecReceiver::new(&EDGE_CAPTURE),
//!     RgbLed::new(red, green, blue, false)?,
//!     RetinaConfig::default(),
//! );
//! loop {
//!     retina.poll(millis());
//!     if retina.should_sleep() {
//!         cortex_m::asm::wfi();
//!     }
//! }
//! ```
//!
//! with `record_edge!(TIM3::counter(), ir_pin.is_high())` in the receiver line
//! interrupt and `tick_symbol_timer!()` in a 56.25 µs timer interrupt.
//!
//! ## Integration Notes
//!
//! - The receive timer must tick every 10 µs and wrap at 16 bits
//! - The carrier PWM must already run at 38 kHz; the transmitter only switches
//!   its duty cycle between 35 % and fully off
//! - A transmission blocks the loop for about 250 to 290 ms, most of it the
//!   200 ms epilogue silence
//! - Code `0x00000000` is reserved as "nothing received"
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

#[cfg(feature = "timer-isr")]
pub use critical_section;

pub use heapless;

pub mod button;
pub mod capture;
pub mod commands;
pub mod consts;
pub mod decoder;
pub mod error;
pub mod fsm;
pub mod receiver;
pub mod retina;
pub mod rgb;
pub mod timer;
pub mod transmitter;

pub use error::Error;
