#![no_std]

//! ESP32-S3 board adapters for the watchface: memory-LCD transport, flash
//! settings, battery sampling and shared link state.

pub mod battery;
pub mod network;
pub mod platform;
pub mod storage;
