//! It exposes all common structs and types.
#![cfg_attr(not(feature = "std"), no_std)]
pub use crate::{constants::*, errors::*, structs::*, types::*};
use concordium_cis2::*;
use concordium_std::*;

#[cfg(not(target_arch = "wasm32"))]
pub mod test;

mod constants;
mod errors;
mod structs;
mod types;
