//! It exposes the errors, constants, types and fee arithmetic shared by the
//! auction and payment logger contracts.
#![cfg_attr(not(feature = "std"), no_std)]
pub use crate::{calculations::*, constants::*, errors::*, types::*};
use concordium_std::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test;

mod calculations;
mod constants;
mod errors;
mod types;
