//! Types, error codes and host helpers shared by the marketplace and the NFT collection contracts.
#![cfg_attr(not(feature = "std"), no_std)]
pub use crate::{authority::*, cis2::*, constants::*, errors::*, structs::*, types::*};
use concordium_cis2::*;
use concordium_std::*;

pub mod test;

mod authority;
mod cis2;
mod constants;
mod errors;
mod structs;
mod types;
