//! A minimal CIS-2 NFT collection for trading on the marketplace.
//!
//! Anyone can mint. Tokens get sequential IDs and share one metadata URL. Besides the CIS-2
//! operators, an owner can approve a single address per token. The approval is cleared whenever
//! the token moves.

#![cfg_attr(not(feature = "std"), no_std)]

mod contract;
mod events;
mod external;
mod state;
