//! A peer-to-peer marketplace for CIS-2 non-fungible tokens.
//!
//! # Description
//! Owners list a token at a price without handing it over. The marketplace only needs to be an
//! operator of the owner, or the approved address of the token, in the token's collection.
//! Buyers pay at least the listed price, the token moves straight from the seller to the buyer
//! and the price is credited to the seller. Sellers withdraw their accumulated proceeds at any
//! time.
//!
//! State is always updated before the marketplace calls out to a collection or sends CCD, so a
//! re-entering call never observes a listing that is being sold or a balance that is being paid
//! out.

#![cfg_attr(not(feature = "std"), no_std)]

mod contract;
mod errors;
mod events;
mod external;
mod registry;
mod state;
