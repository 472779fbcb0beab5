// Tags `u8::MAX` down to `u8::MAX - 4` are taken by the CIS-2 standard events.

/// Tag for the ItemListed event.
pub const ITEM_LISTED_TAG: u8 = u8::MAX - 5;

/// Tag for the ItemBought event.
pub const ITEM_BOUGHT_TAG: u8 = u8::MAX - 6;

/// Tag for the ItemCanceled event.
pub const ITEM_CANCELED_TAG: u8 = u8::MAX - 7;

/// Tag for the PriceUpdated event.
pub const PRICE_UPDATED_TAG: u8 = u8::MAX - 8;

/// Tag for the Withdrawal event.
pub const WITHDRAWAL_TAG: u8 = u8::MAX - 9;

/// Tag for the per-token Approval event of collections.
pub const APPROVAL_TAG: u8 = u8::MAX - 10;

/// Entrypoint names of the CIS-2 functions used by the marketplace.
pub const BALANCE_OF_ENTRYPOINT: &str = "balanceOf";
pub const OPERATOR_OF_ENTRYPOINT: &str = "operatorOf";
pub const TRANSFER_ENTRYPOINT: &str = "transfer";

/// Per-token approval extension. Not part of CIS-2, collections may omit it.
pub const GET_APPROVED_ENTRYPOINT: &str = "getApproved";
