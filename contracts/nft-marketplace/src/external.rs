use commons::Token;
use concordium_std::*;

use crate::state::{Listing, MarketConfig, OverpaymentPolicy, RepricePolicy};

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct InitParams {
    pub config: MarketConfig,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct ListItemParams {
    pub token: Token,
    /// Price in micro CCD. Must be above zero.
    pub price: Amount,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct UpdatePriceParams {
    pub token: Token,
    pub price: Amount,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct ViewListingsParams {
    pub skip: u32,
    pub show: u32,
}

pub type GetListingResult = Option<Listing>;

pub type ViewListingsResult = Vec<(Token, Listing)>;

#[derive(Debug, Clone, SchemaType, Serialize)]
pub enum ViewInternalValueParams {
    Overpayment,
    Reprice,
}

#[derive(Debug, Clone, PartialEq, Eq, SchemaType, Serialize)]
pub enum InternalValue {
    Overpayment(OverpaymentPolicy),
    Reprice(RepricePolicy),
}
