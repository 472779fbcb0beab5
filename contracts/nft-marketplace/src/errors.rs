use commons::{CustomContractError, Token};
use concordium_std::*;

/// Rejection of a marketplace operation, with the token or account it concerns.
///
/// Only the variant survives the entrypoint boundary: it is converted to the matching
/// `CustomContractError` reject code and the token, price or account is dropped. Callers
/// recover that context from the parameter they sent, e.g. the listing price through
/// `getListing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceError {
    AlreadyListed(Token),
    NotListed(Token),
    PriceMustBeAboveZero,
    NotOwner(Token),
    NotApprovedForMarketplace(Token),
    /// Carries the listing price the payment fell short of.
    PriceNotMet(Token, Amount),
    NoProceeds(AccountAddress),
}

impl From<MarketplaceError> for CustomContractError {
    fn from(error: MarketplaceError) -> Self {
        match error {
            MarketplaceError::AlreadyListed(_) => Self::AlreadyListed,
            MarketplaceError::NotListed(_) => Self::NotListed,
            MarketplaceError::PriceMustBeAboveZero => Self::PriceMustBeAboveZero,
            MarketplaceError::NotOwner(_) => Self::NotOwner,
            MarketplaceError::NotApprovedForMarketplace(_) => Self::NotApprovedForMarketplace,
            MarketplaceError::PriceNotMet(..) => Self::PriceNotMet,
            MarketplaceError::NoProceeds(_) => Self::NoProceeds,
        }
    }
}

impl From<MarketplaceError> for Reject {
    fn from(error: MarketplaceError) -> Self {
        CustomContractError::from(error).into()
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use concordium_cis2::TokenIdVec;

    #[concordium_test]
    fn test_reject_codes() {
        let token = Token::new(
            ContractAddress {
                index: 1,
                subindex: 0,
            },
            TokenIdVec(vec![0]),
        );

        let reject = Reject::from(MarketplaceError::PriceNotMet(token.clone(), Amount::from_ccd(1)));
        claim_eq!(reject, Reject::from(CustomContractError::PriceNotMet));

        let reject = Reject::from(MarketplaceError::NotOwner(token));
        claim_eq!(reject, Reject::from(CustomContractError::NotOwner));

        let reject = Reject::from(MarketplaceError::NoProceeds(AccountAddress([0; 32])));
        claim_eq!(reject, Reject::from(CustomContractError::NoProceeds));
    }
}
