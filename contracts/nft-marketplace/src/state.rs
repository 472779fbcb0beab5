use commons::{Authority, Token};
use concordium_std::*;

use crate::errors::MarketplaceError;

/// An active offer to sell a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SchemaType)]
pub struct Listing {
    /// Price in micro CCD.
    pub price: Amount,
    /// Owner of the token at the time it was listed.
    pub seller: AccountAddress,
}

/// What happens to a payment above the listing price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SchemaType)]
pub enum OverpaymentPolicy {
    /// Send the excess back to the buyer.
    Refund,
    /// Keep the excess in the contract.
    Retain,
}

/// Whether `updatePrice` accepts a zero price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SchemaType)]
pub enum RepricePolicy {
    /// Reject a zero price, as `listItem` does.
    RequirePositive,
    /// Accept any price, including zero.
    AllowZero,
}

/// Market policies, set at init and changed through `updateInternalValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SchemaType)]
pub struct MarketConfig {
    /// Handling of a payment above the listing price.
    pub overpayment: OverpaymentPolicy,
    /// Price check applied by `updatePrice`.
    pub reprice: RepricePolicy,
}

/// The contract state.
#[derive(Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Addresses authorized to update and maintain the contract.
    pub authority: Authority<S>,
    pub config: MarketConfig,
    /// At most one listing per token.
    listings: StateMap<Token, Listing, S>,
    /// Amount owed to each seller. A missing entry means nothing is owed.
    proceeds: StateMap<AccountAddress, Amount, S>,
}

impl<S: HasStateApi> State<S> {
    /// Creates a new state with no listings.
    pub fn new(
        state_builder: &mut StateBuilder<S>,
        config: MarketConfig,
        origin: AccountAddress,
    ) -> Self {
        Self {
            authority: Authority::new(state_builder, Address::Account(origin)),
            config,
            listings: state_builder.new_map(),
            proceeds: state_builder.new_map(),
        }
    }

    pub fn listing(&self, token: &Token) -> Option<Listing> {
        self.listings.get(token).map(|listing| *listing)
    }

    /// Fails with `NotListed` if the token has no listing.
    pub fn listed(&self, token: &Token) -> Result<Listing, MarketplaceError> {
        self.listing(token)
            .ok_or_else(|| MarketplaceError::NotListed(token.clone()))
    }

    pub fn ensure_not_listed(&self, token: &Token) -> Result<(), MarketplaceError> {
        ensure!(
            self.listings.get(token).is_none(),
            MarketplaceError::AlreadyListed(token.clone())
        );
        Ok(())
    }

    /// Insert a listing. Callers check `ensure_not_listed` first.
    pub fn list(&mut self, token: Token, listing: Listing) {
        self.listings.insert(token, listing);
    }

    pub fn unlist(&mut self, token: &Token) -> Result<Listing, MarketplaceError> {
        self.listings
            .remove_and_get(token)
            .ok_or_else(|| MarketplaceError::NotListed(token.clone()))
    }

    /// Overwrite the price of an existing listing, keeping its seller.
    pub fn set_price(&mut self, token: &Token, price: Amount) -> Result<(), MarketplaceError> {
        let listing = self.listed(token)?;
        self.listings.insert(token.clone(), Listing { price, ..listing });
        Ok(())
    }

    /// Remove the listing and credit its price to the seller. Returns the removed listing.
    pub fn sell(&mut self, token: &Token) -> Result<Listing, MarketplaceError> {
        let listing = self.unlist(token)?;
        self.credit(listing.seller, listing.price);
        Ok(listing)
    }

    /// Undo a `sell` whose token or CCD transfer did not go through.
    pub fn revert_sale(&mut self, token: Token, listing: Listing) {
        self.debit(listing.seller, listing.price);
        self.listings.insert(token, listing);
    }

    pub fn proceeds(&self, account: &AccountAddress) -> Amount {
        self.proceeds
            .get(account)
            .map(|amount| *amount)
            .unwrap_or_else(Amount::zero)
    }

    /// Clear the balance of `account` and return it. Fails with `NoProceeds` on a zero balance.
    pub fn take_proceeds(&mut self, account: &AccountAddress) -> Result<Amount, MarketplaceError> {
        let amount = self
            .proceeds
            .remove_and_get(account)
            .unwrap_or_else(Amount::zero);
        ensure!(
            amount > Amount::zero(),
            MarketplaceError::NoProceeds(*account)
        );
        Ok(amount)
    }

    pub fn credit(&mut self, account: AccountAddress, amount: Amount) {
        let balance = self.proceeds(&account) + amount;
        self.proceeds.insert(account, balance);
    }

    fn debit(&mut self, account: AccountAddress, amount: Amount) {
        let balance = self.proceeds(&account);
        if balance > amount {
            self.proceeds.insert(account, balance - amount);
        } else {
            self.proceeds.remove(&account);
        }
    }

    /// Page through active listings in key order.
    pub fn view_listings(&self, skip: u32, show: u32) -> Vec<(Token, Listing)> {
        self.listings
            .iter()
            .skip(skip as usize)
            .take(show as usize)
            .map(|(token, listing)| ((*token).clone(), *listing))
            .collect()
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use concordium_cis2::TokenIdVec;
    use concordium_std::test_infrastructure::*;

    const ADMIN: AccountAddress = AccountAddress([1; 32]);
    const SELLER: AccountAddress = AccountAddress([16; 32]);
    const COLLECTION: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };

    fn token(n: u8) -> Token {
        Token::new(COLLECTION, TokenIdVec(vec![n]))
    }

    fn new_state() -> State<TestStateApi> {
        let mut state_builder = TestStateBuilder::new();
        State::new(
            &mut state_builder,
            MarketConfig {
                overpayment: OverpaymentPolicy::Refund,
                reprice: RepricePolicy::RequirePositive,
            },
            ADMIN,
        )
    }

    fn listing(ccd: u64) -> Listing {
        Listing {
            price: Amount::from_ccd(ccd),
            seller: SELLER,
        }
    }

    #[concordium_test]
    fn test_list_and_unlist() {
        let mut state = new_state();

        claim_eq!(state.ensure_not_listed(&token(0)), Ok(()));
        state.list(token(0), listing(100));

        claim_eq!(state.listing(&token(0)), Some(listing(100)));
        claim_eq!(
            state.ensure_not_listed(&token(0)),
            Err(MarketplaceError::AlreadyListed(token(0)))
        );
        claim_eq!(state.listing(&token(1)), None);

        claim_eq!(state.unlist(&token(0)), Ok(listing(100)));
        claim_eq!(state.listing(&token(0)), None);
        claim_eq!(
            state.unlist(&token(0)),
            Err(MarketplaceError::NotListed(token(0)))
        );
    }

    #[concordium_test]
    fn test_set_price_keeps_seller() {
        let mut state = new_state();
        state.list(token(0), listing(100));

        claim_eq!(state.set_price(&token(0), Amount::from_ccd(250)), Ok(()));
        claim_eq!(state.listed(&token(0)), Ok(listing(250)));

        claim_eq!(
            state.set_price(&token(1), Amount::from_ccd(250)),
            Err(MarketplaceError::NotListed(token(1)))
        );
    }

    #[concordium_test]
    fn test_sell_credits_price() {
        let mut state = new_state();
        state.list(token(0), listing(100));
        state.list(token(1), listing(40));

        claim_eq!(state.sell(&token(0)), Ok(listing(100)));
        claim_eq!(state.sell(&token(1)), Ok(listing(40)));

        claim_eq!(state.listing(&token(0)), None);
        claim_eq!(state.proceeds(&SELLER), Amount::from_ccd(140));
        claim_eq!(
            state.sell(&token(0)),
            Err(MarketplaceError::NotListed(token(0)))
        );
    }

    #[concordium_test]
    fn test_revert_sale() {
        let mut state = new_state();
        state.credit(SELLER, Amount::from_ccd(5));
        state.list(token(0), listing(100));

        let sold = state.sell(&token(0)).expect_report("Sale failed");
        state.revert_sale(token(0), sold);

        claim_eq!(state.listing(&token(0)), Some(listing(100)));
        claim_eq!(state.proceeds(&SELLER), Amount::from_ccd(5));

        // A seller with no prior balance ends with no entry at all
        let mut state = new_state();
        state.list(token(0), listing(100));
        let sold = state.sell(&token(0)).expect_report("Sale failed");
        state.revert_sale(token(0), sold);
        claim!(state.proceeds.get(&SELLER).is_none());
    }

    #[concordium_test]
    fn test_take_proceeds() {
        let mut state = new_state();

        claim_eq!(
            state.take_proceeds(&SELLER),
            Err(MarketplaceError::NoProceeds(SELLER))
        );

        state.credit(SELLER, Amount::from_ccd(7));
        claim_eq!(state.take_proceeds(&SELLER), Ok(Amount::from_ccd(7)));
        claim_eq!(state.proceeds(&SELLER), Amount::zero());
        claim_eq!(
            state.take_proceeds(&SELLER),
            Err(MarketplaceError::NoProceeds(SELLER))
        );
    }

    #[concordium_test]
    fn test_view_listings() {
        let mut state = new_state();
        for n in 0..5 {
            state.list(token(n), listing(n as u64 + 1));
        }

        let first = state.view_listings(0, 3);
        let rest = state.view_listings(3, 3);
        claim_eq!(first.len(), 3);
        claim_eq!(rest.len(), 2);
        claim!(rest.iter().all(|entry| !first.contains(entry)));
        claim!(state.view_listings(5, 3).is_empty());
    }
}
