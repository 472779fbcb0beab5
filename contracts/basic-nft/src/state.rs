use commons::{ContractError, ContractResult, ContractTokenAmount, ContractTokenId, CustomContractError};
use concordium_cis2::TokenIdVec;
use concordium_std::*;
use core::ops::DerefMut;

/// The contract state.
#[derive(Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Metadata URL shared by every token of the collection.
    pub metadata_url: String,
    /// Sequence number of the next minted token.
    next_token: u64,
    owners: StateMap<ContractTokenId, Address, S>,
    /// Address allowed to transfer a single token. Cleared on every transfer.
    approvals: StateMap<ContractTokenId, Address, S>,
    operators: StateMap<Address, StateSet<Address, S>, S>,
}

impl<S: HasStateApi> State<S> {
    /// Creates a new state with no tokens.
    pub fn new(state_builder: &mut StateBuilder<S>, metadata_url: String) -> Self {
        Self {
            metadata_url,
            next_token: 0,
            owners: state_builder.new_map(),
            approvals: state_builder.new_map(),
            operators: state_builder.new_map(),
        }
    }

    /// Mint the next token to `owner` and return its ID.
    pub fn mint(&mut self, owner: Address) -> ContractTokenId {
        let token_id = token_id_of(self.next_token);
        self.next_token += 1;
        self.owners.insert(token_id.clone(), owner);
        token_id
    }

    pub fn owner_of(&self, token_id: &ContractTokenId) -> ContractResult<Address> {
        self.owners
            .get(token_id)
            .map(|owner| *owner)
            .ok_or(ContractError::InvalidTokenId)
    }

    pub fn balance(
        &self,
        token_id: &ContractTokenId,
        address: &Address,
    ) -> ContractResult<ContractTokenAmount> {
        let owner = self.owner_of(token_id)?;
        Ok(ContractTokenAmount::from(u64::from(owner == *address)))
    }

    pub fn approved(&self, token_id: &ContractTokenId) -> ContractResult<Option<Address>> {
        self.owner_of(token_id)?;
        Ok(self.approvals.get(token_id).map(|approved| *approved))
    }

    /// Set or clear the approved address of a token. Returns the token owner.
    pub fn approve(
        &mut self,
        token_id: &ContractTokenId,
        approved: Option<Address>,
    ) -> ContractResult<Address> {
        let owner = self.owner_of(token_id)?;
        match approved {
            Some(address) => {
                ensure!(
                    address != owner,
                    CustomContractError::ApprovalToOwner.into()
                );
                self.approvals.insert(token_id.clone(), address);
            }
            None => {
                self.approvals.remove(token_id);
            }
        }
        Ok(owner)
    }

    /// Whether `sender` may move the token on behalf of `from`.
    pub fn can_transfer(
        &self,
        sender: &Address,
        token_id: &ContractTokenId,
        from: &Address,
    ) -> bool {
        sender == from
            || self.is_operator(from, sender)
            || self
                .approvals
                .get(token_id)
                .map(|approved| *approved == *sender)
                .unwrap_or(false)
    }

    /// Move the token from `from` to `to`. A zero amount only checks that the token exists.
    pub fn transfer(
        &mut self,
        token_id: &ContractTokenId,
        amount: ContractTokenAmount,
        from: &Address,
        to: &Address,
    ) -> ContractResult<()> {
        let owner = self.owner_of(token_id)?;
        if amount == ContractTokenAmount::from(0u64) {
            return Ok(());
        }
        ensure!(
            amount == ContractTokenAmount::from(1u64) && owner == *from,
            ContractError::InsufficientFunds
        );

        self.owners.insert(token_id.clone(), *to);
        self.approvals.remove(token_id);
        Ok(())
    }

    /// Add a new operator for the given address.
    ///
    /// Succeeds even if the `operator` is already an operator for the `owner`.
    pub fn add_operator(
        &mut self,
        owner: &Address,
        operator: &Address,
        state_builder: &mut StateBuilder<S>,
    ) {
        self.operators
            .entry(*owner)
            .or_insert_with(|| state_builder.new_set())
            .deref_mut()
            .insert(*operator);
    }

    /// Succeeds even if the `operator` is _not_ an operator for the `owner`.
    pub fn remove_operator(&mut self, owner: &Address, operator: &Address) {
        self.operators
            .get_mut(owner)
            .map(|mut operators| operators.remove(operator));
    }

    pub fn is_operator(&self, owner: &Address, address: &Address) -> bool {
        self.operators
            .get(owner)
            .map(|operators| operators.contains(address))
            .unwrap_or(false)
    }
}

/// Token IDs are the little-endian bytes of the mint sequence number.
pub fn token_id_of(sequence: u64) -> ContractTokenId {
    TokenIdVec(sequence.to_le_bytes().to_vec())
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use concordium_std::test_infrastructure::*;

    const ALICE: Address = Address::Account(AccountAddress([16; 32]));
    const BOB: Address = Address::Account(AccountAddress([17; 32]));
    const MARKET: Address = Address::Contract(ContractAddress {
        index: 2,
        subindex: 0,
    });

    fn new_state() -> (State<TestStateApi>, TestStateBuilder) {
        let mut state_builder = TestStateBuilder::new();
        let state = State::new(&mut state_builder, String::from("ipfs://basic-nft"));
        (state, state_builder)
    }

    #[concordium_test]
    fn test_mint_sequence() {
        let (mut state, _) = new_state();

        claim_eq!(state.mint(ALICE), token_id_of(0));
        claim_eq!(state.mint(BOB), token_id_of(1));
        claim_eq!(token_id_of(1), TokenIdVec(vec![1, 0, 0, 0, 0, 0, 0, 0]));

        claim_eq!(state.owner_of(&token_id_of(0)), Ok(ALICE));
        claim_eq!(state.owner_of(&token_id_of(1)), Ok(BOB));
        claim_eq!(
            state.owner_of(&token_id_of(2)),
            Err(ContractError::InvalidTokenId)
        );
        claim_eq!(
            state.balance(&token_id_of(0), &ALICE),
            Ok(ContractTokenAmount::from(1u64))
        );
        claim_eq!(
            state.balance(&token_id_of(0), &BOB),
            Ok(ContractTokenAmount::from(0u64))
        );
    }

    #[concordium_test]
    fn test_transfer_clears_approval() {
        let (mut state, _) = new_state();
        let token_id = state.mint(ALICE);

        claim_eq!(state.approve(&token_id, Some(MARKET)), Ok(ALICE));
        claim!(state.can_transfer(&MARKET, &token_id, &ALICE));

        claim_eq!(
            state.transfer(&token_id, ContractTokenAmount::from(1u64), &ALICE, &BOB),
            Ok(())
        );
        claim_eq!(state.owner_of(&token_id), Ok(BOB));
        claim_eq!(state.approved(&token_id), Ok(None));
        claim!(!state.can_transfer(&MARKET, &token_id, &BOB));
    }

    #[concordium_test]
    fn test_transfer_amounts() {
        let (mut state, _) = new_state();
        let token_id = state.mint(ALICE);

        // Zero amount is a no-op, even from a non-owner
        claim_eq!(
            state.transfer(&token_id, ContractTokenAmount::from(0u64), &BOB, &ALICE),
            Ok(())
        );
        claim_eq!(
            state.transfer(&token_id, ContractTokenAmount::from(2u64), &ALICE, &BOB),
            Err(ContractError::InsufficientFunds)
        );
        claim_eq!(
            state.transfer(&token_id, ContractTokenAmount::from(1u64), &BOB, &ALICE),
            Err(ContractError::InsufficientFunds)
        );
        claim_eq!(state.owner_of(&token_id), Ok(ALICE));
    }

    #[concordium_test]
    fn test_approve_owner() {
        let (mut state, _) = new_state();
        let token_id = state.mint(ALICE);

        claim_eq!(
            state.approve(&token_id, Some(ALICE)),
            Err(CustomContractError::ApprovalToOwner.into())
        );
        claim_eq!(state.approve(&token_id, Some(BOB)), Ok(ALICE));
        claim_eq!(state.approved(&token_id), Ok(Some(BOB)));
        claim_eq!(state.approve(&token_id, None), Ok(ALICE));
        claim_eq!(state.approved(&token_id), Ok(None));
    }

    #[concordium_test]
    fn test_operators() {
        let (mut state, mut state_builder) = new_state();
        let token_id = state.mint(ALICE);

        state.add_operator(&ALICE, &MARKET, &mut state_builder);
        claim!(state.is_operator(&ALICE, &MARKET));
        claim!(!state.is_operator(&BOB, &MARKET));
        claim!(state.can_transfer(&MARKET, &token_id, &ALICE));

        state.remove_operator(&ALICE, &MARKET);
        claim!(!state.is_operator(&ALICE, &MARKET));
        claim!(!state.can_transfer(&MARKET, &token_id, &ALICE));
    }
}
