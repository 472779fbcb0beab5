use concordium_cis2::*;
use concordium_std::*;

use crate::{
    ContractBalanceOfQueryParams, ContractBalanceOfQueryResponse, ContractReadError,
    ContractTokenAmount, ContractTokenId, BALANCE_OF_ENTRYPOINT, GET_APPROVED_ENTRYPOINT,
    OPERATOR_OF_ENTRYPOINT, TRANSFER_ENTRYPOINT,
};

/// Client side of a CIS-2 collection, as seen by a contract holding transfer rights over its tokens.
pub trait HostCis2Ext<S>: HasHost<S> {
    /// Query the balance of a single `address` for a single token.
    fn cis2_balance_of(
        &self,
        contract: &ContractAddress,
        token_id: &ContractTokenId,
        address: Address,
    ) -> Result<ContractTokenAmount, ContractReadError<Self::ReturnValueType>> {
        let params = ContractBalanceOfQueryParams {
            queries: vec![BalanceOfQuery {
                token_id: token_id.clone(),
                address,
            }],
        };

        let mut result = self
            .invoke_contract_read_only(
                contract,
                &params,
                EntrypointName::new_unchecked(BALANCE_OF_ENTRYPOINT),
                Amount::zero(),
            )
            .map_err(ContractReadError::Call)?
            .ok_or(ContractReadError::Compatibility)?;

        let mut response = ContractBalanceOfQueryResponse::deserial(&mut result)
            .map_err(|_| ContractReadError::Parse)?;

        // One query in, one answer out
        ensure_eq!(response.0.len(), 1, ContractReadError::Compatibility);
        response.0.pop().ok_or(ContractReadError::Compatibility)
    }

    /// Query whether `address` is an operator of `owner`.
    fn cis2_operator_of(
        &self,
        contract: &ContractAddress,
        owner: Address,
        address: Address,
    ) -> Result<bool, ContractReadError<Self::ReturnValueType>> {
        let params = OperatorOfQueryParams {
            queries: vec![OperatorOfQuery { owner, address }],
        };

        let mut result = self
            .invoke_contract_read_only(
                contract,
                &params,
                EntrypointName::new_unchecked(OPERATOR_OF_ENTRYPOINT),
                Amount::zero(),
            )
            .map_err(ContractReadError::Call)?
            .ok_or(ContractReadError::Compatibility)?;

        let mut response =
            OperatorOfQueryResponse::deserial(&mut result).map_err(|_| ContractReadError::Parse)?;

        ensure_eq!(response.0.len(), 1, ContractReadError::Compatibility);
        response.0.pop().ok_or(ContractReadError::Compatibility)
    }

    /// Query the address approved to transfer a single token, if any.
    fn cis2_get_approved(
        &self,
        contract: &ContractAddress,
        token_id: &ContractTokenId,
    ) -> Result<Option<Address>, ContractReadError<Self::ReturnValueType>> {
        let mut result = self
            .invoke_contract_read_only(
                contract,
                token_id,
                EntrypointName::new_unchecked(GET_APPROVED_ENTRYPOINT),
                Amount::zero(),
            )
            .map_err(ContractReadError::Call)?
            .ok_or(ContractReadError::Compatibility)?;

        <Option<Address>>::deserial(&mut result).map_err(|_| ContractReadError::Parse)
    }

    /// Transfer a single token from `from` to the account `to`. The calling contract must be
    /// allowed to move the token on behalf of `from`.
    fn cis2_transfer(
        &mut self,
        contract: &ContractAddress,
        token_id: ContractTokenId,
        from: Address,
        to: AccountAddress,
    ) -> Result<(), CallContractError<Self::ReturnValueType>> {
        let params = TransferParams(vec![Transfer {
            token_id,
            amount: ContractTokenAmount::from(1u64),
            from,
            to: Receiver::Account(to),
            data: AdditionalData::empty(),
        }]);

        self.invoke_contract(
            contract,
            &params,
            EntrypointName::new_unchecked(TRANSFER_ENTRYPOINT),
            Amount::zero(),
        )?;

        Ok(())
    }
}

impl<S, H: HasHost<S>> HostCis2Ext<S> for H {}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use crate::test::*;
    use concordium_std::test_infrastructure::*;

    const COLLECTION: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const OWNER: Address = Address::Account(AccountAddress([16; 32]));
    const OPERATOR: Address = Address::Contract(ContractAddress {
        index: 2,
        subindex: 0,
    });

    fn token_id() -> ContractTokenId {
        TokenIdVec(vec![0, 0, 0, 0, 0, 0, 0, 0])
    }

    #[concordium_test]
    fn test_operator_of() {
        let mut host = TestHost::new((), TestStateBuilder::new());
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked(OPERATOR_OF_ENTRYPOINT.into()),
            parse_and_map_mock(|params: &OperatorOfQueryParams| {
                let query = &params.queries[0];
                Some(OperatorOfQueryResponse(vec![
                    query.owner == OWNER && query.address == OPERATOR,
                ]))
            }),
        );

        claim!(matches!(host.cis2_operator_of(&COLLECTION, OWNER, OPERATOR), Ok(true)));
        claim!(matches!(host.cis2_operator_of(&COLLECTION, OPERATOR, OWNER), Ok(false)));
    }

    #[concordium_test]
    fn test_balance_of_wrong_length() {
        let mut host = TestHost::new((), TestStateBuilder::new());
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked(BALANCE_OF_ENTRYPOINT.into()),
            parse_and_ok_mock::<ContractBalanceOfQueryParams, _>(BalanceOfQueryResponse(vec![
                ContractTokenAmount::from(1u64),
                ContractTokenAmount::from(1u64),
            ])),
        );

        claim!(matches!(
            host.cis2_balance_of(&COLLECTION, &token_id(), OWNER),
            Err(ContractReadError::Compatibility)
        ));
    }

    #[concordium_test]
    fn test_get_approved_missing() {
        let mut host = TestHost::new((), TestStateBuilder::new());
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked(GET_APPROVED_ENTRYPOINT.into()),
            missing_entrypoint_mock(),
        );

        claim!(matches!(
            host.cis2_get_approved(&COLLECTION, &token_id()),
            Err(ContractReadError::Call(CallContractError::MissingEntrypoint))
        ));
    }

    #[concordium_test]
    fn test_transfer_trapped() {
        let mut host = TestHost::new((), TestStateBuilder::new());
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked(TRANSFER_ENTRYPOINT.into()),
            trap_mock(),
        );

        claim!(matches!(
            host.cis2_transfer(&COLLECTION, token_id(), OWNER, AccountAddress([17; 32])),
            Err(CallContractError::Trap)
        ));
    }
}
