//! Queries and transfers against the collection contract of a token.

use commons::{ContractReadError, CustomContractError, HostCis2Ext, Token};
use concordium_std::*;

use crate::errors::MarketplaceError;

/// Check that `address` holds the token.
pub fn ensure_owner<T>(host: &impl HasHost<T>, token: &Token, address: Address) -> ReceiveResult<()> {
    let balance = host
        .cis2_balance_of(&token.contract, &token.id, address)
        .map_err(handle_read_error)?;

    ensure!(
        balance.0 > 0,
        MarketplaceError::NotOwner(token.clone()).into()
    );
    Ok(())
}

/// Check that `marketplace` may transfer the token on behalf of `owner`, either as an operator
/// of `owner` or as the approved address of the token.
///
/// A collection without a `getApproved` entrypoint only grants operator rights.
pub fn ensure_marketplace_approved<T>(
    host: &impl HasHost<T>,
    token: &Token,
    owner: Address,
    marketplace: Address,
) -> ReceiveResult<()> {
    let is_operator = host
        .cis2_operator_of(&token.contract, owner, marketplace)
        .map_err(handle_read_error)?;
    if is_operator {
        return Ok(());
    }

    let approved = match host.cis2_get_approved(&token.contract, &token.id) {
        Ok(approved) => approved,
        Err(ContractReadError::Call(CallContractError::MissingEntrypoint)) => None,
        Err(e) => bail!(handle_read_error(e)),
    };

    ensure_eq!(
        approved,
        Some(marketplace),
        MarketplaceError::NotApprovedForMarketplace(token.clone()).into()
    );
    Ok(())
}

/// Move the token from the seller to the buyer.
pub fn transfer_token<T>(
    host: &mut impl HasHost<T>,
    token: &Token,
    from: AccountAddress,
    to: AccountAddress,
) -> ReceiveResult<()> {
    host.cis2_transfer(&token.contract, token.id.clone(), Address::Account(from), to)
        .map_err(handle_call_error)
}

fn handle_call_error<R>(error: CallContractError<R>) -> Reject {
    match error {
        CallContractError::MissingEntrypoint | CallContractError::MessageFailed => {
            CustomContractError::Incompatible.into()
        }
        CallContractError::LogicReject { .. } => CustomContractError::InvokeContractError.into(),
        e => CustomContractError::from(e).into(),
    }
}

fn handle_read_error<R>(error: ContractReadError<R>) -> Reject {
    match error {
        ContractReadError::Call(e) => handle_call_error(e),
        ContractReadError::Compatibility | ContractReadError::Parse => {
            CustomContractError::Incompatible.into()
        }
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::test::*;
    use commons::{ContractBalanceOfQueryParams, ContractTokenAmount, TransferParameter};
    use concordium_cis2::{
        BalanceOfQueryResponse, OperatorOfQueryParams, OperatorOfQueryResponse, Receiver,
        TokenIdVec,
    };
    use concordium_std::test_infrastructure::*;

    const COLLECTION: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const MARKETPLACE: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };

    const USER_1: AccountAddress = AccountAddress([16; 32]);
    const USER_2: AccountAddress = AccountAddress([17; 32]);

    fn token() -> Token {
        Token::new(COLLECTION, TokenIdVec(vec![0, 0, 0, 0, 0, 0, 0, 0]))
    }

    fn empty_host() -> TestHost<()> {
        TestHost::new((), TestStateBuilder::new())
    }

    fn mock_operator_of(host: &mut TestHost<()>, is_operator: bool) {
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("operatorOf".into()),
            parse_and_ok_mock::<OperatorOfQueryParams, _>(OperatorOfQueryResponse(vec![
                is_operator,
            ])),
        );
    }

    #[concordium_test]
    fn test_owner() {
        let mut host = empty_host();
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("balanceOf".into()),
            parse_and_map_mock(|params: &ContractBalanceOfQueryParams| {
                let owned = params.queries[0].address == Address::Account(USER_1);
                let amount = ContractTokenAmount::from(if owned { 1u64 } else { 0u64 });
                Some(BalanceOfQueryResponse(vec![amount]))
            }),
        );

        claim_eq!(
            ensure_owner(&host, &token(), Address::Account(USER_1)),
            Ok(())
        );
        claim_eq!(
            ensure_owner(&host, &token(), Address::Account(USER_2)),
            Err(MarketplaceError::NotOwner(token()).into())
        );
    }

    #[concordium_test]
    fn test_owner_incompatible_collection() {
        let mut host = empty_host();
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("balanceOf".into()),
            missing_entrypoint_mock(),
        );

        claim_eq!(
            ensure_owner(&host, &token(), Address::Account(USER_1)),
            Err(CustomContractError::Incompatible.into())
        );
    }

    #[concordium_test]
    fn test_approved_as_operator() {
        let mut host = empty_host();
        mock_operator_of(&mut host, true);

        let result = ensure_marketplace_approved(
            &host,
            &token(),
            Address::Account(USER_1),
            Address::Contract(MARKETPLACE),
        );
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_approved_for_token() {
        let mut host = empty_host();
        mock_operator_of(&mut host, false);
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("getApproved".into()),
            parse_and_ok_mock::<TokenIdVec, _>(Some(Address::Contract(MARKETPLACE))),
        );

        let result = ensure_marketplace_approved(
            &host,
            &token(),
            Address::Account(USER_1),
            Address::Contract(MARKETPLACE),
        );
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_not_approved() {
        let mut host = empty_host();
        mock_operator_of(&mut host, false);
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("getApproved".into()),
            parse_and_ok_mock::<TokenIdVec, _>(Some(Address::Account(USER_2))),
        );

        let result = ensure_marketplace_approved(
            &host,
            &token(),
            Address::Account(USER_1),
            Address::Contract(MARKETPLACE),
        );
        claim_eq!(
            result,
            Err(MarketplaceError::NotApprovedForMarketplace(token()).into())
        );
    }

    #[concordium_test]
    fn test_not_approved_without_token_approvals() {
        let mut host = empty_host();
        mock_operator_of(&mut host, false);
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("getApproved".into()),
            missing_entrypoint_mock(),
        );

        let result = ensure_marketplace_approved(
            &host,
            &token(),
            Address::Account(USER_1),
            Address::Contract(MARKETPLACE),
        );
        claim_eq!(
            result,
            Err(MarketplaceError::NotApprovedForMarketplace(token()).into())
        );
    }

    #[concordium_test]
    fn test_transfer() {
        let mut host = empty_host();
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            parse_and_inspect_mock(|params: &TransferParameter, _state: &()| {
                let transfer = &params.0[0];
                params.0.len() == 1
                    && transfer.token_id == token().id
                    && transfer.amount == ContractTokenAmount::from(1u64)
                    && transfer.from == Address::Account(USER_1)
                    && matches!(transfer.to, Receiver::Account(to) if to == USER_2)
            }),
        );

        claim_eq!(transfer_token(&mut host, &token(), USER_1, USER_2), Ok(()));
    }

    #[concordium_test]
    fn test_transfer_rejected() {
        let mut host = empty_host();
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            trap_mock(),
        );

        claim_eq!(
            transfer_token(&mut host, &token(), USER_1, USER_2),
            Err(CustomContractError::InvokeContractError.into())
        );
    }
}
