use commons::{
    ApprovalEvent, ApproveParams, ContractBalanceOfQueryParams, ContractBalanceOfQueryResponse,
    ContractError, ContractResult, ContractTokenAmount, ContractTokenId,
    ContractTokenMetadataQueryParams, TransferParameter,
};
use concordium_cis2::*;
use concordium_std::*;

use crate::events::BasicNftEvent;
use crate::external::InitParams;
use crate::state::State;

/// Initialize contract instance with no tokens.
#[init(contract = "BasicNft", parameter = "InitParams")]
fn init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params = InitParams::deserial(&mut ctx.parameter_cursor())?;
    Ok(State::new(state_builder, params.metadata_url))
}

/// Mint the next token with the sender as the owner and return its ID.
/// Logs a `Mint` and a `TokenMetadata` event.
///
/// It rejects if:
/// - Fails to log `Mint` or `TokenMetadata` event.
#[receive(
    contract = "BasicNft",
    name = "mint",
    return_value = "ContractTokenId",
    mutable,
    enable_logger
)]
fn mint<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<ContractTokenId> {
    let owner = ctx.sender();
    let state = host.state_mut();
    let token_id = state.mint(owner);

    logger.log(&Cis2Event::Mint(MintEvent {
        token_id: token_id.clone(),
        amount: ContractTokenAmount::from(1u64),
        owner,
    }))?;

    logger.log(&token_metadata_event(
        token_id.clone(),
        &state.metadata_url,
    ))?;

    Ok(token_id)
}

/// Execute a list of token transfers, in the order of the list.
///
/// Logs a `Transfer` event for each transfer in the list and invokes the receive hook of
/// contract receivers.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - Any of the transfers fail to be executed, which could be if:
///     - The `token_id` does not exist.
///     - The sender is neither `from`, an operator of `from`, nor approved for the token.
///     - The token is not owned by `from` or the amount is above 1.
/// - Fails to log event.
/// - Any of the contracts receiving a transfer choose to reject.
#[receive(
    contract = "BasicNft",
    name = "transfer",
    parameter = "TransferParameter",
    mutable,
    enable_logger
)]
fn transfer<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let TransferParams(transfers): TransferParameter = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();

    for transfer in transfers {
        let state = host.state_mut();
        ensure!(
            state.can_transfer(&sender, &transfer.token_id, &transfer.from),
            ContractError::Unauthorized
        );

        let to_address = transfer.to.address();
        state.transfer(
            &transfer.token_id,
            transfer.amount,
            &transfer.from,
            &to_address,
        )?;

        logger.log(&Cis2Event::Transfer(TransferEvent {
            token_id: transfer.token_id.clone(),
            amount: transfer.amount,
            from: transfer.from,
            to: to_address,
        }))?;

        if let Receiver::Contract(address, entrypoint_name) = transfer.to {
            let parameter = OnReceivingCis2Params {
                token_id: transfer.token_id,
                amount: transfer.amount,
                from: transfer.from,
                data: transfer.data,
            };

            host.invoke_contract(
                &address,
                &parameter,
                entrypoint_name.as_entrypoint_name(),
                Amount::zero(),
            )?;
        }
    }

    Ok(())
}

/// Enable or disable addresses as operators of the sender address.
/// Logs an `UpdateOperator` event.
#[receive(
    contract = "BasicNft",
    name = "updateOperator",
    parameter = "UpdateOperatorParams",
    mutable,
    enable_logger
)]
fn update_operator<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let UpdateOperatorParams(params) = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();

    let (state, state_builder) = host.state_and_builder();
    for param in params {
        match param.update {
            OperatorUpdate::Add => state.add_operator(&sender, &param.operator, state_builder),
            OperatorUpdate::Remove => state.remove_operator(&sender, &param.operator),
        }

        logger.log(
            &Cis2Event::<ContractTokenId, ContractTokenAmount>::UpdateOperator(
                UpdateOperatorEvent {
                    owner: sender,
                    operator: param.operator,
                    update: param.update,
                },
            ),
        )?;
    }

    Ok(())
}

#[receive(
    contract = "BasicNft",
    name = "operatorOf",
    parameter = "OperatorOfQueryParams",
    return_value = "OperatorOfQueryResponse"
)]
fn operator_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<OperatorOfQueryResponse> {
    let params: OperatorOfQueryParams = ctx.parameter_cursor().get()?;
    let state = host.state();

    let response = params
        .queries
        .iter()
        .map(|query| state.is_operator(&query.owner, &query.address))
        .collect::<Vec<_>>();

    Ok(OperatorOfQueryResponse::from(response))
}

/// Get the balance of given token IDs and addresses. A balance is either 0 or 1.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - Any of the queried `token_id` does not exist.
#[receive(
    contract = "BasicNft",
    name = "balanceOf",
    parameter = "ContractBalanceOfQueryParams",
    return_value = "ContractBalanceOfQueryResponse"
)]
fn balance_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<ContractBalanceOfQueryResponse> {
    let params: ContractBalanceOfQueryParams = ctx.parameter_cursor().get()?;
    let mut response = Vec::with_capacity(params.queries.len());
    let state = host.state();
    for query in params.queries {
        response.push(state.balance(&query.token_id, &query.address)?);
    }

    Ok(ContractBalanceOfQueryResponse::from(response))
}

#[receive(
    contract = "BasicNft",
    name = "tokenMetadata",
    parameter = "ContractTokenMetadataQueryParams",
    return_value = "TokenMetadataQueryResponse"
)]
fn token_metadata<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<TokenMetadataQueryResponse> {
    let params: ContractTokenMetadataQueryParams = ctx.parameter_cursor().get()?;
    let state = host.state();
    let mut response = Vec::with_capacity(params.queries.len());
    for token_id in params.queries {
        state.owner_of(&token_id)?;
        response.push(MetadataUrl {
            url: state.metadata_url.clone(),
            hash: None,
        });
    }

    Ok(TokenMetadataQueryResponse::from(response))
}

/// Set or clear the single address allowed to transfer a token besides the owner and its
/// operators. Logs an `Approval` event.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - The token does not exist.
/// - The sender is neither the owner nor an operator of the owner.
/// - The approved address is the owner.
#[receive(
    contract = "BasicNft",
    name = "approve",
    parameter = "ApproveParams",
    mutable,
    enable_logger
)]
fn approve<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: ApproveParams = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();
    let state = host.state_mut();

    let owner = state.owner_of(&params.token_id)?;
    ensure!(
        sender == owner || state.is_operator(&owner, &sender),
        ContractError::Unauthorized
    );
    state.approve(&params.token_id, params.approved)?;

    logger.log(&BasicNftEvent::Approval(ApprovalEvent {
        token_id: params.token_id,
        owner,
        approved: params.approved,
    }))?;

    Ok(())
}

#[receive(
    contract = "BasicNft",
    name = "getApproved",
    parameter = "ContractTokenId",
    return_value = "Option<Address>"
)]
fn get_approved<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<Option<Address>> {
    let token_id: ContractTokenId = ctx.parameter_cursor().get()?;
    host.state().approved(&token_id)
}

#[receive(
    contract = "BasicNft",
    name = "ownerOf",
    parameter = "ContractTokenId",
    return_value = "Address"
)]
fn owner_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<Address> {
    let token_id: ContractTokenId = ctx.parameter_cursor().get()?;
    host.state().owner_of(&token_id)
}

fn token_metadata_event(
    token_id: ContractTokenId,
    url: &str,
) -> Cis2Event<ContractTokenId, ContractTokenAmount> {
    Cis2Event::TokenMetadata(TokenMetadataEvent {
        token_id,
        metadata_url: MetadataUrl {
            url: String::from(url),
            hash: None,
        },
    })
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::test::*;
    use commons::CustomContractError;
    use test_infrastructure::*;

    use crate::state::token_id_of;

    const METADATA_URL: &str = "ipfs://QmSsYRx3LpDAb1GZQm7zZ1AuHZjfbPkD6J7s9r41xu1mf8";

    const ALICE: AccountAddress = AccountAddress([16; 32]);
    const BOB: AccountAddress = AccountAddress([17; 32]);
    const MARKETPLACE: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };

    fn default_host() -> TestHost<State<TestStateApi>> {
        let mut ctx = TestInitContext::empty();
        let bytes = to_bytes(&InitParams {
            metadata_url: String::from(METADATA_URL),
        });
        ctx.set_parameter(&bytes);
        let mut state_builder = TestStateBuilder::new();

        let state = init(&ctx, &mut state_builder).expect_report("Failed during init_BasicNft");

        TestHost::new(state, state_builder)
    }

    /// Host with one token owned by `ALICE`.
    fn minted_host() -> (TestHost<State<TestStateApi>>, ContractTokenId) {
        let mut host = default_host();
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(ALICE));
        let mut logger = TestLogger::init();

        let token_id = mint(&ctx, &mut host, &mut logger).expect_report("Failed to mint");
        (host, token_id)
    }

    fn transfer_params(
        token_id: &ContractTokenId,
        from: AccountAddress,
        to: Receiver,
    ) -> TransferParameter {
        TransferParams(vec![Transfer {
            token_id: token_id.clone(),
            amount: ContractTokenAmount::from(1u64),
            from: Address::Account(from),
            to,
            data: AdditionalData::empty(),
        }])
    }

    fn approve_as(
        host: &mut TestHost<State<TestStateApi>>,
        sender: Address,
        token_id: &ContractTokenId,
        approved: Option<Address>,
    ) -> ContractResult<()> {
        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&ApproveParams {
            token_id: token_id.clone(),
            approved,
        });
        ctx.set_sender(sender).set_parameter(&bytes);
        let mut logger = TestLogger::init();
        approve(&ctx, host, &mut logger)
    }

    #[concordium_test]
    fn test_mint() {
        let mut host = default_host();
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(ALICE));
        let mut logger = TestLogger::init();

        claim_eq!(mint(&ctx, &mut host, &mut logger), Ok(token_id_of(0)));
        claim_eq!(mint(&ctx, &mut host, &mut logger), Ok(token_id_of(1)));

        claim_eq!(
            host.state().owner_of(&token_id_of(1)),
            Ok(Address::Account(ALICE))
        );
        claim_eq!(logger.logs.len(), 4);
        claim!(logger.logs.contains(&to_bytes(&Cis2Event::Mint(MintEvent {
            token_id: token_id_of(0),
            amount: ContractTokenAmount::from(1u64),
            owner: Address::Account(ALICE),
        }))));
        claim!(logger
            .logs
            .contains(&to_bytes(&token_metadata_event(token_id_of(1), METADATA_URL))));
    }

    #[concordium_test]
    fn test_transfer_by_owner() {
        let (mut host, token_id) = minted_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&transfer_params(&token_id, ALICE, Receiver::Account(BOB)));
        ctx.set_sender(Address::Account(ALICE))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = transfer(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().owner_of(&token_id),
            Ok(Address::Account(BOB))
        );
        claim!(logger.logs.contains(&to_bytes(
            &Cis2Event::<ContractTokenId, ContractTokenAmount>::Transfer(TransferEvent {
                token_id,
                amount: ContractTokenAmount::from(1u64),
                from: Address::Account(ALICE),
                to: Address::Account(BOB),
            })
        )));
    }

    #[concordium_test]
    fn test_transfer_not_authorized() {
        let (mut host, token_id) = minted_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&transfer_params(&token_id, ALICE, Receiver::Account(BOB)));
        ctx.set_sender(Address::Contract(MARKETPLACE))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = transfer(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(ContractError::Unauthorized));
        claim_eq!(
            host.state().owner_of(&token_id),
            Ok(Address::Account(ALICE))
        );
    }

    #[concordium_test]
    fn test_transfer_by_approved() {
        let (mut host, token_id) = minted_host();
        claim_eq!(
            approve_as(
                &mut host,
                Address::Account(ALICE),
                &token_id,
                Some(Address::Contract(MARKETPLACE))
            ),
            Ok(())
        );

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&transfer_params(&token_id, ALICE, Receiver::Account(BOB)));
        ctx.set_sender(Address::Contract(MARKETPLACE))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = transfer(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().owner_of(&token_id),
            Ok(Address::Account(BOB))
        );
        // Approval does not survive the transfer
        claim_eq!(host.state().approved(&token_id), Ok(None));
    }

    #[concordium_test]
    fn test_transfer_by_operator() {
        let (mut host, token_id) = minted_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&UpdateOperatorParams(vec![UpdateOperator {
            update: OperatorUpdate::Add,
            operator: Address::Contract(MARKETPLACE),
        }]));
        ctx.set_sender(Address::Account(ALICE))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        claim_eq!(update_operator(&ctx, &mut host, &mut logger), Ok(()));

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&OperatorOfQueryParams {
            queries: vec![OperatorOfQuery {
                owner: Address::Account(ALICE),
                address: Address::Contract(MARKETPLACE),
            }],
        });
        ctx.set_parameter(&bytes);
        claim_eq!(
            operator_of(&ctx, &host),
            Ok(OperatorOfQueryResponse(vec![true]))
        );

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&transfer_params(&token_id, ALICE, Receiver::Account(BOB)));
        ctx.set_sender(Address::Contract(MARKETPLACE))
            .set_parameter(&bytes);
        claim_eq!(transfer(&ctx, &mut host, &mut logger), Ok(()));
        claim_eq!(
            host.state().owner_of(&token_id),
            Ok(Address::Account(BOB))
        );
    }

    #[concordium_test]
    fn test_transfer_to_contract() {
        let (mut host, token_id) = minted_host();
        let receiver = ContractAddress {
            index: 5,
            subindex: 0,
        };
        host.setup_mock_entrypoint(
            receiver,
            OwnedEntrypointName::new_unchecked("onReceivingCIS2".into()),
            parse_and_ok_mock::<OnReceivingCis2Params<ContractTokenId, ContractTokenAmount>, _>(()),
        );

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&transfer_params(
            &token_id,
            ALICE,
            Receiver::Contract(
                receiver,
                OwnedEntrypointName::new_unchecked("onReceivingCIS2".into()),
            ),
        ));
        ctx.set_sender(Address::Account(ALICE))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = transfer(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().owner_of(&token_id),
            Ok(Address::Contract(receiver))
        );
    }

    #[concordium_test]
    fn test_approve() {
        let (mut host, token_id) = minted_host();

        claim_eq!(
            approve_as(
                &mut host,
                Address::Account(BOB),
                &token_id,
                Some(Address::Account(BOB))
            ),
            Err(ContractError::Unauthorized)
        );
        claim_eq!(
            approve_as(
                &mut host,
                Address::Account(ALICE),
                &token_id,
                Some(Address::Account(ALICE))
            ),
            Err(CustomContractError::ApprovalToOwner.into())
        );
        claim_eq!(
            approve_as(
                &mut host,
                Address::Account(ALICE),
                &token_id,
                Some(Address::Contract(MARKETPLACE))
            ),
            Ok(())
        );

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_parameter(&bytes);
        claim_eq!(
            get_approved(&ctx, &host),
            Ok(Some(Address::Contract(MARKETPLACE)))
        );
        claim_eq!(owner_of(&ctx, &host), Ok(Address::Account(ALICE)));

        let bytes = to_bytes(&token_id_of(9));
        ctx.set_parameter(&bytes);
        claim_eq!(get_approved(&ctx, &host), Err(ContractError::InvalidTokenId));
        claim_eq!(owner_of(&ctx, &host), Err(ContractError::InvalidTokenId));
    }

    #[concordium_test]
    fn test_approve_logs_event() {
        let (mut host, token_id) = minted_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&ApproveParams {
            token_id: token_id.clone(),
            approved: Some(Address::Contract(MARKETPLACE)),
        });
        ctx.set_sender(Address::Account(ALICE))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        claim_eq!(approve(&ctx, &mut host, &mut logger), Ok(()));
        claim!(logger
            .logs
            .contains(&to_bytes(&BasicNftEvent::Approval(ApprovalEvent {
                token_id,
                owner: Address::Account(ALICE),
                approved: Some(Address::Contract(MARKETPLACE)),
            }))));
    }

    #[concordium_test]
    fn test_balance_of() {
        let (host, token_id) = minted_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&ContractBalanceOfQueryParams {
            queries: vec![
                BalanceOfQuery {
                    token_id: token_id.clone(),
                    address: Address::Account(ALICE),
                },
                BalanceOfQuery {
                    token_id: token_id.clone(),
                    address: Address::Account(BOB),
                },
            ],
        });
        ctx.set_parameter(&bytes);

        claim_eq!(
            balance_of(&ctx, &host),
            Ok(BalanceOfQueryResponse(vec![
                ContractTokenAmount::from(1u64),
                ContractTokenAmount::from(0u64)
            ]))
        );

        let bytes = to_bytes(&ContractBalanceOfQueryParams {
            queries: vec![BalanceOfQuery {
                token_id: token_id_of(9),
                address: Address::Account(ALICE),
            }],
        });
        ctx.set_parameter(&bytes);
        claim_eq!(balance_of(&ctx, &host), Err(ContractError::InvalidTokenId));
    }

    #[concordium_test]
    fn test_token_metadata() {
        let (host, token_id) = minted_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&ContractTokenMetadataQueryParams {
            queries: vec![token_id],
        });
        ctx.set_parameter(&bytes);

        let response = token_metadata(&ctx, &host).expect_report("Failed to query metadata");

        claim_eq!(response.0.len(), 1);
        claim_eq!(response.0[0].url, String::from(METADATA_URL));
    }
}
