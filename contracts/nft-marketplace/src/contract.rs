use commons::{AuthorityUpdateParams, AuthorityViewParams, CustomContractError, Token};
use concordium_std::*;

use crate::errors::MarketplaceError;
use crate::events::MarketplaceEvent;
use crate::external::*;
use crate::registry;
use crate::state::{Listing, OverpaymentPolicy, RepricePolicy, State};

/// Initialize the marketplace with no listings. The init origin becomes the first admin.
#[init(contract = "NftMarketplace", parameter = "InitParams")]
fn init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params = InitParams::deserial(&mut ctx.parameter_cursor())?;
    Ok(State::new(state_builder, params.config, ctx.init_origin()))
}

/// List a token for sale. The token stays with the seller until it is bought.
///
/// It rejects if:
/// - Sender is not an account;
/// - Fails to parse parameter;
/// - Token is already listed;
/// - Sender does not own the token;
/// - Price is zero;
/// - Marketplace is neither an operator of the sender nor approved for the token;
/// - Collection does not answer the CIS-2 queries.
#[receive(
    mutable,
    contract = "NftMarketplace",
    name = "listItem",
    parameter = "ListItemParams",
    enable_logger
)]
fn list_item<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let seller = match ctx.sender() {
        Address::Account(addr) => addr,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress.into()),
    };
    let params = ListItemParams::deserial(&mut ctx.parameter_cursor())?;

    host.state().ensure_not_listed(&params.token)?;
    registry::ensure_owner(host, &params.token, Address::Account(seller))?;
    ensure!(
        params.price > Amount::zero(),
        MarketplaceError::PriceMustBeAboveZero.into()
    );
    registry::ensure_marketplace_approved(
        host,
        &params.token,
        Address::Account(seller),
        Address::Contract(ctx.self_address()),
    )?;

    logger.log(&MarketplaceEvent::item_listed(
        &params.token,
        params.price,
        &seller,
    ))?;

    host.state_mut().list(
        params.token,
        Listing {
            price: params.price,
            seller,
        },
    );

    Ok(())
}

/// Buy a listed token. The token is transferred from the seller to the buyer and the listing
/// price is credited to the seller's proceeds.
///
/// The listing is removed and the seller credited before the collection is invoked. If the
/// token transfer or the refund fails, both are restored before rejecting.
///
/// It rejects if:
/// - Sender is not an account;
/// - Fails to parse parameter;
/// - Token is not listed;
/// - Payment is below the listing price;
/// - Token transfer fails, e.g. the seller revoked the marketplace approval;
/// - Refund of the excess payment fails.
#[receive(
    mutable,
    payable,
    contract = "NftMarketplace",
    name = "buyItem",
    parameter = "Token",
    enable_logger
)]
fn buy_item<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let buyer = match ctx.sender() {
        Address::Account(addr) => addr,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress.into()),
    };
    let token = Token::deserial(&mut ctx.parameter_cursor())?;

    let listing = host.state().listed(&token)?;
    ensure!(
        amount >= listing.price,
        MarketplaceError::PriceNotMet(token, listing.price).into()
    );

    let listing = host.state_mut().sell(&token)?;
    if let Err(e) = settle(host, &token, &listing, buyer, amount) {
        host.state_mut().revert_sale(token, listing);
        bail!(e);
    }

    logger.log(&MarketplaceEvent::item_bought(&buyer, &token, listing.price))?;

    Ok(())
}

/// Cancel a listing. Only the current owner of the token may cancel it.
///
/// It rejects if:
/// - Fails to parse parameter;
/// - Token is not listed;
/// - Sender does not own the token.
#[receive(
    mutable,
    contract = "NftMarketplace",
    name = "cancelListing",
    parameter = "Token",
    enable_logger
)]
fn cancel_listing<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let token = Token::deserial(&mut ctx.parameter_cursor())?;

    let listing = host.state().listed(&token)?;
    registry::ensure_owner(host, &token, ctx.sender())?;

    logger.log(&MarketplaceEvent::item_canceled(&token, &listing.seller))?;

    host.state_mut().unlist(&token)?;

    Ok(())
}

/// Change the price of a listing. Only the current owner of the token may change it.
///
/// It rejects if:
/// - Fails to parse parameter;
/// - Token is not listed;
/// - Sender does not own the token;
/// - Price is zero and the marketplace requires positive prices.
#[receive(
    mutable,
    contract = "NftMarketplace",
    name = "updatePrice",
    parameter = "UpdatePriceParams",
    enable_logger
)]
fn update_price<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let params = UpdatePriceParams::deserial(&mut ctx.parameter_cursor())?;

    host.state().listed(&params.token)?;
    registry::ensure_owner(host, &params.token, ctx.sender())?;
    if host.state().config.reprice == RepricePolicy::RequirePositive {
        ensure!(
            params.price > Amount::zero(),
            MarketplaceError::PriceMustBeAboveZero.into()
        );
    }

    logger.log(&MarketplaceEvent::price_updated(&params.token, params.price))?;

    host.state_mut().set_price(&params.token, params.price)?;

    Ok(())
}

/// Withdraw all proceeds of the sender.
///
/// It rejects if:
/// - Sender is not an account;
/// - Sender has no proceeds;
/// - CCD transfer fails. The balance is left as it was.
#[receive(mutable, contract = "NftMarketplace", name = "withdraw", enable_logger)]
fn withdraw<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let account = match ctx.sender() {
        Address::Account(addr) => addr,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress.into()),
    };

    let amount = host.state_mut().take_proceeds(&account)?;
    if let Err(e) = host.invoke_transfer(&account, amount) {
        host.state_mut().credit(account, amount);
        bail!(CustomContractError::from(e).into());
    }

    logger.log(&MarketplaceEvent::withdrawal(&account, amount))?;

    Ok(())
}

#[receive(
    contract = "NftMarketplace",
    name = "getListing",
    parameter = "Token",
    return_value = "Option<Listing>"
)]
fn get_listing<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<GetListingResult> {
    let token = Token::deserial(&mut ctx.parameter_cursor())?;
    Ok(host.state().listing(&token))
}

#[receive(
    contract = "NftMarketplace",
    name = "getProceeds",
    parameter = "AccountAddress",
    return_value = "Amount"
)]
fn get_proceeds<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    let account = AccountAddress::deserial(&mut ctx.parameter_cursor())?;
    Ok(host.state().proceeds(&account))
}

#[receive(
    contract = "NftMarketplace",
    name = "viewListings",
    parameter = "ViewListingsParams",
    return_value = "Vec<(Token, Listing)>"
)]
fn view_listings<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewListingsResult> {
    let params = ViewListingsParams::deserial(&mut ctx.parameter_cursor())?;
    Ok(host.state().view_listings(params.skip, params.show))
}

/// Function to manage addresses that are allowed to maintain and modify the state of the contract.
///
///  It rejects if:
///  - Fails to parse `AuthorityUpdateParams` parameters.
///  - If sender is neither one of the admins nor one of the maintainers.
#[receive(
    mutable,
    contract = "NftMarketplace",
    name = "updateAuthority",
    parameter = "AuthorityUpdateParams"
)]
fn update_authority<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<()> {
    let params = AuthorityUpdateParams::deserial(&mut ctx.parameter_cursor())?;
    let sender = ctx.sender();
    host.state_mut()
        .authority
        .handle_update(sender, params)
        .map_err(Reject::from)
}

#[receive(
    contract = "NftMarketplace",
    name = "viewAuthority",
    parameter = "AuthorityViewParams",
    return_value = "Vec<Address>"
)]
fn view_authority<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Vec<Address>> {
    let params = AuthorityViewParams::deserial(&mut ctx.parameter_cursor())?;
    Ok(host.state().authority.handle_view(params))
}

/// Function to update the market policies. This includes:
/// - Overpayment. Whether a payment above the listing price is refunded or kept.
/// - Reprice. Whether `updatePrice` accepts a zero price.
///
///  It rejects if:
///  - Fails to parse `InternalValue` parameters.
///  - If sender is neither one of the admins nor one of the maintainers.
#[receive(
    mutable,
    contract = "NftMarketplace",
    name = "updateInternalValue",
    parameter = "InternalValue"
)]
fn update_internal_value<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<()> {
    host.state().authority.ensure_maintainer(&ctx.sender())?;

    let params = InternalValue::deserial(&mut ctx.parameter_cursor())?;
    let config = &mut host.state_mut().config;

    match params {
        InternalValue::Overpayment(policy) => config.overpayment = policy,
        InternalValue::Reprice(policy) => config.reprice = policy,
    }

    Ok(())
}

#[receive(
    contract = "NftMarketplace",
    name = "viewInternalValue",
    parameter = "ViewInternalValueParams",
    return_value = "InternalValue"
)]
fn view_internal_value<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<InternalValue> {
    let config = host.state().config;
    let params = ViewInternalValueParams::deserial(&mut ctx.parameter_cursor())?;

    let value = match params {
        ViewInternalValueParams::Overpayment => InternalValue::Overpayment(config.overpayment),
        ViewInternalValueParams::Reprice => InternalValue::Reprice(config.reprice),
    };

    Ok(value)
}

// Move the token to the buyer and refund any excess payment, depending on the overpayment policy.
fn settle<S: HasStateApi>(
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    token: &Token,
    listing: &Listing,
    buyer: AccountAddress,
    payment: Amount,
) -> ReceiveResult<()> {
    registry::transfer_token(host, token, listing.seller, buyer)?;

    if host.state().config.overpayment == OverpaymentPolicy::Refund {
        let excess = payment - listing.price;
        if excess > Amount::zero() {
            host.invoke_transfer(&buyer, excess)
                .map_err(CustomContractError::from)?;
        }
    }

    Ok(())
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::test::*;
    use commons::{
        AuthorityField, AuthorityUpdateKind, ContractBalanceOfQueryParams, ContractTokenAmount,
        TransferParameter,
    };
    use concordium_cis2::{
        BalanceOfQueryResponse, OperatorOfQueryParams, OperatorOfQueryResponse, Receiver,
        TokenIdVec,
    };
    use concordium_std::test_infrastructure::*;

    use crate::state::MarketConfig;

    const COLLECTION: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const MARKETPLACE: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };

    const ADMIN: AccountAddress = AccountAddress([1; 32]);
    const MAINTAINER: AccountAddress = AccountAddress([2; 32]);

    const SELLER: AccountAddress = AccountAddress([16; 32]);
    const BUYER: AccountAddress = AccountAddress([17; 32]);

    const PRICE: Amount = Amount::from_ccd(100);

    const REFUND_CONFIG: MarketConfig = MarketConfig {
        overpayment: OverpaymentPolicy::Refund,
        reprice: RepricePolicy::RequirePositive,
    };
    const RETAIN_CONFIG: MarketConfig = MarketConfig {
        overpayment: OverpaymentPolicy::Retain,
        reprice: RepricePolicy::AllowZero,
    };

    fn token() -> Token {
        Token::new(COLLECTION, TokenIdVec(vec![1, 0, 0, 0, 0, 0, 0, 0]))
    }

    fn listing() -> Listing {
        Listing {
            price: PRICE,
            seller: SELLER,
        }
    }

    fn new_host_with(config: MarketConfig) -> TestHost<State<TestStateApi>> {
        let mut ctx = TestInitContext::empty();
        // admin is initialized to `ctx.origin()`
        let bytes = to_bytes(&InitParams { config });
        ctx.set_init_origin(ADMIN).set_parameter(&bytes);
        let mut state_builder = TestStateBuilder::new();

        let state =
            init(&ctx, &mut state_builder).expect_report("Failed during init_NftMarketplace");

        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        let params = AuthorityUpdateParams {
            field: AuthorityField::Maintainer,
            kind: AuthorityUpdateKind::Add,
            address: Address::Account(MAINTAINER),
        };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(ADMIN))
            .set_parameter(&bytes);
        let result = update_authority(&ctx, &mut host);
        claim_eq!(result, Ok(()));

        host
    }

    fn default_host() -> TestHost<State<TestStateApi>> {
        new_host_with(REFUND_CONFIG)
    }

    fn default_listed_host() -> TestHost<State<TestStateApi>> {
        let mut host = default_host();
        host.state_mut().list(token(), listing());
        host
    }

    /// The collection reports `owner` as the only holder of the token.
    fn mock_balance_of(host: &mut TestHost<State<TestStateApi>>, owner: AccountAddress) {
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("balanceOf".into()),
            parse_and_map_mock(move |params: &ContractBalanceOfQueryParams| {
                let balance = if params.queries[0].address == Address::Account(owner) {
                    1u64
                } else {
                    0u64
                };
                Some(BalanceOfQueryResponse(vec![ContractTokenAmount::from(
                    balance,
                )]))
            }),
        );
    }

    fn mock_operator_of(host: &mut TestHost<State<TestStateApi>>, is_operator: bool) {
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("operatorOf".into()),
            parse_and_ok_mock::<OperatorOfQueryParams, _>(OperatorOfQueryResponse(vec![
                is_operator,
            ])),
        );
    }

    fn mock_get_approved(host: &mut TestHost<State<TestStateApi>>, approved: Option<Address>) {
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("getApproved".into()),
            parse_and_ok_mock::<TokenIdVec, _>(approved),
        );
    }

    /// The collection moves the token from `SELLER` to `BUYER`. At that point the listing must
    /// already be gone and the seller credited.
    fn mock_transfer(host: &mut TestHost<State<TestStateApi>>, proceeds: Amount) {
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            parse_and_inspect_mock(
                move |params: &TransferParameter, state: &State<TestStateApi>| {
                    let transfer = &params.0[0];
                    transfer.token_id == token().id
                        && transfer.from == Address::Account(SELLER)
                        && matches!(transfer.to, Receiver::Account(to) if to == BUYER)
                        && state.listing(&token()).is_none()
                        && state.proceeds(&SELLER) == proceeds
                },
            ),
        );
    }

    fn list_item_ctx(bytes: &[u8]) -> TestReceiveContext {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(MARKETPLACE)
            .set_parameter(bytes);
        ctx
    }

    #[concordium_test]
    fn test_init() {
        let host = default_host();
        let state = host.state();

        claim_eq!(state.config, REFUND_CONFIG);
        claim!(state.authority.has_admin_rights(&Address::Account(ADMIN)));
        claim!(state
            .authority
            .has_maintainer_rights(&Address::Account(MAINTAINER)));
        claim!(state.view_listings(0, 10).is_empty());
    }

    #[concordium_test]
    fn test_list_item_as_operator() {
        let mut host = default_host();
        mock_balance_of(&mut host, SELLER);
        mock_operator_of(&mut host, true);

        let bytes = to_bytes(&ListItemParams {
            token: token(),
            price: PRICE,
        });
        let ctx = list_item_ctx(&bytes);
        let mut logger = TestLogger::init();

        let result = list_item(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(host.state().listing(&token()), Some(listing()));
        claim!(logger.logs.contains(&to_bytes(&MarketplaceEvent::item_listed(
            &token(),
            PRICE,
            &SELLER
        ))));
    }

    #[concordium_test]
    fn test_list_item_approved_for_token() {
        let mut host = default_host();
        mock_balance_of(&mut host, SELLER);
        mock_operator_of(&mut host, false);
        mock_get_approved(&mut host, Some(Address::Contract(MARKETPLACE)));

        let bytes = to_bytes(&ListItemParams {
            token: token(),
            price: PRICE,
        });
        let ctx = list_item_ctx(&bytes);
        let mut logger = TestLogger::init();

        let result = list_item(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(host.state().listing(&token()), Some(listing()));
    }

    #[concordium_test]
    fn test_list_item_already_listed() {
        let mut host = default_listed_host();

        // A different price does not matter
        let bytes = to_bytes(&ListItemParams {
            token: token(),
            price: Amount::from_ccd(5),
        });
        let ctx = list_item_ctx(&bytes);
        let mut logger = TestLogger::init();

        let result = list_item(&ctx, &mut host, &mut logger);

        claim_eq!(
            result,
            Err(MarketplaceError::AlreadyListed(token()).into())
        );
        claim_eq!(host.state().listing(&token()), Some(listing()));
        claim!(logger.logs.is_empty());
    }

    #[concordium_test]
    fn test_list_item_not_owner() {
        let mut host = default_host();
        mock_balance_of(&mut host, BUYER);

        let bytes = to_bytes(&ListItemParams {
            token: token(),
            price: PRICE,
        });
        let ctx = list_item_ctx(&bytes);
        let mut logger = TestLogger::init();

        let result = list_item(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(MarketplaceError::NotOwner(token()).into()));
        claim_eq!(host.state().listing(&token()), None);
    }

    #[concordium_test]
    fn test_list_item_zero_price() {
        let mut host = default_host();
        mock_balance_of(&mut host, SELLER);

        let bytes = to_bytes(&ListItemParams {
            token: token(),
            price: Amount::zero(),
        });
        let ctx = list_item_ctx(&bytes);
        let mut logger = TestLogger::init();

        let result = list_item(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(MarketplaceError::PriceMustBeAboveZero.into()));
        claim_eq!(host.state().listing(&token()), None);
    }

    #[concordium_test]
    fn test_list_item_not_approved() {
        let mut host = default_host();
        mock_balance_of(&mut host, SELLER);
        mock_operator_of(&mut host, false);
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("getApproved".into()),
            missing_entrypoint_mock(),
        );

        let bytes = to_bytes(&ListItemParams {
            token: token(),
            price: PRICE,
        });
        let ctx = list_item_ctx(&bytes);
        let mut logger = TestLogger::init();

        let result = list_item(&ctx, &mut host, &mut logger);

        claim_eq!(
            result,
            Err(MarketplaceError::NotApprovedForMarketplace(token()).into())
        );
        claim_eq!(host.state().listing(&token()), None);
    }

    #[concordium_test]
    fn test_list_item_from_contract() {
        let mut host = default_host();

        let bytes = to_bytes(&ListItemParams {
            token: token(),
            price: PRICE,
        });
        let mut ctx = list_item_ctx(&bytes);
        ctx.set_sender(Address::Contract(COLLECTION));
        let mut logger = TestLogger::init();

        let result = list_item(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::OnlyAccountAddress.into()));
    }

    #[concordium_test]
    fn test_buy_item() {
        let mut host = default_listed_host();
        mock_transfer(&mut host, PRICE);
        host.set_self_balance(PRICE);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(MARKETPLACE)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy_item(&ctx, &mut host, PRICE, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(host.state().listing(&token()), None);
        claim_eq!(host.state().proceeds(&SELLER), PRICE);
        claim!(logger.logs.contains(&to_bytes(&MarketplaceEvent::item_bought(
            &BUYER,
            &token(),
            PRICE
        ))));
    }

    #[concordium_test]
    fn test_buy_item_price_not_met() {
        let mut host = default_listed_host();
        let payment = Amount::from_ccd(50);
        host.set_self_balance(payment);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(BUYER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy_item(&ctx, &mut host, payment, &mut logger);

        claim_eq!(
            result,
            Err(MarketplaceError::PriceNotMet(token(), PRICE).into())
        );
        claim_eq!(host.state().listing(&token()), Some(listing()));
        claim_eq!(host.state().proceeds(&SELLER), Amount::zero());
    }

    #[concordium_test]
    fn test_buy_item_not_listed() {
        let mut host = default_host();
        host.set_self_balance(PRICE);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(BUYER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy_item(&ctx, &mut host, PRICE, &mut logger);

        claim_eq!(result, Err(MarketplaceError::NotListed(token()).into()));
    }

    #[concordium_test]
    fn test_buy_item_refunds_excess() {
        let mut host = default_listed_host();
        mock_transfer(&mut host, PRICE);
        let payment = Amount::from_ccd(150);
        host.set_self_balance(payment);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(BUYER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy_item(&ctx, &mut host, payment, &mut logger);

        claim_eq!(result, Ok(()));
        claim!(host.transfer_occurred(&BUYER, Amount::from_ccd(50)));
        // Proceeds grow by the price, not by the payment
        claim_eq!(host.state().proceeds(&SELLER), PRICE);
    }

    #[concordium_test]
    fn test_buy_item_retains_excess() {
        let mut host = new_host_with(RETAIN_CONFIG);
        host.state_mut().list(token(), listing());
        mock_transfer(&mut host, PRICE);
        let payment = Amount::from_ccd(150);
        host.set_self_balance(payment);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(BUYER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy_item(&ctx, &mut host, payment, &mut logger);

        claim_eq!(result, Ok(()));
        claim!(!host.transfer_occurred(&BUYER, Amount::from_ccd(50)));
        claim_eq!(host.state().proceeds(&SELLER), PRICE);
    }

    #[concordium_test]
    fn test_buy_item_transfer_fails() {
        let mut host = default_listed_host();
        host.state_mut().credit(SELLER, Amount::from_ccd(3));
        // Seller revoked the marketplace approval
        host.setup_mock_entrypoint(
            COLLECTION,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            trap_mock(),
        );
        host.set_self_balance(PRICE);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(BUYER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy_item(&ctx, &mut host, PRICE, &mut logger);

        claim_eq!(result, Err(CustomContractError::InvokeContractError.into()));
        claim_eq!(host.state().listing(&token()), Some(listing()));
        claim_eq!(host.state().proceeds(&SELLER), Amount::from_ccd(3));
        claim!(logger.logs.is_empty());
    }

    #[concordium_test]
    fn test_buy_item_refund_fails() {
        let mut host = default_listed_host();
        mock_transfer(&mut host, PRICE);
        let payment = Amount::from_ccd(150);
        // The contract cannot cover the refund
        host.set_self_balance(Amount::from_ccd(10));

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(BUYER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy_item(&ctx, &mut host, payment, &mut logger);

        claim_eq!(result, Err(CustomContractError::InvokeTransferError.into()));
        claim_eq!(host.state().listing(&token()), Some(listing()));
        claim_eq!(host.state().proceeds(&SELLER), Amount::zero());
    }

    #[concordium_test]
    fn test_cancel_listing() {
        let mut host = default_listed_host();
        mock_balance_of(&mut host, SELLER);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = cancel_listing(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(host.state().listing(&token()), None);
        claim!(logger
            .logs
            .contains(&to_bytes(&MarketplaceEvent::item_canceled(
                &token(),
                &SELLER
            ))));
    }

    #[concordium_test]
    fn test_cancel_listing_by_new_owner() {
        let mut host = default_listed_host();
        // Token left the seller outside of the marketplace
        mock_balance_of(&mut host, BUYER);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = cancel_listing(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(MarketplaceError::NotOwner(token()).into()));
        claim_eq!(host.state().listing(&token()), Some(listing()));

        ctx.set_sender(Address::Account(BUYER));
        let result = cancel_listing(&ctx, &mut host, &mut logger);
        claim_eq!(result, Ok(()));
        claim_eq!(host.state().listing(&token()), None);
    }

    #[concordium_test]
    fn test_cancel_listing_not_listed() {
        let mut host = default_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = cancel_listing(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(MarketplaceError::NotListed(token()).into()));
    }

    #[concordium_test]
    fn test_update_price() {
        let mut host = default_listed_host();
        mock_balance_of(&mut host, SELLER);
        let new_price = Amount::from_ccd(250);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&UpdatePriceParams {
            token: token(),
            price: new_price,
        });
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = update_price(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().listing(&token()),
            Some(Listing {
                price: new_price,
                seller: SELLER,
            })
        );
        claim!(logger
            .logs
            .contains(&to_bytes(&MarketplaceEvent::price_updated(
                &token(),
                new_price
            ))));
    }

    #[concordium_test]
    fn test_update_price_not_owner() {
        let mut host = default_listed_host();
        mock_balance_of(&mut host, SELLER);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&UpdatePriceParams {
            token: token(),
            price: Amount::from_ccd(1),
        });
        ctx.set_sender(Address::Account(BUYER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = update_price(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(MarketplaceError::NotOwner(token()).into()));
        claim_eq!(host.state().listing(&token()), Some(listing()));
    }

    #[concordium_test]
    fn test_update_price_by_former_seller() {
        let mut host = default_listed_host();
        // The token moved to the buyer outside the marketplace
        mock_balance_of(&mut host, BUYER);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&UpdatePriceParams {
            token: token(),
            price: Amount::from_ccd(1),
        });
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = update_price(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(MarketplaceError::NotOwner(token()).into()));
        claim_eq!(host.state().listing(&token()), Some(listing()));
        claim!(logger.logs.is_empty());
    }

    #[concordium_test]
    fn test_update_price_zero() {
        let mut host = default_listed_host();
        mock_balance_of(&mut host, SELLER);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&UpdatePriceParams {
            token: token(),
            price: Amount::zero(),
        });
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = update_price(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(MarketplaceError::PriceMustBeAboveZero.into()));
        claim_eq!(host.state().listing(&token()), Some(listing()));

        host.state_mut().config.reprice = RepricePolicy::AllowZero;
        let result = update_price(&ctx, &mut host, &mut logger);
        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().listing(&token()).map(|listing| listing.price),
            Some(Amount::zero())
        );
    }

    #[concordium_test]
    fn test_update_price_not_listed() {
        let mut host = default_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&UpdatePriceParams {
            token: token(),
            price: PRICE,
        });
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = update_price(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(MarketplaceError::NotListed(token()).into()));
    }

    #[concordium_test]
    fn test_withdraw() {
        let mut host = default_host();
        host.state_mut().credit(SELLER, PRICE);
        host.set_self_balance(PRICE);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER));
        let mut logger = TestLogger::init();

        let result = withdraw(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim!(host.transfer_occurred(&SELLER, PRICE));
        claim_eq!(host.state().proceeds(&SELLER), Amount::zero());
        claim!(logger
            .logs
            .contains(&to_bytes(&MarketplaceEvent::withdrawal(&SELLER, PRICE))));

        let result = withdraw(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(MarketplaceError::NoProceeds(SELLER).into()));
    }

    #[concordium_test]
    fn test_withdraw_transfer_fails() {
        let mut host = default_host();
        host.state_mut().credit(SELLER, PRICE);
        host.set_self_balance(Amount::from_ccd(1));

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER));
        let mut logger = TestLogger::init();

        let result = withdraw(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::InvokeTransferError.into()));
        claim_eq!(host.state().proceeds(&SELLER), PRICE);
    }

    #[concordium_test]
    fn test_list_buy_withdraw() {
        let mut host = default_host();
        mock_balance_of(&mut host, SELLER);
        mock_operator_of(&mut host, true);
        mock_transfer(&mut host, PRICE);
        let mut logger = TestLogger::init();

        let bytes = to_bytes(&ListItemParams {
            token: token(),
            price: PRICE,
        });
        let ctx = list_item_ctx(&bytes);
        claim_eq!(list_item(&ctx, &mut host, &mut logger), Ok(()));

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_sender(Address::Account(BUYER))
            .set_parameter(&bytes);
        host.set_self_balance(PRICE);
        claim_eq!(buy_item(&ctx, &mut host, PRICE, &mut logger), Ok(()));

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_parameter(&bytes);
        claim_eq!(get_listing(&ctx, &host), Ok(None));

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&SELLER);
        ctx.set_parameter(&bytes);
        claim_eq!(get_proceeds(&ctx, &host), Ok(PRICE));

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER));
        claim_eq!(withdraw(&ctx, &mut host, &mut logger), Ok(()));
        claim!(host.transfer_occurred(&SELLER, PRICE));
    }

    #[concordium_test]
    fn test_get_listing() {
        let host = default_listed_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token());
        ctx.set_parameter(&bytes);
        claim_eq!(get_listing(&ctx, &host), Ok(Some(listing())));

        let other = Token::new(COLLECTION, TokenIdVec(vec![2, 0, 0, 0, 0, 0, 0, 0]));
        let bytes = to_bytes(&other);
        ctx.set_parameter(&bytes);
        claim_eq!(get_listing(&ctx, &host), Ok(None));

        let bytes = to_bytes(&BUYER);
        ctx.set_parameter(&bytes);
        claim_eq!(get_proceeds(&ctx, &host), Ok(Amount::zero()));
    }

    #[concordium_test]
    fn test_view_listings() {
        let mut host = default_listed_host();
        let other = Token::new(COLLECTION, TokenIdVec(vec![2, 0, 0, 0, 0, 0, 0, 0]));
        host.state_mut().list(other.clone(), listing());

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&ViewListingsParams { skip: 0, show: 10 });
        ctx.set_parameter(&bytes);

        let result = view_listings(&ctx, &host).expect_report("Failed to call viewListings");

        claim_eq!(result.len(), 2);
        claim!(result.contains(&(token(), listing())));
        claim!(result.contains(&(other, listing())));
    }

    #[concordium_test]
    fn test_update_internal_value() {
        let mut host = default_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&InternalValue::Overpayment(OverpaymentPolicy::Retain));
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let result = update_internal_value(&ctx, &mut host);
        claim_eq!(result, Err(CustomContractError::Unauthorized.into()));
        claim_eq!(host.state().config.overpayment, OverpaymentPolicy::Refund);

        ctx.set_sender(Address::Account(MAINTAINER));
        let result = update_internal_value(&ctx, &mut host);
        claim_eq!(result, Ok(()));

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&ViewInternalValueParams::Overpayment);
        ctx.set_parameter(&bytes);
        claim_eq!(
            view_internal_value(&ctx, &host),
            Ok(InternalValue::Overpayment(OverpaymentPolicy::Retain))
        );

        let bytes = to_bytes(&ViewInternalValueParams::Reprice);
        ctx.set_parameter(&bytes);
        claim_eq!(
            view_internal_value(&ctx, &host),
            Ok(InternalValue::Reprice(RepricePolicy::RequirePositive))
        );
    }
}
