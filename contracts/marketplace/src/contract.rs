use commons::{ContractTokenAmount, ContractTokenId, CustomContractError, MarketItemId};
use concordium_cis2::OnReceivingCis2Params;
use concordium_std::*;

use crate::events::MarketEvent;
use crate::external::{CreateListingParams, InitParams, InternalValue, ItemParams};
use crate::nft;
use crate::state::{MarketItem, State};

/// Initialize the marketplace with no listings. The deploying account
/// becomes the fee beneficiary.
#[init(contract = "Marketplace", parameter = "InitParams")]
fn init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params: InitParams = ctx.parameter_cursor().get()?;
    Ok(State::new(
        state_builder,
        params.listing_fee,
        ctx.init_origin(),
    ))
}

/// Get the fee required to create a listing.
#[receive(
    contract = "Marketplace",
    name = "getListingFee",
    return_value = "Amount"
)]
fn get_listing_fee<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    Ok(host.state().listing_fee)
}

/// List a token for sale at a fixed price.
///
/// The listing fee must be attached in full and is not refunded, whatever
/// the outcome of the listing. The token is pulled into marketplace
/// custody, so the seller must have enabled this contract as an operator
/// on the token's registry beforehand.
///
/// It rejects if:
/// - The sender is a contract.
/// - It fails to parse the parameter.
/// - The price is not strictly positive.
/// - The attached payment differs from the listing fee.
/// - The registry refuses to move the token, which rolls the listing back.
#[receive(
    mutable,
    payable,
    contract = "Marketplace",
    name = "createListing",
    parameter = "CreateListingParams",
    return_value = "MarketItemId",
    enable_logger
)]
fn create_listing<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ReceiveResult<MarketItemId> {
    let seller = get_account_address(ctx.sender())?;
    let params: CreateListingParams = ctx.parameter_cursor().get()?;

    ensure!(
        params.price > Amount::zero(),
        CustomContractError::InvalidPrice.into()
    );
    ensure!(
        amount == host.state().listing_fee,
        CustomContractError::IncorrectListingFee.into()
    );

    let self_address = ctx.self_address();
    let market_item_id = host.state_mut().create_item(
        params.token.clone(),
        seller,
        Address::Contract(self_address),
        params.price,
        amount,
    );

    // Log the listing event.
    logger.log(&MarketEvent::listed(
        market_item_id,
        &params.token,
        &seller,
        params.price,
    ))?;

    // Pull the token into escrow.
    nft::pull_token(host, &params.token, seller, self_address)?;

    Ok(market_item_id)
}

/// Buy a listed token.
///
/// The exact price must be attached. The payment is forwarded to the
/// seller and the token leaves marketplace custody for the buyer. The
/// item record is committed to its terminal sold state before any
/// external transfer, so a reentrant call on the same item fails the
/// active-state check.
///
/// It rejects if:
/// - The sender is a contract.
/// - It fails to parse the parameter.
/// - The market item does not exist or belongs to another registry.
/// - The item was already sold or canceled.
/// - The attached payment differs from the item price.
#[receive(
    mutable,
    payable,
    contract = "Marketplace",
    name = "executeSale",
    parameter = "ItemParams",
    enable_logger
)]
fn execute_sale<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let buyer = get_account_address(ctx.sender())?;
    let params: ItemParams = ctx.parameter_cursor().get()?;

    let item = host.state().item(params.market_item_id)?;
    ensure!(
        item.token.contract == params.token_contract,
        CustomContractError::UnknownMarketItem.into()
    );
    ensure!(
        item.is_active(),
        CustomContractError::MarketItemNotActive.into()
    );
    ensure!(
        amount == item.price,
        CustomContractError::IncorrectPaymentAmount.into()
    );

    let item = host.state_mut().mark_sold(params.market_item_id, buyer)?;

    // Log the sale event.
    logger.log(&MarketEvent::sold(
        item.market_item_id,
        &item.token,
        &item.seller,
        &buyer,
        item.price,
    ))?;

    // Forward the payment to the seller.
    host.invoke_transfer(&item.seller, item.price)?;

    // Transfer the token to the buyer.
    nft::release_token(host, &item.token, ctx.self_address(), buyer)?;

    Ok(())
}

/// Withdraw a listing. Only the seller can withdraw, and only while the
/// listing is active. The token returns to the seller; the listing fee is
/// not refunded.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - The market item does not exist or belongs to another registry.
/// - The sender is not the seller.
/// - The item was already sold or canceled.
#[receive(
    mutable,
    contract = "Marketplace",
    name = "cancelListing",
    parameter = "ItemParams",
    enable_logger
)]
fn cancel_listing<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let params: ItemParams = ctx.parameter_cursor().get()?;

    let item = host.state().item(params.market_item_id)?;
    ensure!(
        item.token.contract == params.token_contract,
        CustomContractError::UnknownMarketItem.into()
    );
    ensure!(
        ctx.sender().matches_account(&item.seller),
        CustomContractError::Unauthorized.into()
    );
    ensure!(
        item.is_active(),
        CustomContractError::MarketItemNotActive.into()
    );

    let item = host.state_mut().mark_canceled(params.market_item_id)?;

    // Log the cancellation event.
    logger.log(&MarketEvent::canceled(
        item.market_item_id,
        &item.token,
        &item.seller,
    ))?;

    // Return the token to the seller.
    nft::release_token(host, &item.token, ctx.self_address(), item.seller)?;

    Ok(())
}

/// Get every listing that is neither sold nor canceled, in ascending
/// market item identifier order.
#[receive(
    contract = "Marketplace",
    name = "fetchActiveItems",
    return_value = "Vec<MarketItem>"
)]
fn fetch_active_items<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Vec<MarketItem>> {
    Ok(host.state().active_items())
}

/// Get every listing ever created by the given seller, including sold and
/// canceled ones, in ascending market item identifier order.
#[receive(
    contract = "Marketplace",
    name = "fetchItemsBySeller",
    parameter = "AccountAddress",
    return_value = "Vec<MarketItem>"
)]
fn fetch_items_by_seller<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Vec<MarketItem>> {
    let seller: AccountAddress = ctx.parameter_cursor().get()?;
    Ok(host.state().items_by_seller(&seller))
}

/// Get every listing whose current owner matches the given address: the
/// marketplace contract for items in escrow, the buyer for sold items,
/// the seller for canceled ones.
#[receive(
    contract = "Marketplace",
    name = "fetchItemsByOwner",
    parameter = "Address",
    return_value = "Vec<MarketItem>"
)]
fn fetch_items_by_owner<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Vec<MarketItem>> {
    let owner: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().items_by_owner(&owner))
}

/// Get the listing fees accrued and not yet withdrawn.
#[receive(
    contract = "Marketplace",
    name = "viewCollectedFees",
    return_value = "Amount"
)]
fn view_collected_fees<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    Ok(host.state().collected_fees)
}

/// Transfer the accrued listing fees to the beneficiary. The fee account
/// is debited before the transfer is invoked.
///
/// It rejects if:
/// - The sender is not the beneficiary.
/// - No fees have accrued.
#[receive(mutable, contract = "Marketplace", name = "withdrawFees")]
fn withdraw_fees<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<()> {
    let beneficiary = host.state().beneficiary;
    ensure!(
        ctx.sender().matches_account(&beneficiary),
        CustomContractError::Unauthorized.into()
    );

    let fees = host.state_mut().withdraw_fees();
    ensure!(
        fees > Amount::zero(),
        CustomContractError::NoFeesToWithdraw.into()
    );

    host.invoke_transfer(&beneficiary, fees)?;

    Ok(())
}

/// Update values required for internal contract functionality. This
/// includes:
/// - Listing fee. Charged for every new listing.
/// - Beneficiary. Account address that receives the collected fees.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - The sender is not the contract instance owner.
#[receive(
    mutable,
    contract = "Marketplace",
    name = "updateInternalValue",
    parameter = "InternalValue"
)]
fn update_internal_value<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        CustomContractError::Unauthorized.into()
    );

    let params: InternalValue = ctx.parameter_cursor().get()?;
    match params {
        InternalValue::ListingFee(fee) => host.state_mut().listing_fee = fee,
        InternalValue::Beneficiary(account) => host.state_mut().beneficiary = account,
    }

    Ok(())
}

/// Receive hook invoked by a token registry when this contract takes
/// custody of a token. The custody transfer is always initiated by this
/// contract itself, so the hook only has to acknowledge the call.
#[receive(
    contract = "Marketplace",
    name = "onReceivingCIS2",
    parameter = "OnReceivingCis2Params<ContractTokenId, ContractTokenAmount>"
)]
fn on_receiving_cis2<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    _host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<()> {
    ensure!(
        matches!(ctx.sender(), Address::Contract(_)),
        CustomContractError::ContractOnly.into()
    );
    let _params: OnReceivingCis2Params<ContractTokenId, ContractTokenAmount> =
        ctx.parameter_cursor().get()?;
    Ok(())
}

fn get_account_address(address: Address) -> ReceiveResult<AccountAddress> {
    match address {
        Address::Account(address) => Ok(address),
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress.into()),
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::test::{parse_and_check_mock, parse_and_ok_mock, reject_mock};
    use commons::{Token, TransferParameter};
    use concordium_cis2::{AdditionalData, Receiver, TokenIdVec, TransferParams};
    use concordium_std::test_infrastructure::*;

    const ADMIN: AccountAddress = AccountAddress([0; 32]);
    const SELLER: AccountAddress = AccountAddress([1; 32]);
    const BUYER: AccountAddress = AccountAddress([2; 32]);
    const OTHER: AccountAddress = AccountAddress([3; 32]);

    const TOKEN_CONTRACT: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const OTHER_CONTRACT: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };
    const SELF_ADDRESS: ContractAddress = ContractAddress {
        index: 10,
        subindex: 0,
    };

    const LISTING_FEE: Amount = Amount::from_micro_ccd(10_000);
    const PRICE: Amount = Amount::from_micro_ccd(1_000_000);

    fn token(id: u8) -> Token {
        Token {
            contract: TOKEN_CONTRACT,
            id: TokenIdVec(vec![id]),
        }
    }

    fn new_host() -> TestHost<State<TestStateApi>> {
        let mut state_builder = TestStateBuilder::new();
        let state = State::new(&mut state_builder, LISTING_FEE, ADMIN);
        TestHost::new(state, state_builder)
    }

    /// Mock the registry `transfer` entrypoint, accepting any transfer.
    fn mock_any_transfer(host: &mut TestHost<State<TestStateApi>>) {
        host.setup_mock_entrypoint(
            TOKEN_CONTRACT,
            OwnedEntrypointName::new_unchecked(String::from("transfer")),
            parse_and_ok_mock::<TransferParameter, _>(()),
        );
    }

    /// Mock the registry `transfer` entrypoint, trapping unless it moves
    /// one token between the expected addresses.
    fn mock_transfer_between(
        host: &mut TestHost<State<TestStateApi>>,
        from: Address,
        to: Address,
    ) {
        host.setup_mock_entrypoint(
            TOKEN_CONTRACT,
            OwnedEntrypointName::new_unchecked(String::from("transfer")),
            parse_and_check_mock::<TransferParameter, _>(
                move |params| {
                    let TransferParams(transfers) = params;
                    if transfers.len() != 1 {
                        return false;
                    }
                    let to_address = match &transfers[0].to {
                        Receiver::Account(address) => Address::Account(*address),
                        Receiver::Contract(address, _) => Address::Contract(*address),
                    };
                    transfers[0].amount == 1.into() && transfers[0].from == from && to_address == to
                },
                (),
            ),
        );
    }

    /// List a token for SELLER at PRICE with the correct fee attached.
    fn list_token(host: &mut TestHost<State<TestStateApi>>, id: u8) -> MarketItemId {
        mock_any_transfer(host);
        let params = CreateListingParams {
            token: token(id),
            price: PRICE,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        create_listing(&ctx, host, LISTING_FEE, &mut logger)
            .expect_report("Listing failed")
    }

    #[concordium_test]
    fn test_init() {
        let mut state_builder = TestStateBuilder::new();
        let mut ctx = TestInitContext::empty();
        let params = InitParams {
            listing_fee: LISTING_FEE,
        };
        let bytes = to_bytes(&params);
        ctx.set_init_origin(ADMIN).set_parameter(&bytes);

        let state = init(&ctx, &mut state_builder).expect_report("Init failed");

        claim_eq!(state.listing_fee, LISTING_FEE);
        claim_eq!(state.beneficiary, ADMIN);
        claim_eq!(state.collected_fees, Amount::zero());
        claim_eq!(state.item_counter, 0);
        claim!(state.active_items().is_empty());
    }

    #[concordium_test]
    fn test_create_listing() {
        let mut host = new_host();
        mock_transfer_between(
            &mut host,
            Address::Account(SELLER),
            Address::Contract(SELF_ADDRESS),
        );

        let params = CreateListingParams {
            token: token(7),
            price: PRICE,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = create_listing(&ctx, &mut host, LISTING_FEE, &mut logger);

        claim_eq!(result, Ok(1));
        let expected = MarketItem {
            market_item_id: 1,
            token: token(7),
            seller: SELLER,
            owner: Address::Contract(SELF_ADDRESS),
            price: PRICE,
            sold: false,
            canceled: false,
        };
        claim_eq!(host.state().item(1), Ok(expected.clone()));
        claim_eq!(host.state().active_items(), vec![expected]);
        claim_eq!(host.state().collected_fees, LISTING_FEE);
        claim!(logger.logs.contains(&to_bytes(&MarketEvent::listed(
            1,
            &token(7),
            &SELLER,
            PRICE
        ))));
    }

    #[concordium_test]
    fn test_create_listing_incorrect_fee() {
        let mut host = new_host();
        mock_any_transfer(&mut host);

        let params = CreateListingParams {
            token: token(7),
            price: PRICE,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = create_listing(
            &ctx,
            &mut host,
            LISTING_FEE + Amount::from_micro_ccd(1),
            &mut logger,
        );

        claim_eq!(result, Err(CustomContractError::IncorrectListingFee.into()));
        claim_eq!(host.state().item_counter, 0);
        claim!(host.state().active_items().is_empty());
        claim_eq!(host.state().collected_fees, Amount::zero());
    }

    #[concordium_test]
    fn test_create_listing_zero_price() {
        let mut host = new_host();
        mock_any_transfer(&mut host);

        let params = CreateListingParams {
            token: token(7),
            price: Amount::zero(),
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = create_listing(&ctx, &mut host, LISTING_FEE, &mut logger);

        claim_eq!(result, Err(CustomContractError::InvalidPrice.into()));
        claim_eq!(host.state().item_counter, 0);
    }

    #[concordium_test]
    fn test_create_listing_registry_rejects() {
        let mut host = new_host();
        // Registry refuses the custody transfer, for example because the
        // seller never enabled the marketplace as operator.
        host.setup_mock_entrypoint(
            TOKEN_CONTRACT,
            OwnedEntrypointName::new_unchecked(String::from("transfer")),
            reject_mock(),
        );

        let params = CreateListingParams {
            token: token(7),
            price: PRICE,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = create_listing(&ctx, &mut host, LISTING_FEE, &mut logger);

        // The chain discards all state changes of a rejected update.
        claim_eq!(result, Err(CustomContractError::InvokeContractError.into()));
    }

    #[concordium_test]
    fn test_execute_sale() {
        let mut host = new_host();
        let market_item_id = list_token(&mut host, 7);
        mock_transfer_between(
            &mut host,
            Address::Contract(SELF_ADDRESS),
            Address::Account(BUYER),
        );
        host.set_self_balance(LISTING_FEE + PRICE);

        let params = ItemParams {
            token_contract: TOKEN_CONTRACT,
            market_item_id,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = execute_sale(&ctx, &mut host, PRICE, &mut logger);

        claim_eq!(result, Ok(()));
        // The seller receives exactly the price.
        claim!(host.transfer_occurred(&SELLER, PRICE));
        let item = host.state().item(market_item_id).expect_report("Missing item");
        claim!(item.sold);
        claim!(!item.canceled);
        claim_eq!(item.owner, Address::Account(BUYER));
        claim!(host.state().active_items().is_empty());
        // The fee stays with the marketplace.
        claim_eq!(host.state().collected_fees, LISTING_FEE);
        claim!(logger.logs.contains(&to_bytes(&MarketEvent::sold(
            market_item_id,
            &token(7),
            &SELLER,
            &BUYER,
            PRICE
        ))));
    }

    #[concordium_test]
    fn test_execute_sale_incorrect_payment() {
        let mut host = new_host();
        let market_item_id = list_token(&mut host, 7);
        host.set_self_balance(LISTING_FEE + PRICE);

        let params = ItemParams {
            token_contract: TOKEN_CONTRACT,
            market_item_id,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = execute_sale(
            &ctx,
            &mut host,
            PRICE - Amount::from_micro_ccd(1),
            &mut logger,
        );

        claim_eq!(
            result,
            Err(CustomContractError::IncorrectPaymentAmount.into())
        );
        // The item remains active and unsold.
        let item = host.state().item(market_item_id).expect_report("Missing item");
        claim!(item.is_active());
        claim_eq!(host.state().active_items().len(), 1);
    }

    #[concordium_test]
    fn test_execute_sale_twice() {
        let mut host = new_host();
        let market_item_id = list_token(&mut host, 7);
        host.set_self_balance(LISTING_FEE + PRICE);

        let params = ItemParams {
            token_contract: TOKEN_CONTRACT,
            market_item_id,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        claim_eq!(execute_sale(&ctx, &mut host, PRICE, &mut logger), Ok(()));

        // A second buyer attempts to buy the same item.
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OTHER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        host.set_self_balance(LISTING_FEE + PRICE);
        let mut logger = TestLogger::init();

        let result = execute_sale(&ctx, &mut host, PRICE, &mut logger);

        claim_eq!(result, Err(CustomContractError::MarketItemNotActive.into()));
        // The record is unchanged: sold to the first buyer.
        let item = host.state().item(market_item_id).expect_report("Missing item");
        claim!(item.sold);
        claim_eq!(item.owner, Address::Account(BUYER));
    }

    #[concordium_test]
    fn test_execute_sale_unknown_item() {
        let mut host = new_host();
        host.set_self_balance(PRICE);

        let params = ItemParams {
            token_contract: TOKEN_CONTRACT,
            market_item_id: 42,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = execute_sale(&ctx, &mut host, PRICE, &mut logger);

        claim_eq!(result, Err(CustomContractError::UnknownMarketItem.into()));
    }

    #[concordium_test]
    fn test_execute_sale_wrong_token_contract() {
        let mut host = new_host();
        let market_item_id = list_token(&mut host, 7);
        host.set_self_balance(LISTING_FEE + PRICE);

        let params = ItemParams {
            token_contract: OTHER_CONTRACT,
            market_item_id,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = execute_sale(&ctx, &mut host, PRICE, &mut logger);

        claim_eq!(result, Err(CustomContractError::UnknownMarketItem.into()));
        claim_eq!(host.state().active_items().len(), 1);
    }

    #[concordium_test]
    fn test_cancel_listing() {
        let mut host = new_host();
        let market_item_id = list_token(&mut host, 7);
        mock_transfer_between(
            &mut host,
            Address::Contract(SELF_ADDRESS),
            Address::Account(SELLER),
        );

        let params = ItemParams {
            token_contract: TOKEN_CONTRACT,
            market_item_id,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = cancel_listing(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        let item = host.state().item(market_item_id).expect_report("Missing item");
        claim!(item.canceled);
        claim!(!item.sold);
        claim_eq!(item.owner, Address::Account(SELLER));
        claim!(host.state().active_items().is_empty());
        // The listing fee is not refunded.
        claim_eq!(host.state().collected_fees, LISTING_FEE);
        claim!(logger.logs.contains(&to_bytes(&MarketEvent::canceled(
            market_item_id,
            &token(7),
            &SELLER
        ))));
    }

    #[concordium_test]
    fn test_cancel_listing_not_seller() {
        let mut host = new_host();
        let market_item_id = list_token(&mut host, 7);

        let params = ItemParams {
            token_contract: TOKEN_CONTRACT,
            market_item_id,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OTHER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = cancel_listing(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::Unauthorized.into()));
        let item = host.state().item(market_item_id).expect_report("Missing item");
        claim!(item.is_active());
    }

    #[concordium_test]
    fn test_cancel_listing_after_sale() {
        let mut host = new_host();
        let market_item_id = list_token(&mut host, 7);
        host.set_self_balance(LISTING_FEE + PRICE);

        let params = ItemParams {
            token_contract: TOKEN_CONTRACT,
            market_item_id,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        claim_eq!(execute_sale(&ctx, &mut host, PRICE, &mut logger), Ok(()));

        // The seller tries to withdraw the already sold listing.
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = cancel_listing(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::MarketItemNotActive.into()));
        // The token stays with the buyer.
        let item = host.state().item(market_item_id).expect_report("Missing item");
        claim!(item.sold);
        claim!(!item.canceled);
        claim_eq!(item.owner, Address::Account(BUYER));
    }

    #[concordium_test]
    fn test_execute_sale_after_cancel() {
        let mut host = new_host();
        let market_item_id = list_token(&mut host, 7);

        let params = ItemParams {
            token_contract: TOKEN_CONTRACT,
            market_item_id,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        claim_eq!(cancel_listing(&ctx, &mut host, &mut logger), Ok(()));

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        host.set_self_balance(LISTING_FEE + PRICE);
        let mut logger = TestLogger::init();

        let result = execute_sale(&ctx, &mut host, PRICE, &mut logger);

        claim_eq!(result, Err(CustomContractError::MarketItemNotActive.into()));
        let item = host.state().item(market_item_id).expect_report("Missing item");
        claim!(item.canceled);
        claim!(!item.sold);
    }

    #[concordium_test]
    fn test_market_item_ids_monotonic() {
        let mut host = new_host();
        claim_eq!(list_token(&mut host, 7), 1);
        claim_eq!(list_token(&mut host, 8), 2);
        claim_eq!(list_token(&mut host, 9), 3);

        // Withdraw item 2 and relist the same token: a fresh identifier
        // is allocated, identifiers are never reused.
        let params = ItemParams {
            token_contract: TOKEN_CONTRACT,
            market_item_id: 2,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        claim_eq!(cancel_listing(&ctx, &mut host, &mut logger), Ok(()));

        claim_eq!(list_token(&mut host, 8), 4);

        let active: Vec<MarketItemId> = host
            .state()
            .active_items()
            .iter()
            .map(|item| item.market_item_id)
            .collect();
        claim_eq!(active, vec![1, 3, 4]);
        claim_eq!(host.state().collected_fees, LISTING_FEE * 4);
    }

    #[concordium_test]
    fn test_fetch_items_by_seller_and_owner() {
        let mut host = new_host();
        let first = list_token(&mut host, 7);
        let second = list_token(&mut host, 8);

        host.set_self_balance(LISTING_FEE * 2 + PRICE);
        let params = ItemParams {
            token_contract: TOKEN_CONTRACT,
            market_item_id: first,
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        claim_eq!(execute_sale(&ctx, &mut host, PRICE, &mut logger), Ok(()));

        // Seller history includes the sold item.
        let by_seller = host.state().items_by_seller(&SELLER);
        let ids: Vec<MarketItemId> = by_seller.iter().map(|item| item.market_item_id).collect();
        claim_eq!(ids, vec![first, second]);
        claim!(host.state().items_by_seller(&OTHER).is_empty());

        // The buyer owns the sold item, the marketplace the active one.
        let by_buyer = host.state().items_by_owner(&Address::Account(BUYER));
        claim_eq!(by_buyer.len(), 1);
        claim_eq!(by_buyer[0].market_item_id, first);
        let in_escrow = host
            .state()
            .items_by_owner(&Address::Contract(SELF_ADDRESS));
        claim_eq!(in_escrow.len(), 1);
        claim_eq!(in_escrow[0].market_item_id, second);
    }

    #[concordium_test]
    fn test_fetch_active_items_view() {
        let mut host = new_host();
        list_token(&mut host, 7);
        list_token(&mut host, 8);

        let ctx = TestReceiveContext::empty();
        let result = fetch_active_items(&ctx, &host).expect_report("Query failed");

        claim_eq!(result.len(), 2);
        claim_eq!(result[0].market_item_id, 1);
        claim_eq!(result[1].market_item_id, 2);
    }

    #[concordium_test]
    fn test_get_listing_fee() {
        let host = new_host();
        let ctx = TestReceiveContext::empty();

        claim_eq!(get_listing_fee(&ctx, &host), Ok(LISTING_FEE));
    }

    #[concordium_test]
    fn test_withdraw_fees() {
        let mut host = new_host();
        list_token(&mut host, 7);
        list_token(&mut host, 8);
        host.set_self_balance(LISTING_FEE * 2);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(ADMIN));

        let result = withdraw_fees(&ctx, &mut host);

        claim_eq!(result, Ok(()));
        claim!(host.transfer_occurred(&ADMIN, LISTING_FEE * 2));
        claim_eq!(host.state().collected_fees, Amount::zero());

        // A second withdrawal has nothing left to pay out.
        let result = withdraw_fees(&ctx, &mut host);
        claim_eq!(result, Err(CustomContractError::NoFeesToWithdraw.into()));
    }

    #[concordium_test]
    fn test_withdraw_fees_unauthorized() {
        let mut host = new_host();
        list_token(&mut host, 7);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OTHER));

        let result = withdraw_fees(&ctx, &mut host);

        claim_eq!(result, Err(CustomContractError::Unauthorized.into()));
        claim_eq!(host.state().collected_fees, LISTING_FEE);
    }

    #[concordium_test]
    fn test_update_internal_value() {
        let mut host = new_host();

        let new_fee = Amount::from_micro_ccd(20_000);
        let params = InternalValue::ListingFee(new_fee);
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(ADMIN))
            .set_owner(ADMIN)
            .set_parameter(&bytes);

        claim_eq!(update_internal_value(&ctx, &mut host), Ok(()));
        claim_eq!(host.state().listing_fee, new_fee);

        // Only the instance owner may update.
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OTHER))
            .set_owner(ADMIN)
            .set_parameter(&bytes);

        let result = update_internal_value(&ctx, &mut host);
        claim_eq!(result, Err(CustomContractError::Unauthorized.into()));
    }

    #[concordium_test]
    fn test_view_collected_fees() {
        let mut host = new_host();
        list_token(&mut host, 7);

        let ctx = TestReceiveContext::empty();
        claim_eq!(view_collected_fees(&ctx, &host), Ok(LISTING_FEE));
    }

    #[concordium_test]
    fn test_receive_hook_rejects_accounts() {
        let host = new_host();
        let params = OnReceivingCis2Params::<ContractTokenId, ContractTokenAmount> {
            token_id: TokenIdVec(vec![7]),
            amount: 1.into(),
            from: Address::Account(SELLER),
            data: AdditionalData::empty(),
        };
        let bytes = to_bytes(&params);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Contract(TOKEN_CONTRACT))
            .set_parameter(&bytes);
        claim_eq!(on_receiving_cis2(&ctx, &host), Ok(()));

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OTHER)).set_parameter(&bytes);
        claim_eq!(
            on_receiving_cis2(&ctx, &host),
            Err(CustomContractError::ContractOnly.into())
        );
    }
}
