use commons::{
    ContractBalanceOfQueryParams, ContractBalanceOfQueryResponse, ContractError, ContractResult,
    ContractTokenAmount, ContractTokenId, CustomContractError, TransferParameter,
};
use concordium_cis2::*;
use concordium_std::*;

use crate::external::MintParams;
use crate::state::State;

/// Initialize the contract instance with no tokens.
#[init(contract = "MarketplaceNFT")]
fn init<S: HasStateApi>(
    _ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    Ok(State::empty(state_builder))
}

/// Mint a new token with the sender as owner.
///
/// Logs a `Mint` and a `TokenMetadata` event.
///
/// It rejects if:
/// - Fails to parse parameter.
/// - The token ID already exists.
/// - Fails to log an event.
#[receive(
    contract = "MarketplaceNFT",
    name = "mint",
    parameter = "MintParams",
    mutable,
    enable_logger
)]
fn mint<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: MintParams = ctx.parameter_cursor().get()?;
    let owner = ctx.sender();

    let (state, state_builder) = host.state_and_builder();
    state.mint(params.token_id.clone(), params.url.clone(), owner, state_builder)?;

    // Event for the newly minted NFT.
    logger.log(&Cis2Event::Mint(MintEvent {
        token_id: params.token_id.clone(),
        amount: ContractTokenAmount::from(1),
        owner,
    }))?;

    // Metadata URL for the NFT.
    logger.log(
        &Cis2Event::<ContractTokenId, ContractTokenAmount>::TokenMetadata(TokenMetadataEvent {
            token_id: params.token_id,
            metadata_url: MetadataUrl {
                url: params.url,
                hash: None,
            },
        }),
    )?;

    Ok(())
}

/// Execute a list of token transfers, in the order of the list.
///
/// Logs a `Transfer` event for each transfer in the list and invokes the
/// receive hook function on every receiving contract.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - Any of the transfers fail to be executed, which could be if:
///     - The `token_id` does not exist.
///     - The sender is neither the `from` address nor an operator of it.
///     - The token is not owned by the `from` address.
/// - Fails to log an event.
/// - Any receive hook on a receiving contract rejects.
#[receive(
    contract = "MarketplaceNFT",
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
        let (state, state_builder) = host.state_and_builder();
        // Authenticate the sender for this transfer
        ensure!(
            transfer.from == sender || state.is_operator(&sender, &transfer.from),
            ContractError::Unauthorized
        );

        let to_address = transfer.to.address();
        // Update the contract state
        state.transfer(
            &transfer.token_id,
            transfer.amount,
            &transfer.from,
            &to_address,
            state_builder,
        )?;

        // Log transfer event
        logger.log(&Cis2Event::Transfer(TransferEvent {
            token_id: transfer.token_id.clone(),
            amount: transfer.amount,
            from: transfer.from,
            to: to_address,
        }))?;

        // If the receiver is a contract, invoke its receive hook.
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

/// Enable or disable addresses as operators of the invoker.
/// Logs an `UpdateOperator` event for each update.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - Fails to log an event.
#[receive(
    contract = "MarketplaceNFT",
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
    let sender = Address::Account(ctx.invoker());

    let (state, state_builder) = host.state_and_builder();
    for param in params {
        // Update the operator in the state.
        match param.update {
            OperatorUpdate::Add => state.add_operator(&sender, &param.operator, state_builder),
            OperatorUpdate::Remove => state.remove_operator(&sender, &param.operator),
        }

        // Log the appropriate event
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

/// Takes a list of queries. Each query is an owner address and some address
/// to check as an operator of the owner address.
///
/// It rejects if it fails to parse the parameter.
#[receive(
    contract = "MarketplaceNFT",
    name = "operatorOf",
    parameter = "OperatorOfQueryParams",
    return_value = "OperatorOfQueryResponse"
)]
fn operator_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>>,
) -> ContractResult<OperatorOfQueryResponse> {
    let params: OperatorOfQueryParams = ctx.parameter_cursor().get()?;
    let mut response = Vec::with_capacity(params.queries.len());
    let state = host.state();
    for query in params.queries {
        let is_operator = state.is_operator(&query.address, &query.owner);
        response.push(is_operator);
    }

    Ok(OperatorOfQueryResponse::from(response))
}

/// Get the balance of given token IDs and addresses.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - Any of the queried `token_id` does not exist.
#[receive(
    contract = "MarketplaceNFT",
    name = "balanceOf",
    parameter = "ContractBalanceOfQueryParams",
    return_value = "ContractBalanceOfQueryResponse"
)]
fn balance_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>>,
) -> ContractResult<ContractBalanceOfQueryResponse> {
    let params: ContractBalanceOfQueryParams = ctx.parameter_cursor().get()?;
    let mut response = Vec::with_capacity(params.queries.len());
    let state = host.state();
    for query in params.queries {
        let amount = state.balance(&query.token_id, &query.address)?;
        response.push(amount);
    }

    Ok(ContractBalanceOfQueryResponse::from(response))
}

/// Get the current owner of a token.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - The token does not exist.
#[receive(
    contract = "MarketplaceNFT",
    name = "ownerOf",
    parameter = "ContractTokenId",
    return_value = "Address"
)]
fn owner_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>>,
) -> ContractResult<Address> {
    let token_id: ContractTokenId = ctx.parameter_cursor().get()?;
    host.state().owner_of(&token_id)
}

/// Get the metadata URL of a token.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - The token does not exist.
#[receive(
    contract = "MarketplaceNFT",
    name = "tokenMetadata",
    parameter = "ContractTokenId",
    return_value = "MetadataUrl"
)]
fn token_metadata<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>>,
) -> ContractResult<MetadataUrl> {
    let token_id: ContractTokenId = ctx.parameter_cursor().get()?;
    let url = host.state().metadata_url(&token_id)?;
    Ok(MetadataUrl { url, hash: None })
}

/// Get every token currently owned by the given address.
///
/// It rejects if it fails to parse the parameter.
#[receive(
    contract = "MarketplaceNFT",
    name = "getOwnedTokens",
    parameter = "Address",
    return_value = "Vec<ContractTokenId>"
)]
fn get_owned_tokens<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>>,
) -> ContractResult<Vec<ContractTokenId>> {
    let address: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().owned_tokens(&address))
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::test::parse_and_check_mock;
    use concordium_std::test_infrastructure::*;

    const USER_1: AccountAddress = AccountAddress([1; 32]);
    const USER_2: AccountAddress = AccountAddress([2; 32]);
    const MARKETPLACE: ContractAddress = ContractAddress {
        index: 5,
        subindex: 0,
    };

    fn token_7() -> ContractTokenId {
        TokenIdVec(vec![7])
    }

    fn new_host() -> TestHost<State<TestStateApi>> {
        let mut state_builder = TestStateBuilder::new();
        let state = State::empty(&mut state_builder);
        TestHost::new(state, state_builder)
    }

    fn mint_to(host: &mut TestHost<State<TestStateApi>>, owner: AccountAddress) {
        let params = MintParams {
            token_id: token_7(),
            url: String::from("https://example.com/token/7"),
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(owner)).set_parameter(&bytes);
        let mut logger = TestLogger::init();
        let result = mint(&ctx, host, &mut logger);
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_mint() {
        let mut host = new_host();
        let params = MintParams {
            token_id: token_7(),
            url: String::from("https://example.com/token/7"),
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(USER_1)).set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = mint(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().owner_of(&token_7()),
            Ok(Address::Account(USER_1))
        );
        claim_eq!(
            host.state().balance(&token_7(), &Address::Account(USER_1)),
            Ok(1.into())
        );
        claim_eq!(host.state().owned_tokens(&Address::Account(USER_1)), vec![token_7()]);
        claim_eq!(logger.logs.len(), 2);
        claim!(logger.logs.contains(&to_bytes(&Cis2Event::Mint(MintEvent {
            token_id: token_7(),
            amount: ContractTokenAmount::from(1),
            owner: Address::Account(USER_1),
        }))));
    }

    #[concordium_test]
    fn test_mint_duplicate_token_id() {
        let mut host = new_host();
        mint_to(&mut host, USER_1);

        let params = MintParams {
            token_id: token_7(),
            url: String::from("https://example.com/token/7-again"),
        };
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(USER_2)).set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = mint(&ctx, &mut host, &mut logger);

        claim_eq!(
            result,
            Err(ContractError::Custom(
                CustomContractError::TokenIdAlreadyExists
            ))
        );
        // Ownership is unchanged.
        claim_eq!(
            host.state().owner_of(&token_7()),
            Ok(Address::Account(USER_1))
        );
    }

    #[concordium_test]
    fn test_transfer_by_owner() {
        let mut host = new_host();
        mint_to(&mut host, USER_1);

        let params: TransferParameter = TransferParams(vec![Transfer {
            token_id: token_7(),
            amount: 1.into(),
            from: Address::Account(USER_1),
            to: Receiver::Account(USER_2),
            data: AdditionalData::empty(),
        }]);
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(USER_1)).set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = transfer(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().owner_of(&token_7()),
            Ok(Address::Account(USER_2))
        );
        claim_eq!(
            host.state().balance(&token_7(), &Address::Account(USER_1)),
            Ok(0.into())
        );
        claim_eq!(
            host.state().balance(&token_7(), &Address::Account(USER_2)),
            Ok(1.into())
        );
        claim!(logger.logs.contains(&to_bytes(&Cis2Event::Transfer(
            TransferEvent {
                token_id: token_7(),
                amount: ContractTokenAmount::from(1),
                from: Address::Account(USER_1),
                to: Address::Account(USER_2),
            }
        ))));
    }

    #[concordium_test]
    fn test_transfer_unauthorized() {
        let mut host = new_host();
        mint_to(&mut host, USER_1);

        let params: TransferParameter = TransferParams(vec![Transfer {
            token_id: token_7(),
            amount: 1.into(),
            from: Address::Account(USER_1),
            to: Receiver::Account(USER_2),
            data: AdditionalData::empty(),
        }]);
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(USER_2)).set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = transfer(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(ContractError::Unauthorized));
        claim_eq!(
            host.state().owner_of(&token_7()),
            Ok(Address::Account(USER_1))
        );
    }

    #[concordium_test]
    fn test_transfer_by_operator() {
        let mut host = new_host();
        mint_to(&mut host, USER_1);

        // USER_1 enables USER_2 as operator.
        let update = UpdateOperatorParams(vec![UpdateOperator {
            update: OperatorUpdate::Add,
            operator: Address::Account(USER_2),
        }]);
        let bytes = to_bytes(&update);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(USER_1))
            .set_invoker(USER_1)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        claim_eq!(update_operator(&ctx, &mut host, &mut logger), Ok(()));
        claim!(host
            .state()
            .is_operator(&Address::Account(USER_2), &Address::Account(USER_1)));

        // USER_2 moves the token on USER_1's behalf.
        let params: TransferParameter = TransferParams(vec![Transfer {
            token_id: token_7(),
            amount: 1.into(),
            from: Address::Account(USER_1),
            to: Receiver::Account(USER_2),
            data: AdditionalData::empty(),
        }]);
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(USER_2)).set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = transfer(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().owner_of(&token_7()),
            Ok(Address::Account(USER_2))
        );
    }

    #[concordium_test]
    fn test_transfer_zero_amount_is_noop() {
        let mut host = new_host();
        mint_to(&mut host, USER_1);

        let params: TransferParameter = TransferParams(vec![Transfer {
            token_id: token_7(),
            amount: 0.into(),
            from: Address::Account(USER_1),
            to: Receiver::Account(USER_2),
            data: AdditionalData::empty(),
        }]);
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(USER_1)).set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = transfer(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().owner_of(&token_7()),
            Ok(Address::Account(USER_1))
        );
    }

    #[concordium_test]
    fn test_transfer_to_contract_invokes_hook() {
        let mut host = new_host();
        mint_to(&mut host, USER_1);

        host.setup_mock_entrypoint(
            MARKETPLACE,
            OwnedEntrypointName::new_unchecked(String::from("onReceivingCIS2")),
            parse_and_check_mock::<OnReceivingCis2Params<ContractTokenId, ContractTokenAmount>, _>(
                |hook| hook.from == Address::Account(USER_1) && hook.amount == 1.into(),
                (),
            ),
        );

        let params: TransferParameter = TransferParams(vec![Transfer {
            token_id: token_7(),
            amount: 1.into(),
            from: Address::Account(USER_1),
            to: Receiver::Contract(
                MARKETPLACE,
                OwnedEntrypointName::new_unchecked(String::from("onReceivingCIS2")),
            ),
            data: AdditionalData::empty(),
        }]);
        let bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(USER_1)).set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = transfer(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(
            host.state().owner_of(&token_7()),
            Ok(Address::Contract(MARKETPLACE))
        );
    }

    #[concordium_test]
    fn test_owner_of_unknown_token() {
        let host = new_host();
        let token_id = token_7();
        let bytes = to_bytes(&token_id);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&bytes);

        let result = owner_of(&ctx, &host);

        claim_eq!(result, Err(ContractError::InvalidTokenId));
    }

    #[concordium_test]
    fn test_token_metadata() {
        let mut host = new_host();
        mint_to(&mut host, USER_1);

        let bytes = to_bytes(&token_7());
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&bytes);

        let result = token_metadata(&ctx, &host);

        claim_eq!(
            result,
            Ok(MetadataUrl {
                url: String::from("https://example.com/token/7"),
                hash: None,
            })
        );
    }
}
