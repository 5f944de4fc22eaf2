use commons::{CustomContractError, Token, TransferParameter};
use concordium_cis2::{AdditionalData, Receiver, Transfer, TransferParams};
use concordium_std::*;

/// Name of the receive hook the registry invokes when this contract takes
/// custody of a token.
pub const RECEIVE_HOOK_NAME: &str = "onReceivingCIS2";

/// Pull the listed token from the seller into marketplace custody. The
/// seller must have enabled the marketplace as an operator on the
/// registry, otherwise the registry rejects the transfer.
pub fn pull_token<T>(
    host: &mut impl HasHost<T>,
    token: &Token,
    seller: AccountAddress,
    self_address: ContractAddress,
) -> ReceiveResult<()> {
    transfer(
        host,
        token,
        Address::Account(seller),
        Receiver::Contract(
            self_address,
            OwnedEntrypointName::new_unchecked(RECEIVE_HOOK_NAME.into()),
        ),
    )
}

/// Transfer a token held in marketplace custody to the given account.
pub fn release_token<T>(
    host: &mut impl HasHost<T>,
    token: &Token,
    self_address: ContractAddress,
    to: AccountAddress,
) -> ReceiveResult<()> {
    transfer(
        host,
        token,
        Address::Contract(self_address),
        Receiver::Account(to),
    )
}

fn transfer<T>(
    host: &mut impl HasHost<T>,
    token: &Token,
    from: Address,
    to: Receiver,
) -> ReceiveResult<()> {
    let parameter: TransferParameter = TransferParams(vec![Transfer {
        token_id: token.id.clone(),
        amount: 1.into(),
        from,
        to,
        data: AdditionalData::empty(),
    }]);

    host.invoke_contract(
        &token.contract,
        &parameter,
        EntrypointName::new_unchecked("transfer"),
        Amount::zero(),
    )
    .map_err(handle_call_error)?;

    Ok(())
}

fn handle_call_error<R>(error: CallContractError<R>) -> Reject {
    match error {
        CallContractError::MissingContract | CallContractError::MissingEntrypoint => {
            CustomContractError::Incompatible.into()
        }
        _ => CustomContractError::InvokeContractError.into(),
    }
}
