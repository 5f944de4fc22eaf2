use super::*;

pub type ContractResult<A> = Result<A, ContractError>;

/// Contract token ID type. Variable length, to support tokens from any
/// CIS-2 registry.
pub type ContractTokenId = TokenIdVec;

/// Contract token amount type. Always 0 or 1 for NFTs.
pub type ContractTokenAmount = TokenAmountU64;

/// Wrapping the custom errors in a type with CIS2 errors.
pub type ContractError = Cis2Error<CustomContractError>;

/// Unique identifier of a market item. Allocated sequentially starting
/// from 1, never reused.
pub type MarketItemId = u64;

pub type TransferParameter = TransferParams<ContractTokenId, ContractTokenAmount>;

/// Parameter type for the CIS-2 function `balanceOf` specialized to the
/// subset of TokenIDs used by this contract.
pub type ContractBalanceOfQueryParams = BalanceOfQueryParams<ContractTokenId>;

/// Response type for the CIS-2 function `balanceOf` specialized to the
/// subset of TokenAmounts used by this contract.
pub type ContractBalanceOfQueryResponse = BalanceOfQueryResponse<ContractTokenAmount>;
