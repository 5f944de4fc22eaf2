use super::*;

/// The custom errors the contracts can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum CustomContractError {
    /// Failed parsing the parameter (Error code: -1).
    #[from(ParseError)]
    ParseParams,
    /// Failed logging: Log is full (Error code: -2).
    LogFull,
    /// Failed logging: Log is malformed (Error code: -3).
    LogMalformed,
    /// Failing to mint new tokens because the token ID already exists
    /// in this contract (Error code: -4).
    TokenIdAlreadyExists,
    /// No market item with this identifier (Error code: -5).
    UnknownMarketItem,
    /// Market item was already sold or canceled (Error code: -6).
    MarketItemNotActive,
    /// Listing price must be strictly positive (Error code: -7).
    InvalidPrice,
    /// Attached payment does not match the listing fee (Error code: -8).
    IncorrectListingFee,
    /// Attached payment does not match the item price (Error code: -9).
    IncorrectPaymentAmount,
    /// Only account addresses can call this function (Error code: -10).
    OnlyAccountAddress,
    /// This function must only be called by a contract (Error code: -11).
    ContractOnly,
    /// Unauthorized (Error code: -12).
    Unauthorized,
    /// No fees accrued to withdraw (Error code: -13).
    NoFeesToWithdraw,
    /// Failed to invoke a contract (Error code: -14).
    InvokeContractError,
    /// Failed to invoke a transfer (Error code: -15).
    InvokeTransferError,
    /// Incompatible contract (Error code: -16).
    Incompatible,
    /// Unsupported (Error code: -17).
    Unsupported,
}

/// Mapping the logging errors to CustomContractError.
impl From<LogError> for CustomContractError {
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}

/// Mapping errors related to contract invocations to CustomContractError.
impl<T> From<CallContractError<T>> for CustomContractError {
    fn from(_cce: CallContractError<T>) -> Self {
        Self::InvokeContractError
    }
}

/// Mapping errors related to transfer invocations to CustomContractError.
impl From<TransferError> for CustomContractError {
    fn from(_te: TransferError) -> Self {
        Self::InvokeTransferError
    }
}

/// Mapping CustomContractError to ContractError.
impl From<CustomContractError> for ContractError {
    fn from(c: CustomContractError) -> Self {
        Cis2Error::Custom(c)
    }
}
