use commons::ContractTokenId;
use concordium_std::*;

/// Parameter for the `mint` function.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct MintParams {
    /// Identifier of the token to mint. Must not exist yet.
    pub token_id: ContractTokenId,
    /// Metadata URL of the token, fixed at mint time.
    pub url: String,
}
