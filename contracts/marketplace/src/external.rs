use commons::{MarketItemId, Token};
use concordium_std::*;

/// Parameter for contract initialization.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct InitParams {
    /// Fee charged for every listing. The deploying account becomes the
    /// fee beneficiary.
    pub listing_fee: Amount,
}

/// Parameter for the `createListing` function.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct CreateListingParams {
    /// The token to list. The seller must have enabled this contract as
    /// an operator on the token's registry.
    pub token: Token,
    /// Purchase price. Must be strictly positive.
    pub price: Amount,
}

/// Parameter for the `executeSale` and `cancelListing` functions.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct ItemParams {
    /// Registry contract the listed token belongs to.
    pub token_contract: ContractAddress,
    /// Identifier of the listing.
    pub market_item_id: MarketItemId,
}

/// Values adjustable by the contract instance owner after deployment.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub enum InternalValue {
    /// Fee charged for every listing.
    ListingFee(Amount),
    /// Account address that receives the collected fees.
    Beneficiary(AccountAddress),
}
