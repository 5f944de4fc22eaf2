use commons::{CustomContractError, MarketItemId, Token};
use concordium_std::*;

/// A single listing record. Records are never deleted; once `sold` or
/// `canceled` is set the record is terminal and only kept for historical
/// queries.
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct MarketItem {
    /// Identifier of this listing.
    pub market_item_id: MarketItemId,
    /// The listed token.
    pub token: Token,
    /// Account that created the listing.
    pub seller: AccountAddress,
    /// Custodian-or-buyer: the marketplace contract while the listing is
    /// active, the buyer after a sale, the seller again after a
    /// cancellation.
    pub owner: Address,
    /// Purchase price, fixed at listing time.
    pub price: Amount,
    /// Set once a sale completes.
    pub sold: bool,
    /// Set once the seller withdraws the listing.
    pub canceled: bool,
}

impl MarketItem {
    pub fn is_active(&self) -> bool {
        !self.sold && !self.canceled
    }
}

/// The contract state.
#[derive(Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Fee charged for every listing, fixed at init.
    pub listing_fee: Amount,
    /// Account entitled to the collected listing fees.
    pub beneficiary: AccountAddress,
    /// Listing fees accrued and not yet withdrawn.
    pub collected_fees: Amount,
    /// Last allocated market item identifier. Identifiers are dense and
    /// start at 1.
    pub item_counter: MarketItemId,
    /// Every listing ever created, keyed by identifier.
    pub items: StateMap<MarketItemId, MarketItem, S>,
    /// Identifiers of listings that are neither sold nor canceled. Kept
    /// as a secondary index so active-item queries do not scan the full
    /// history.
    pub active: StateSet<MarketItemId, S>,
}

// Functions for creating and updating the contract state.
impl<S: HasStateApi> State<S> {
    /// Creates a new state with no listings.
    pub fn new(
        state_builder: &mut StateBuilder<S>,
        listing_fee: Amount,
        beneficiary: AccountAddress,
    ) -> Self {
        State {
            listing_fee,
            beneficiary,
            collected_fees: Amount::zero(),
            item_counter: 0,
            items: state_builder.new_map(),
            active: state_builder.new_set(),
        }
    }

    /// Record a new listing under a freshly allocated identifier and
    /// credit the listing fee to the fee account.
    pub fn create_item(
        &mut self,
        token: Token,
        seller: AccountAddress,
        custodian: Address,
        price: Amount,
        fee: Amount,
    ) -> MarketItemId {
        self.item_counter += 1;
        let market_item_id = self.item_counter;
        self.items.insert(
            market_item_id,
            MarketItem {
                market_item_id,
                token,
                seller,
                owner: custodian,
                price,
                sold: false,
                canceled: false,
            },
        );
        self.active.insert(market_item_id);
        self.collected_fees += fee;
        market_item_id
    }

    /// Look up a listing. Fails with UnknownMarketItem if the identifier
    /// was never allocated.
    pub fn item(&self, market_item_id: MarketItemId) -> ReceiveResult<MarketItem> {
        self.items
            .get(&market_item_id)
            .map(|item| item.clone())
            .ok_or_else(|| CustomContractError::UnknownMarketItem.into())
    }

    /// Move an active listing to the terminal sold state, recording the
    /// buyer as the new owner. Fails if the item is unknown or no longer
    /// active.
    pub fn mark_sold(
        &mut self,
        market_item_id: MarketItemId,
        buyer: AccountAddress,
    ) -> ReceiveResult<MarketItem> {
        let mut item = self.item(market_item_id)?;
        ensure!(
            item.is_active(),
            CustomContractError::MarketItemNotActive.into()
        );
        item.sold = true;
        item.owner = Address::Account(buyer);
        self.items.insert(market_item_id, item.clone());
        self.active.remove(&market_item_id);
        Ok(item)
    }

    /// Move an active listing to the terminal canceled state, recording
    /// the seller as owner again. Fails if the item is unknown or no
    /// longer active.
    pub fn mark_canceled(&mut self, market_item_id: MarketItemId) -> ReceiveResult<MarketItem> {
        let mut item = self.item(market_item_id)?;
        ensure!(
            item.is_active(),
            CustomContractError::MarketItemNotActive.into()
        );
        item.canceled = true;
        item.owner = Address::Account(item.seller);
        self.items.insert(market_item_id, item.clone());
        self.active.remove(&market_item_id);
        Ok(item)
    }

    /// Every active listing in ascending identifier order.
    pub fn active_items(&self) -> Vec<MarketItem> {
        let mut ids: Vec<MarketItemId> = self.active.iter().map(|id| *id).collect();
        ids.sort_unstable();
        ids.iter()
            .filter_map(|id| self.items.get(id).map(|item| item.clone()))
            .collect()
    }

    /// Every listing ever created by the given seller, ascending by
    /// identifier.
    pub fn items_by_seller(&self, seller: &AccountAddress) -> Vec<MarketItem> {
        let mut items: Vec<MarketItem> = self
            .items
            .iter()
            .filter(|(_, item)| item.seller == *seller)
            .map(|(_, item)| item.clone())
            .collect();
        items.sort_unstable_by_key(|item| item.market_item_id);
        items
    }

    /// Every listing whose current owner field matches the given address,
    /// ascending by identifier.
    pub fn items_by_owner(&self, owner: &Address) -> Vec<MarketItem> {
        let mut items: Vec<MarketItem> = self
            .items
            .iter()
            .filter(|(_, item)| item.owner == *owner)
            .map(|(_, item)| item.clone())
            .collect();
        items.sort_unstable_by_key(|item| item.market_item_id);
        items
    }

    /// Debit the whole fee account, returning the debited amount.
    pub fn withdraw_fees(&mut self) -> Amount {
        let fees = self.collected_fees;
        self.collected_fees = Amount::zero();
        fees
    }
}
