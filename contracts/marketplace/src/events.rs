use commons::{MarketItemId, Token, CANCELED_TAG, LISTED_TAG, SOLD_TAG};
use concordium_std::*;

/// Listing created event data.
#[derive(Debug, Serial)]
pub struct ListedEvent<'a> {
    /// Identifier of the listing.
    pub market_item_id: MarketItemId,
    /// The listed token.
    pub token: &'a Token,
    /// Account that created the listing.
    pub seller: &'a AccountAddress,
    /// Purchase price.
    pub price: Amount,
}

/// Listing sold event data.
#[derive(Debug, Serial)]
pub struct SoldEvent<'a> {
    /// Identifier of the listing.
    pub market_item_id: MarketItemId,
    /// The sold token.
    pub token: &'a Token,
    /// Account that created the listing.
    pub seller: &'a AccountAddress,
    /// Account that bought the token.
    pub buyer: &'a AccountAddress,
    /// Price paid to the seller.
    pub price: Amount,
}

/// Listing canceled event data.
#[derive(Debug, Serial)]
pub struct CanceledEvent<'a> {
    /// Identifier of the listing.
    pub market_item_id: MarketItemId,
    /// The withdrawn token.
    pub token: &'a Token,
    /// Account that created, and withdrew, the listing.
    pub seller: &'a AccountAddress,
}

/// Tagged custom event to be serialized for the event log. One variant per
/// listing state transition.
#[derive(Debug)]
pub enum MarketEvent<'a> {
    /// A listing was created.
    Listed(ListedEvent<'a>),
    /// A listing was sold.
    Sold(SoldEvent<'a>),
    /// A listing was withdrawn by its seller.
    Canceled(CanceledEvent<'a>),
}

impl<'a> MarketEvent<'a> {
    pub fn listed(
        market_item_id: MarketItemId,
        token: &'a Token,
        seller: &'a AccountAddress,
        price: Amount,
    ) -> Self {
        Self::Listed(ListedEvent {
            market_item_id,
            token,
            seller,
            price,
        })
    }

    pub fn sold(
        market_item_id: MarketItemId,
        token: &'a Token,
        seller: &'a AccountAddress,
        buyer: &'a AccountAddress,
        price: Amount,
    ) -> Self {
        Self::Sold(SoldEvent {
            market_item_id,
            token,
            seller,
            buyer,
            price,
        })
    }

    pub fn canceled(
        market_item_id: MarketItemId,
        token: &'a Token,
        seller: &'a AccountAddress,
    ) -> Self {
        Self::Canceled(CanceledEvent {
            market_item_id,
            token,
            seller,
        })
    }
}

impl<'a> Serial for MarketEvent<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            MarketEvent::Listed(event) => {
                out.write_u8(LISTED_TAG)?;
                event.serial(out)
            }
            MarketEvent::Sold(event) => {
                out.write_u8(SOLD_TAG)?;
                event.serial(out)
            }
            MarketEvent::Canceled(event) => {
                out.write_u8(CANCELED_TAG)?;
                event.serial(out)
            }
        }
    }
}
