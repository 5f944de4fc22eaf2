/// Tag for the custom Listed event.
pub const LISTED_TAG: u8 = u8::MAX - 5;

/// Tag for the custom Sold event.
pub const SOLD_TAG: u8 = u8::MAX - 6;

/// Tag for the custom Canceled event.
pub const CANCELED_TAG: u8 = u8::MAX - 7;
