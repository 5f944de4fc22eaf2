//! The marketplace ledger. It escrows listed NFTs and listing fees,
//! executes fixed-price sales and lets sellers withdraw their listings.
#![cfg_attr(not(feature = "std"), no_std)]

mod contract;
mod events;
mod external;
mod nft;
mod state;
