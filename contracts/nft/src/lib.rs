//! A CIS-2 NFT registry. It owns token identity, ownership and per-address
//! operator approvals, and is the custody collaborator of the marketplace
//! contract.
#![cfg_attr(not(feature = "std"), no_std)]

mod contract;
mod external;
mod state;
