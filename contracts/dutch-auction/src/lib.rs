//! A decreasing price (Dutch) auction contract.
//!
//! # Description
//! Any account can put an item up for auction with a starting price that
//! decreases linearly every second until the auction ends. The first account
//! paying at least the current price buys the item: the seller receives the
//! price minus the platform fee, any overpayment is refunded to the buyer and
//! the fee stays with the contract until the owner withdraws it.
//!
//! Auctions are never removed. Sold and expired auctions stay queryable under
//! their sequential id.

#![cfg_attr(not(feature = "std"), no_std)]

mod contract;
mod events;
mod external;
mod state;
