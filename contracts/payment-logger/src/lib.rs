//! Payment observer contracts.
//!
//! `PaymentLogger` keeps an append-only list of `(amount, timestamp)` entries
//! per payer. `PaymentReceiver` accepts deposits and reports each one to a
//! logger instance given at initialization.

#![cfg_attr(not(feature = "std"), no_std)]

mod events;
mod external;
mod logger;
mod receiver;
mod state;
