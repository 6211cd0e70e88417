use super::*;

pub type ContractResult<A> = Result<A, CustomContractError>;

/// Sequential auction identifier, dense and zero-based.
pub type AuctionId = u64;
