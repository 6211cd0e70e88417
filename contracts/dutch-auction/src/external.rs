use commons::AuctionId;
use concordium_std::*;

/// Parameter of the `createAuction` function.
#[derive(Debug, Clone, Serialize, SchemaType)]
pub struct CreateAuctionParams {
    /// Price at the moment of creation.
    pub starting_price: Amount,
    /// Price decrease per elapsed second.
    pub discount_rate: Amount,
    /// Description of the item on sale.
    pub item: String,
    /// Auction length in seconds.
    pub duration: u64,
}

/// Auction record returned by `viewAuction`.
#[derive(Debug, Clone, Serialize, SchemaType, PartialEq, Eq)]
pub struct AuctionView {
    pub id: AuctionId,
    pub seller: AccountAddress,
    pub starting_price: Amount,
    pub discount_rate: Amount,
    pub start_at: Timestamp,
    pub ends_at: Timestamp,
    pub item: String,
    pub stopped: bool,
    /// Zero until the auction is sold.
    pub final_price: Amount,
}

/// Return value of the `buy` function.
#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct BuyResult {
    /// Price the auction was sold for.
    pub final_price: Amount,
    pub buyer: AccountAddress,
}

/// Contract summary returned by `view`.
#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct RegistryView {
    pub owner: AccountAddress,
    pub auction_count: u64,
    pub collected_fees: Amount,
    pub fee_basis_points: u64,
}
