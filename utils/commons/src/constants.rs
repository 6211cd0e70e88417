/// Tag for the AuctionCreated event.
pub const AUCTION_CREATED_TAG: u8 = u8::MAX;

/// Tag for the AuctionEnded event.
pub const AUCTION_ENDED_TAG: u8 = u8::MAX - 1;

/// Tag for the FeesWithdrawn event.
pub const FEES_WITHDRAWN_TAG: u8 = u8::MAX - 2;

/// Tag for the PaymentLogged event.
pub const PAYMENT_LOGGED_TAG: u8 = u8::MAX - 3;

/// Share of every final price retained by the platform, in basis points (10%).
pub const PLATFORM_FEE_BASIS_POINTS: u64 = 1_000;

/// Basis points making up a whole.
pub const BASIS_POINTS_DENOMINATOR: u64 = 10_000;
