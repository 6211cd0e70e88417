use commons::{AuctionId, AUCTION_CREATED_TAG, AUCTION_ENDED_TAG, FEES_WITHDRAWN_TAG};
use concordium_std::*;

/// Auction creation event data.
#[derive(Debug, Serial)]
pub struct AuctionCreatedEvent<'a> {
    /// Auction identifier.
    pub id: AuctionId,
    /// Seller account address.
    pub seller: &'a AccountAddress,
    /// Price at creation.
    pub starting_price: Amount,
    /// Last moment the auction can be bought.
    pub ends_at: Timestamp,
}

/// Auction sale event data.
#[derive(Debug, Serial)]
pub struct AuctionEndedEvent<'a> {
    /// Auction identifier.
    pub id: AuctionId,
    /// Price paid.
    pub final_price: Amount,
    /// Buyer account address.
    pub buyer: &'a AccountAddress,
}

/// Fee withdrawal event data.
#[derive(Debug, Serial)]
pub struct FeesWithdrawnEvent<'a> {
    /// Owner account receiving the fees.
    pub owner: &'a AccountAddress,
    /// Fees transferred.
    pub amount: Amount,
}

/// Tagged Custom event to be serialized for the event log.
#[derive(Debug)]
pub enum AuctionEvents<'a> {
    Created(AuctionCreatedEvent<'a>),
    Ended(AuctionEndedEvent<'a>),
    FeesWithdrawn(FeesWithdrawnEvent<'a>),
}

impl<'a> AuctionEvents<'a> {
    pub fn created(
        id: AuctionId,
        seller: &'a AccountAddress,
        starting_price: Amount,
        ends_at: Timestamp,
    ) -> Self {
        Self::Created(AuctionCreatedEvent {
            id,
            seller,
            starting_price,
            ends_at,
        })
    }

    pub fn ended(id: AuctionId, final_price: Amount, buyer: &'a AccountAddress) -> Self {
        Self::Ended(AuctionEndedEvent {
            id,
            final_price,
            buyer,
        })
    }

    pub fn fees_withdrawn(owner: &'a AccountAddress, amount: Amount) -> Self {
        Self::FeesWithdrawn(FeesWithdrawnEvent { owner, amount })
    }
}

impl<'a> Serial for AuctionEvents<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            AuctionEvents::Created(event) => {
                out.write_u8(AUCTION_CREATED_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Ended(event) => {
                out.write_u8(AUCTION_ENDED_TAG)?;
                event.serial(out)
            }
            AuctionEvents::FeesWithdrawn(event) => {
                out.write_u8(FEES_WITHDRAWN_TAG)?;
                event.serial(out)
            }
        }
    }
}
