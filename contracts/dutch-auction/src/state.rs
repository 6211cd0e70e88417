use commons::{split_fee, AuctionId, CustomContractError, FeeSplit};
use concordium_std::*;

use crate::external::{AuctionView, CreateAuctionParams};

const MILLIS_PER_SECOND: u64 = 1_000;

#[derive(Debug, Clone, Serialize, SchemaType, PartialEq, Eq)]
pub struct Auction {
    /// Seller account address.
    pub seller: AccountAddress,
    /// Price at `start_at`.
    pub starting_price: Amount,
    /// Price decrease per second.
    pub discount_rate: Amount,
    /// Creation time.
    pub start_at: Timestamp,
    /// Last moment the auction can be bought.
    pub ends_at: Timestamp,
    /// Item description.
    pub item: String,
    /// Set once the auction is sold. Never reset afterwards.
    pub stopped: bool,
    /// Price paid by the buyer, zero until sold.
    pub final_price: Amount,
}

impl Auction {
    /// Validate creation parameters and start the price clock at `slot_time`.
    pub fn new(
        seller: AccountAddress,
        params: CreateAuctionParams,
        slot_time: Timestamp,
    ) -> Result<Self, CustomContractError> {
        ensure!(
            params.starting_price > Amount::zero(),
            CustomContractError::InvalidAuctionParameters
        );
        ensure!(
            params.duration > 0,
            CustomContractError::InvalidAuctionParameters
        );
        ensure!(
            !params.item.is_empty(),
            CustomContractError::InvalidAuctionParameters
        );

        // The price must not run out before the auction does
        let total_discount = params
            .discount_rate
            .micro_ccd
            .checked_mul(params.duration)
            .ok_or(CustomContractError::InvalidAuctionParameters)?;
        ensure!(
            params.starting_price.micro_ccd >= total_discount,
            CustomContractError::InvalidAuctionParameters
        );

        let ends_at = params
            .duration
            .checked_mul(MILLIS_PER_SECOND)
            .and_then(|millis| slot_time.checked_add(Duration::from_millis(millis)))
            .ok_or(CustomContractError::InvalidAuctionParameters)?;

        Ok(Self {
            seller,
            starting_price: params.starting_price,
            discount_rate: params.discount_rate,
            start_at: slot_time,
            ends_at,
            item: params.item,
            stopped: false,
            final_price: Amount::zero(),
        })
    }

    /// Price at given slot_time. Time past `ends_at` does not count, so the
    /// price holds its expiry value forever.
    pub fn price_at(&self, slot_time: Timestamp) -> Amount {
        let until = if slot_time < self.ends_at {
            slot_time
        } else {
            self.ends_at
        };
        let elapsed_seconds = until
            .duration_since(self.start_at)
            .map(|elapsed| elapsed.millis() / MILLIS_PER_SECOND)
            .unwrap_or(0);
        let discount = self.discount_rate.micro_ccd.saturating_mul(elapsed_seconds);

        Amount::from_micro_ccd(self.starting_price.micro_ccd.saturating_sub(discount))
    }

    pub fn is_expired(&self, slot_time: Timestamp) -> bool {
        slot_time > self.ends_at
    }

    fn to_view(&self, id: AuctionId) -> AuctionView {
        AuctionView {
            id,
            seller: self.seller,
            starting_price: self.starting_price,
            discount_rate: self.discount_rate,
            start_at: self.start_at,
            ends_at: self.ends_at,
            item: self.item.clone(),
            stopped: self.stopped,
            final_price: self.final_price,
        }
    }
}

/// Outcome of a successful buy. Funds MUST be paid out as listed, or the
/// settlement reverted.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Settlement {
    pub id: AuctionId,
    pub seller: AccountAddress,
    pub buyer: AccountAddress,
    pub final_price: Amount,
    pub split: FeeSplit,
    /// Overpayment to return to the buyer.
    pub refund: Amount,
}

/// The contract state.
#[derive(Serial, DeserialWithState)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Contract owner, receiver of the platform fees.
    pub owner: AccountAddress,
    /// Id of the next auction, equal to the number of auctions created.
    pub next_id: AuctionId,
    /// Platform fees that have not been withdrawn yet.
    pub collected_fees: Amount,
    /// All auctions ever created.
    pub auctions: StateMap<AuctionId, Auction, S>,
}

impl<S: HasStateApi> State<S> {
    /// Create a new state with no auctions.
    pub fn new(state_builder: &mut StateBuilder<S>, owner: AccountAddress) -> Self {
        State {
            owner,
            next_id: 0,
            collected_fees: Amount::zero(),
            auctions: state_builder.new_map(),
        }
    }

    /// Append a new auction, returning its id and end time.
    pub fn create_auction(
        &mut self,
        seller: AccountAddress,
        params: CreateAuctionParams,
        slot_time: Timestamp,
    ) -> Result<(AuctionId, Timestamp), CustomContractError> {
        let auction = Auction::new(seller, params, slot_time)?;
        let ends_at = auction.ends_at;

        let id = self.next_id;
        self.auctions.insert(id, auction);
        self.next_id += 1;

        Ok((id, ends_at))
    }

    pub fn view_auction(&self, id: AuctionId) -> Result<AuctionView, CustomContractError> {
        self.auctions
            .get(&id)
            .map(|auction| auction.to_view(id))
            .ok_or(CustomContractError::AuctionNotFound)
    }

    pub fn current_price(
        &self,
        id: AuctionId,
        slot_time: Timestamp,
    ) -> Result<Amount, CustomContractError> {
        self.auctions
            .get(&id)
            .map(|auction| auction.price_at(slot_time))
            .ok_or(CustomContractError::AuctionNotFound)
    }

    /// Mark the auction as sold to `buyer` at the current price.
    ///
    /// The auction is stopped before any funds move, so every later attempt
    /// observes it as sold. Nothing changes if any check fails.
    pub fn settle(
        &mut self,
        id: AuctionId,
        slot_time: Timestamp,
        buyer: AccountAddress,
        payment: Amount,
    ) -> Result<Settlement, CustomContractError> {
        let mut entry = self
            .auctions
            .get_mut(&id)
            .ok_or(CustomContractError::AuctionNotFound)?;
        let auction = entry.get_mut();

        ensure!(!auction.stopped, CustomContractError::AuctionStopped);
        ensure!(
            !auction.is_expired(slot_time),
            CustomContractError::AuctionExpired
        );

        let price = auction.price_at(slot_time);
        ensure!(payment >= price, CustomContractError::InsufficientPayment);

        auction.stopped = true;
        auction.final_price = price;

        Ok(Settlement {
            id,
            seller: auction.seller,
            buyer,
            final_price: price,
            split: split_fee(price),
            refund: Amount::from_micro_ccd(payment.micro_ccd - price.micro_ccd),
        })
    }

    /// Undo `settle` after a failed payout. A settled auction was unsold with
    /// no final price before, so that is what gets restored.
    pub fn revert_settlement(&mut self, id: AuctionId) {
        if let Some(mut entry) = self.auctions.get_mut(&id) {
            let auction = entry.get_mut();
            auction.stopped = false;
            auction.final_price = Amount::zero();
        }
    }

    pub fn collect_fee(&mut self, fee: Amount) {
        self.collected_fees += fee;
    }

    /// Hand all collected fees over to the owner.
    pub fn take_fees(&mut self, sender: &Address) -> Result<Amount, CustomContractError> {
        ensure!(
            sender.matches_account(&self.owner),
            CustomContractError::Unauthorized
        );

        let fees = self.collected_fees;
        self.collected_fees = Amount::zero();

        Ok(fees)
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use test_infrastructure::*;

    const OWNER: AccountAddress = AccountAddress([0; 32]);
    const SELLER: AccountAddress = AccountAddress([1; 32]);
    const BUYER: AccountAddress = AccountAddress([2; 32]);

    const START: u64 = 1_000_000;

    fn at_second(second: u64) -> Timestamp {
        Timestamp::from_timestamp_millis(START + second * 1_000)
    }

    fn params(starting_price: u64, discount_rate: u64, duration: u64) -> CreateAuctionParams {
        CreateAuctionParams {
            starting_price: Amount::from_micro_ccd(starting_price),
            discount_rate: Amount::from_micro_ccd(discount_rate),
            item: String::from("fake item"),
            duration,
        }
    }

    fn state_with_auction() -> State<TestStateApi> {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, OWNER);
        state
            .create_auction(SELLER, params(1_000, 10, 60), at_second(0))
            .expect_report("Auction should be created");
        state
    }

    #[concordium_test]
    fn test_new_auction() {
        let auction = Auction::new(SELLER, params(1_000, 10, 60), at_second(0))
            .expect_report("Valid parameters should be accepted");

        claim_eq!(auction.seller, SELLER);
        claim_eq!(auction.start_at, at_second(0));
        claim_eq!(auction.ends_at, at_second(60));
        claim_eq!(auction.item, String::from("fake item"));
        claim!(!auction.stopped);
        claim_eq!(auction.final_price, Amount::zero());
    }

    #[concordium_test]
    fn test_new_auction_invalid_parameters() {
        let cases = [
            // zero starting price
            params(0, 0, 60),
            // zero duration
            params(1_000, 10, 0),
            // price would run out before the end
            params(599, 10, 60),
            // discount overflows
            params(1_000, u64::MAX, 2),
            // end time overflows
            params(1_000, 0, u64::MAX / 1_000),
        ];

        for case in cases.iter() {
            claim_eq!(
                Auction::new(SELLER, case.clone(), at_second(0)),
                Err(CustomContractError::InvalidAuctionParameters)
            );
        }

        let mut empty_item = params(1_000, 10, 60);
        empty_item.item = String::new();
        claim_eq!(
            Auction::new(SELLER, empty_item, at_second(0)),
            Err(CustomContractError::InvalidAuctionParameters)
        );
    }

    #[concordium_test]
    fn test_price_can_reach_zero_at_end() {
        let auction = Auction::new(SELLER, params(600, 10, 60), at_second(0))
            .expect_report("Price reaching zero exactly at the end is allowed");

        claim_eq!(auction.price_at(at_second(60)), Amount::zero());
    }

    #[concordium_test]
    fn test_price_decreases_and_holds_after_end() {
        let auction = Auction::new(SELLER, params(1_000, 10, 60), at_second(0))
            .expect_report("Auction should be created");

        claim_eq!(auction.price_at(at_second(0)), Amount::from_micro_ccd(1_000));
        claim_eq!(auction.price_at(at_second(1)), Amount::from_micro_ccd(990));
        claim_eq!(auction.price_at(at_second(60)), Amount::from_micro_ccd(400));
        claim_eq!(auction.price_at(at_second(61)), Amount::from_micro_ccd(400));
        claim_eq!(auction.price_at(at_second(10_000)), Amount::from_micro_ccd(400));

        // Partial seconds do not count
        let half_second = Timestamp::from_timestamp_millis(START + 1_500);
        claim_eq!(auction.price_at(half_second), Amount::from_micro_ccd(990));

        let mut previous = auction.price_at(at_second(0));
        for second in 1..=120 {
            let price = auction.price_at(at_second(second));
            claim!(price <= previous, "Price must never increase");
            previous = price;
        }
    }

    #[concordium_test]
    fn test_ids_are_sequential() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, OWNER);

        for expected in 0..3 {
            let (id, _) = state
                .create_auction(SELLER, params(1_000, 10, 60), at_second(expected))
                .expect_report("Auction should be created");
            claim_eq!(id, expected);
        }
        claim_eq!(state.next_id, 3);

        // Rejected auctions do not consume ids
        let result = state.create_auction(SELLER, params(0, 0, 60), at_second(5));
        claim_eq!(result, Err(CustomContractError::InvalidAuctionParameters));
        claim_eq!(state.next_id, 3);
    }

    #[concordium_test]
    fn test_settle_checks_in_order() {
        let mut state = state_with_auction();

        // Unknown id wins over everything else
        claim_eq!(
            state.settle(1, at_second(100), BUYER, Amount::zero()),
            Err(CustomContractError::AuctionNotFound)
        );
        // Expiry wins over payment
        claim_eq!(
            state.settle(0, at_second(61), BUYER, Amount::zero()),
            Err(CustomContractError::AuctionExpired)
        );
        claim_eq!(
            state.settle(0, at_second(1), BUYER, Amount::from_micro_ccd(989)),
            Err(CustomContractError::InsufficientPayment)
        );

        let view = state.view_auction(0).expect_report("Auction should exist");
        claim!(!view.stopped);
        claim_eq!(view.final_price, Amount::zero());

        let _ = state
            .settle(0, at_second(1), BUYER, Amount::from_micro_ccd(990))
            .expect_report("Exact payment should be accepted");

        // Stopped wins over expiry
        claim_eq!(
            state.settle(0, at_second(61), BUYER, Amount::zero()),
            Err(CustomContractError::AuctionStopped)
        );
    }

    #[concordium_test]
    fn test_settle_at_end_time() {
        let mut state = state_with_auction();

        let settlement = state
            .settle(0, at_second(60), BUYER, Amount::from_micro_ccd(500))
            .expect_report("Auction can be bought at its end time");

        claim_eq!(
            settlement,
            Settlement {
                id: 0,
                seller: SELLER,
                buyer: BUYER,
                final_price: Amount::from_micro_ccd(400),
                split: split_fee(Amount::from_micro_ccd(400)),
                refund: Amount::from_micro_ccd(100),
            }
        );
        claim_eq!(settlement.split.platform_fee, Amount::from_micro_ccd(40));
        claim_eq!(settlement.split.seller_proceeds, Amount::from_micro_ccd(360));
    }

    #[concordium_test]
    fn test_revert_settlement() {
        let mut state = state_with_auction();

        let _ = state
            .settle(0, at_second(1), BUYER, Amount::from_micro_ccd(990))
            .expect_report("Settlement should succeed");
        state.revert_settlement(0);

        let view = state.view_auction(0).expect_report("Auction should exist");
        claim!(!view.stopped);
        claim_eq!(view.final_price, Amount::zero());
    }

    #[concordium_test]
    fn test_take_fees() {
        let mut state = state_with_auction();
        state.collect_fee(Amount::from_micro_ccd(40));
        state.collect_fee(Amount::from_micro_ccd(2));

        claim_eq!(
            state.take_fees(&Address::Account(SELLER)),
            Err(CustomContractError::Unauthorized)
        );
        claim_eq!(
            state.take_fees(&Address::Account(OWNER)),
            Ok(Amount::from_micro_ccd(42))
        );
        claim_eq!(state.collected_fees, Amount::zero());
    }
}
