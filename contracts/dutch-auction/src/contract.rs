use commons::{AuctionId, ContractResult, CustomContractError, PLATFORM_FEE_BASIS_POINTS};
use concordium_std::*;

use crate::events::AuctionEvents;
use crate::external::*;
use crate::state::{Settlement, State};

/// Initialize the auction contract with no auctions. The instantiating
/// account becomes the owner and receives the platform fees.
#[init(contract = "DutchAuction")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    Ok(State::new(state_builder, ctx.init_origin()))
}

/// Put an item up for auction. The sender becomes the seller.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - Sender is a contract.
/// - Starting price or duration is zero, item is empty, or the price would
///   drop below zero before the auction ends.
/// - It fails to log `AuctionCreated` event.
#[receive(
    mutable,
    contract = "DutchAuction",
    name = "createAuction",
    parameter = "CreateAuctionParams",
    return_value = "AuctionId",
    enable_logger
)]
fn contract_create_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<AuctionId> {
    let params: CreateAuctionParams = ctx.parameter_cursor().get()?;

    let seller = if let Address::Account(seller) = ctx.sender() {
        seller
    } else {
        bail!(CustomContractError::OnlyAccountAddress);
    };

    let starting_price = params.starting_price;
    let (id, ends_at) = host
        .state_mut()
        .create_auction(seller, params, ctx.metadata().slot_time())?;

    // Event for auction creation.
    logger.log(&AuctionEvents::created(id, &seller, starting_price, ends_at))?;

    Ok(id)
}

/// Price the auction can be bought for at the current slot time.
#[receive(
    contract = "DutchAuction",
    name = "getCurrentPrice",
    parameter = "AuctionId",
    return_value = "Amount"
)]
fn contract_get_current_price<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<Amount> {
    let id: AuctionId = ctx.parameter_cursor().get()?;
    host.state().current_price(id, ctx.metadata().slot_time())
}

/// Buy the auction for the attached amount. The seller is paid the current
/// price minus the platform fee and any overpayment is returned to the buyer.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - Sender is a contract.
/// - The auction does not exist, is already sold or has expired.
/// - The attached amount is below the current price.
/// - Seller or buyer refuses the transfer. The auction stays unsold.
/// - It fails to log `AuctionEnded` event. Only the ledger rollback undoes
///   the payout in that case.
#[receive(
    mutable,
    payable,
    contract = "DutchAuction",
    name = "buy",
    parameter = "AuctionId",
    return_value = "BuyResult",
    enable_logger
)]
fn contract_buy<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<BuyResult> {
    let id: AuctionId = ctx.parameter_cursor().get()?;

    let buyer = if let Address::Account(buyer) = ctx.sender() {
        buyer
    } else {
        bail!(CustomContractError::OnlyAccountAddress);
    };

    // Auction is stopped from here on, before any funds leave the contract
    let settlement = host
        .state_mut()
        .settle(id, ctx.metadata().slot_time(), buyer, amount)?;

    if let Err(error) = pay_out(host, &settlement) {
        host.state_mut().revert_settlement(id);
        return Err(error);
    }

    host.state_mut().collect_fee(settlement.split.platform_fee);

    // Event for auction sale.
    logger.log(&AuctionEvents::ended(id, settlement.final_price, &buyer))?;

    Ok(BuyResult {
        final_price: settlement.final_price,
        buyer,
    })
}

/// View a single auction, sold or not.
#[receive(
    contract = "DutchAuction",
    name = "viewAuction",
    parameter = "AuctionId",
    return_value = "AuctionView"
)]
fn contract_view_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<AuctionView> {
    let id: AuctionId = ctx.parameter_cursor().get()?;
    host.state().view_auction(id)
}

/// View function that returns the owner, auction count and fee balance.
#[receive(contract = "DutchAuction", name = "view", return_value = "RegistryView")]
fn contract_view<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<RegistryView> {
    let state = host.state();

    Ok(RegistryView {
        owner: state.owner,
        auction_count: state.next_id,
        collected_fees: state.collected_fees,
        fee_basis_points: PLATFORM_FEE_BASIS_POINTS,
    })
}

/// Transfer collected platform fees to the owner.
///
/// It rejects if:
/// - Sender is not the owner.
/// - The owner refuses the transfer. The fees stay collected.
/// - It fails to log `FeesWithdrawn` event. Only the ledger rollback undoes
///   the transfer in that case.
#[receive(
    mutable,
    contract = "DutchAuction",
    name = "withdrawFees",
    enable_logger
)]
fn contract_withdraw_fees<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let fees = host.state_mut().take_fees(&ctx.sender())?;
    if fees == Amount::zero() {
        return Ok(());
    }

    let owner = host.state().owner;
    if let Err(error) = host.invoke_transfer(&owner, fees) {
        host.state_mut().collect_fee(fees);
        return Err(error.into());
    }

    // Event for fee withdrawal.
    logger.log(&AuctionEvents::fees_withdrawn(&owner, fees))?;

    Ok(())
}

// Pay the seller and refund the buyer. Zero transfers are skipped.
fn pay_out<S: HasStateApi>(
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    settlement: &Settlement,
) -> ContractResult<()> {
    if settlement.split.seller_proceeds > Amount::zero() {
        host.invoke_transfer(&settlement.seller, settlement.split.seller_proceeds)?;
    }
    if settlement.refund > Amount::zero() {
        host.invoke_transfer(&settlement.buyer, settlement.refund)?;
    }
    Ok(())
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use test_infrastructure::*;

    const OWNER: AccountAddress = AccountAddress([0; 32]);
    const SELLER: AccountAddress = AccountAddress([1; 32]);
    const BUYER: AccountAddress = AccountAddress([2; 32]);
    const OTHER_BUYER: AccountAddress = AccountAddress([3; 32]);
    const SOME_CONTRACT: ContractAddress = ContractAddress {
        index: 16,
        subindex: 0,
    };

    const START: u64 = 1_650_000_000_000;
    const DURATION: u64 = 60;

    fn at_second(second: u64) -> Timestamp {
        Timestamp::from_timestamp_millis(START + second * 1_000)
    }

    fn fake_item(starting_price: Amount, discount_rate: Amount) -> CreateAuctionParams {
        CreateAuctionParams {
            starting_price,
            discount_rate,
            item: String::from("fake item"),
            duration: DURATION,
        }
    }

    fn default_host() -> TestHost<State<TestStateApi>> {
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER);
        let mut state_builder = TestStateBuilder::new();

        let state = contract_init(&ctx, &mut state_builder)
            .expect_report("Failed during init_DutchAuction");

        TestHost::new(state, state_builder)
    }

    fn create(
        host: &mut TestHost<State<TestStateApi>>,
        logger: &mut TestLogger,
        params: &CreateAuctionParams,
    ) -> ContractResult<AuctionId> {
        let bytes = to_bytes(params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes)
            .set_metadata_slot_time(at_second(0));
        contract_create_auction(&ctx, host, logger)
    }

    fn buy(
        host: &mut TestHost<State<TestStateApi>>,
        logger: &mut TestLogger,
        buyer: AccountAddress,
        id: AuctionId,
        second: u64,
        amount: Amount,
    ) -> ContractResult<BuyResult> {
        let bytes = to_bytes(&id);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(buyer))
            .set_invoker(buyer)
            .set_parameter(&bytes)
            .set_metadata_slot_time(at_second(second));
        let balance = host.state().collected_fees + amount;
        host.set_self_balance(balance);
        contract_buy(&ctx, host, amount, logger)
    }

    fn current_price(
        host: &TestHost<State<TestStateApi>>,
        id: AuctionId,
        second: u64,
    ) -> ContractResult<Amount> {
        let bytes = to_bytes(&id);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&bytes)
            .set_metadata_slot_time(at_second(second));
        contract_get_current_price(&ctx, host)
    }

    fn view_auction(host: &TestHost<State<TestStateApi>>, id: AuctionId) -> AuctionView {
        let bytes = to_bytes(&id);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&bytes);
        contract_view_auction(&ctx, host).expect_report("Auction should exist")
    }

    #[concordium_test]
    fn test_init() {
        let host = default_host();
        let ctx = TestReceiveContext::empty();

        let view = contract_view(&ctx, &host).expect_report("View should succeed");

        claim_eq!(
            view,
            RegistryView {
                owner: OWNER,
                auction_count: 0,
                collected_fees: Amount::zero(),
                fee_basis_points: 1_000,
            }
        );
    }

    #[concordium_test]
    fn test_create_auction() {
        let mut host = default_host();
        let mut logger = TestLogger::init();

        let params = fake_item(Amount::from_ccd(100), Amount::from_micro_ccd(3));
        let id = create(&mut host, &mut logger, &params);
        claim_eq!(id, Ok(0));

        let auction = view_auction(&host, 0);
        claim_eq!(
            auction,
            AuctionView {
                id: 0,
                seller: SELLER,
                starting_price: Amount::from_ccd(100),
                discount_rate: Amount::from_micro_ccd(3),
                start_at: at_second(0),
                ends_at: at_second(DURATION),
                item: String::from("fake item"),
                stopped: false,
                final_price: Amount::zero(),
            }
        );

        claim_eq!(logger.logs.len(), 1, "Only one event should be logged");
        claim_eq!(
            logger.logs[0],
            to_bytes(&AuctionEvents::created(
                0,
                &SELLER,
                Amount::from_ccd(100),
                at_second(DURATION)
            ))
        );

        // Second auction gets the next id and leaves the first untouched
        claim_eq!(create(&mut host, &mut logger, &params), Ok(1));
        claim_eq!(view_auction(&host, 0), auction);
    }

    #[concordium_test]
    fn test_create_auction_invalid() {
        let mut host = default_host();
        let mut logger = TestLogger::init();

        // 3 CCD per second for 60 seconds is more than the starting price
        let params = fake_item(Amount::from_ccd(100), Amount::from_ccd(3));
        claim_eq!(
            create(&mut host, &mut logger, &params),
            Err(CustomContractError::InvalidAuctionParameters)
        );
        claim_eq!(host.state().next_id, 0);
        claim!(logger.logs.is_empty(), "No event should be logged");
    }

    #[concordium_test]
    fn test_create_auction_from_contract() {
        let mut host = default_host();
        let mut logger = TestLogger::init();

        let bytes = to_bytes(&fake_item(Amount::from_ccd(1), Amount::zero()));
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Contract(SOME_CONTRACT))
            .set_parameter(&bytes)
            .set_metadata_slot_time(at_second(0));

        claim_eq!(
            contract_create_auction(&ctx, &mut host, &mut logger),
            Err(CustomContractError::OnlyAccountAddress)
        );
    }

    #[concordium_test]
    fn test_current_price() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let params = fake_item(Amount::from_micro_ccd(1_000), Amount::from_micro_ccd(10));
        let _ = create(&mut host, &mut logger, &params);

        claim_eq!(current_price(&host, 0, 0), Ok(Amount::from_micro_ccd(1_000)));
        claim_eq!(current_price(&host, 0, 30), Ok(Amount::from_micro_ccd(700)));
        claim_eq!(current_price(&host, 0, 60), Ok(Amount::from_micro_ccd(400)));
        claim_eq!(current_price(&host, 0, 3_600), Ok(Amount::from_micro_ccd(400)));
        claim_eq!(
            current_price(&host, 1, 0),
            Err(CustomContractError::AuctionNotFound)
        );
    }

    /// Test a full sale:
    /// 0. Seller creates an auction for 100 CCD dropping 3 micro CCD a second.
    /// 1. One second later the buyer pays 100 CCD.
    /// 2. Seller receives the price minus 10%, buyer gets the overpayment back.
    /// 3. Another attempt to buy the same auction fails.
    #[concordium_test]
    fn test_buy() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let params = fake_item(Amount::from_ccd(100), Amount::from_micro_ccd(3));
        let _ = create(&mut host, &mut logger, &params);

        let result = buy(&mut host, &mut logger, BUYER, 0, 1, Amount::from_ccd(100));
        let final_price = Amount::from_micro_ccd(99_999_997);
        claim_eq!(
            result,
            Ok(BuyResult {
                final_price,
                buyer: BUYER,
            })
        );

        let auction = view_auction(&host, 0);
        claim!(auction.stopped);
        claim_eq!(auction.final_price, final_price);

        // 10% of the final price, rounded down
        let fee = Amount::from_micro_ccd(9_999_999);
        claim!(host.transfer_occurred(&SELLER, Amount::from_micro_ccd(89_999_998)));
        claim!(host.transfer_occurred(&BUYER, Amount::from_micro_ccd(3)));
        claim_eq!(host.state().collected_fees, fee);

        claim_eq!(logger.logs.len(), 2);
        claim_eq!(
            logger.logs[1],
            to_bytes(&AuctionEvents::ended(0, final_price, &BUYER))
        );

        let result = buy(&mut host, &mut logger, OTHER_BUYER, 0, 2, Amount::from_ccd(100));
        claim_eq!(result, Err(CustomContractError::AuctionStopped));
        claim_eq!(view_auction(&host, 0).final_price, final_price);
        claim_eq!(logger.logs.len(), 2);
    }

    #[concordium_test]
    fn test_buy_exact_price_has_no_refund() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let params = fake_item(Amount::from_micro_ccd(1_000), Amount::from_micro_ccd(10));
        let _ = create(&mut host, &mut logger, &params);

        let result = buy(&mut host, &mut logger, BUYER, 0, 10, Amount::from_micro_ccd(900));
        claim_eq!(
            result,
            Ok(BuyResult {
                final_price: Amount::from_micro_ccd(900),
                buyer: BUYER,
            })
        );

        claim!(host.transfer_occurred(&SELLER, Amount::from_micro_ccd(810)));
        claim!(!host.transfer_occurred(&BUYER, Amount::zero()));
        claim_eq!(host.state().collected_fees, Amount::from_micro_ccd(90));
    }

    #[concordium_test]
    fn test_buy_insufficient_payment() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let params = fake_item(Amount::from_micro_ccd(1_000), Amount::from_micro_ccd(10));
        let _ = create(&mut host, &mut logger, &params);

        let result = buy(&mut host, &mut logger, BUYER, 0, 10, Amount::from_micro_ccd(899));
        claim_eq!(result, Err(CustomContractError::InsufficientPayment));

        let auction = view_auction(&host, 0);
        claim!(!auction.stopped);
        claim_eq!(auction.final_price, Amount::zero());
        claim_eq!(host.state().collected_fees, Amount::zero());
        claim_eq!(logger.logs.len(), 1);

        // Retrying with enough funds succeeds
        let result = buy(&mut host, &mut logger, BUYER, 0, 10, Amount::from_micro_ccd(900));
        claim!(result.is_ok());
    }

    #[concordium_test]
    fn test_buy_expired() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let params = fake_item(Amount::from_micro_ccd(1_000), Amount::from_micro_ccd(10));
        let _ = create(&mut host, &mut logger, &params);

        // Buying at the very end is still allowed, one second later it is not
        let result = buy(
            &mut host,
            &mut logger,
            BUYER,
            0,
            DURATION + 1,
            Amount::from_ccd(1),
        );
        claim_eq!(result, Err(CustomContractError::AuctionExpired));
        claim!(!view_auction(&host, 0).stopped);

        // The price stays clamped at its expiry value
        claim_eq!(
            current_price(&host, 0, DURATION + 1),
            Ok(Amount::from_micro_ccd(400))
        );
    }

    #[concordium_test]
    fn test_buy_unknown_auction() {
        let mut host = default_host();
        let mut logger = TestLogger::init();

        let result = buy(&mut host, &mut logger, BUYER, 0, 0, Amount::from_ccd(1));
        claim_eq!(result, Err(CustomContractError::AuctionNotFound));
    }

    #[concordium_test]
    fn test_buy_from_contract() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let params = fake_item(Amount::from_micro_ccd(1_000), Amount::from_micro_ccd(10));
        let _ = create(&mut host, &mut logger, &params);

        let bytes = to_bytes(&0u64);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Contract(SOME_CONTRACT))
            .set_parameter(&bytes)
            .set_metadata_slot_time(at_second(1));
        host.set_self_balance(Amount::from_ccd(1));

        claim_eq!(
            contract_buy(&ctx, &mut host, Amount::from_ccd(1), &mut logger),
            Err(CustomContractError::OnlyAccountAddress)
        );
        claim!(!view_auction(&host, 0).stopped);
    }

    #[concordium_test]
    fn test_buy_rejected_by_seller() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let params = fake_item(Amount::from_micro_ccd(1_000), Amount::from_micro_ccd(10));
        let _ = create(&mut host, &mut logger, &params);

        host.make_account_missing(SELLER);
        let result = buy(&mut host, &mut logger, BUYER, 0, 10, Amount::from_micro_ccd(950));
        claim_eq!(result, Err(CustomContractError::TransferRejected));

        let auction = view_auction(&host, 0);
        claim!(!auction.stopped);
        claim_eq!(auction.final_price, Amount::zero());
        claim_eq!(host.state().collected_fees, Amount::zero());
        claim!(!host.transfer_occurred(&BUYER, Amount::from_micro_ccd(50)));
        claim_eq!(logger.logs.len(), 1, "No sale should be logged");
    }

    #[concordium_test]
    fn test_buy_rejected_by_buyer() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let params = fake_item(Amount::from_micro_ccd(1_000), Amount::from_micro_ccd(10));
        let _ = create(&mut host, &mut logger, &params);

        host.make_account_missing(BUYER);
        let result = buy(&mut host, &mut logger, BUYER, 0, 10, Amount::from_micro_ccd(950));
        claim_eq!(result, Err(CustomContractError::TransferRejected));

        let auction = view_auction(&host, 0);
        claim!(!auction.stopped);
        claim_eq!(auction.final_price, Amount::zero());
        claim_eq!(host.state().collected_fees, Amount::zero());

        // Another buyer can still take the auction
        let result = buy(
            &mut host,
            &mut logger,
            OTHER_BUYER,
            0,
            10,
            Amount::from_micro_ccd(900),
        );
        claim_eq!(result.map(|bought| bought.buyer), Ok(OTHER_BUYER));
        claim_eq!(view_auction(&host, 0).final_price, Amount::from_micro_ccd(900));
    }

    #[concordium_test]
    fn test_withdraw_fees() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let params = fake_item(Amount::from_micro_ccd(1_000), Amount::from_micro_ccd(10));
        let _ = create(&mut host, &mut logger, &params);
        let _ = buy(&mut host, &mut logger, BUYER, 0, 0, Amount::from_micro_ccd(1_000));
        claim_eq!(host.state().collected_fees, Amount::from_micro_ccd(100));

        // Only the owner may withdraw
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(SELLER));
        claim_eq!(
            contract_withdraw_fees(&ctx, &mut host, &mut logger),
            Err(CustomContractError::Unauthorized)
        );

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OWNER));
        claim_eq!(contract_withdraw_fees(&ctx, &mut host, &mut logger), Ok(()));
        claim!(host.transfer_occurred(&OWNER, Amount::from_micro_ccd(100)));
        claim_eq!(host.state().collected_fees, Amount::zero());
        claim_eq!(
            logger.logs[logger.logs.len() - 1],
            to_bytes(&AuctionEvents::fees_withdrawn(
                &OWNER,
                Amount::from_micro_ccd(100)
            ))
        );

        // Nothing left to withdraw
        let events = logger.logs.len();
        claim_eq!(contract_withdraw_fees(&ctx, &mut host, &mut logger), Ok(()));
        claim_eq!(logger.logs.len(), events);
    }

    #[concordium_test]
    fn test_withdraw_fees_rejected_by_owner() {
        let mut host = default_host();
        let mut logger = TestLogger::init();
        let params = fake_item(Amount::from_micro_ccd(1_000), Amount::from_micro_ccd(10));
        let _ = create(&mut host, &mut logger, &params);
        let _ = buy(&mut host, &mut logger, BUYER, 0, 0, Amount::from_micro_ccd(1_000));
        let events = logger.logs.len();

        host.make_account_missing(OWNER);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OWNER));
        claim_eq!(
            contract_withdraw_fees(&ctx, &mut host, &mut logger),
            Err(CustomContractError::TransferRejected)
        );

        // Fees are kept for a later withdrawal
        claim_eq!(host.state().collected_fees, Amount::from_micro_ccd(100));
        claim_eq!(logger.logs.len(), events, "No withdrawal should be logged");
    }
}
