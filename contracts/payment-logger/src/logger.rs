use commons::ContractResult;
use concordium_std::*;

use crate::events::{LoggerEvents, PaymentLoggedEvent};
use crate::external::*;
use crate::state::LoggerState;

/// Initialize the logger with no payments.
#[init(contract = "PaymentLogger")]
fn logger_init<S: HasStateApi>(
    _ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<LoggerState<S>> {
    Ok(LoggerState::new(state_builder))
}

/// Record a payment under the payer, stamped with the current slot time.
/// Any caller may log.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - It fails to log `PaymentLogged` event.
#[receive(
    mutable,
    contract = "PaymentLogger",
    name = "log",
    parameter = "LogPaymentParams",
    enable_logger
)]
fn logger_log<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<LoggerState<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: LogPaymentParams = ctx.parameter_cursor().get()?;
    let timestamp = ctx.metadata().slot_time();

    host.state_mut().append(
        params.payer,
        PaymentEntry {
            amount: params.amount,
            timestamp,
        },
    );

    logger.log(&LoggerEvents::PaymentLogged(PaymentLoggedEvent {
        payer: &params.payer,
        amount: params.amount,
        timestamp,
    }))?;

    Ok(())
}

#[receive(
    contract = "PaymentLogger",
    name = "getEntry",
    parameter = "EntryParams",
    return_value = "PaymentEntry"
)]
fn logger_get_entry<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<LoggerState<S>, StateApiType = S>,
) -> ContractResult<PaymentEntry> {
    let params: EntryParams = ctx.parameter_cursor().get()?;
    host.state().entry(&params.payer, params.index)
}

#[receive(
    contract = "PaymentLogger",
    name = "entryCount",
    parameter = "Address",
    return_value = "u32"
)]
fn logger_entry_count<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<LoggerState<S>, StateApiType = S>,
) -> ContractResult<u32> {
    let payer: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().count(&payer))
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::CustomContractError;
    use test_infrastructure::*;

    const PAYER: AccountAddress = AccountAddress([1; 32]);
    const RECEIVER: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };

    fn default_host() -> TestHost<LoggerState<TestStateApi>> {
        let ctx = TestInitContext::empty();
        let mut state_builder = TestStateBuilder::new();

        let state = logger_init(&ctx, &mut state_builder)
            .expect_report("Failed during init_PaymentLogger");

        TestHost::new(state, state_builder)
    }

    fn log(
        host: &mut TestHost<LoggerState<TestStateApi>>,
        logger: &mut TestLogger,
        amount: Amount,
        millis: u64,
    ) -> ContractResult<()> {
        let bytes = to_bytes(&LogPaymentParams {
            payer: Address::Account(PAYER),
            amount,
        });
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Contract(RECEIVER))
            .set_parameter(&bytes)
            .set_metadata_slot_time(Timestamp::from_timestamp_millis(millis));
        logger_log(&ctx, host, logger)
    }

    fn get_entry(
        host: &TestHost<LoggerState<TestStateApi>>,
        index: u32,
    ) -> ContractResult<PaymentEntry> {
        let bytes = to_bytes(&EntryParams {
            payer: Address::Account(PAYER),
            index,
        });
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&bytes);
        logger_get_entry(&ctx, host)
    }

    fn entry_count(host: &TestHost<LoggerState<TestStateApi>>) -> ContractResult<u32> {
        let bytes = to_bytes(&Address::Account(PAYER));
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&bytes);
        logger_entry_count(&ctx, host)
    }

    #[concordium_test]
    fn test_log() {
        let mut host = default_host();
        let mut logger = TestLogger::init();

        claim_eq!(entry_count(&host), Ok(0));

        claim_eq!(log(&mut host, &mut logger, Amount::from_ccd(1), 10), Ok(()));
        claim_eq!(log(&mut host, &mut logger, Amount::from_ccd(2), 20), Ok(()));

        claim_eq!(entry_count(&host), Ok(2));
        claim_eq!(
            get_entry(&host, 1),
            Ok(PaymentEntry {
                amount: Amount::from_ccd(2),
                timestamp: Timestamp::from_timestamp_millis(20),
            })
        );

        claim_eq!(logger.logs.len(), 2);
        claim_eq!(
            logger.logs[0],
            to_bytes(&LoggerEvents::PaymentLogged(PaymentLoggedEvent {
                payer: &Address::Account(PAYER),
                amount: Amount::from_ccd(1),
                timestamp: Timestamp::from_timestamp_millis(10),
            }))
        );
    }

    #[concordium_test]
    fn test_get_entry_not_found() {
        let mut host = default_host();
        let mut logger = TestLogger::init();

        claim_eq!(get_entry(&host, 0), Err(CustomContractError::NotFound));

        let _ = log(&mut host, &mut logger, Amount::from_ccd(1), 10);
        claim_eq!(get_entry(&host, 1), Err(CustomContractError::NotFound));
    }
}
