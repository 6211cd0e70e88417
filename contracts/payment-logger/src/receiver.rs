use commons::{ContractResult, CustomContractError};
use concordium_std::*;

use crate::external::*;
use crate::state::ReceiverState;

/// Initialize the receiver with the logger contract it reports to.
#[init(contract = "PaymentReceiver", parameter = "ContractAddress")]
fn receiver_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    _state_builder: &mut StateBuilder<S>,
) -> InitResult<ReceiverState> {
    let logger: ContractAddress = ctx.parameter_cursor().get()?;
    Ok(ReceiverState { logger })
}

/// Accept a deposit and report it to the logger.
///
/// It rejects if:
/// - The logger rejects the report.
#[receive(mutable, payable, contract = "PaymentReceiver", name = "deposit")]
fn receiver_deposit<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<ReceiverState, StateApiType = S>,
    amount: Amount,
) -> ContractResult<()> {
    let logger = host.state().logger;

    host.invoke_contract(
        &logger,
        &LogPaymentParams {
            payer: ctx.sender(),
            amount,
        },
        EntrypointName::new_unchecked("log"),
        Amount::zero(),
    )?;

    Ok(())
}

/// Amount of a logged deposit, read back from the logger.
///
/// It rejects if:
/// - It fails to parse the parameter.
/// - The logger has no such entry.
/// - The logger answer can not be parsed.
#[receive(
    contract = "PaymentReceiver",
    name = "payment",
    parameter = "EntryParams",
    return_value = "Amount"
)]
fn receiver_payment<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<ReceiverState, StateApiType = S>,
) -> ContractResult<Amount> {
    let params: EntryParams = ctx.parameter_cursor().get()?;

    let mut result = host
        .invoke_contract_read_only(
            &host.state().logger,
            &params,
            EntrypointName::new_unchecked("getEntry"),
            Amount::zero(),
        )?
        .ok_or(CustomContractError::InvokeContractError)?;
    let entry = PaymentEntry::deserial(&mut result)?;

    Ok(entry.amount)
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::test::*;
    use test_infrastructure::*;

    const PAYER: AccountAddress = AccountAddress([1; 32]);
    const LOGGER: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };

    fn default_host() -> TestHost<ReceiverState> {
        let bytes = to_bytes(&LOGGER);
        let mut ctx = TestInitContext::empty();
        ctx.set_parameter(&bytes);
        let mut state_builder = TestStateBuilder::new();

        let state = receiver_init(&ctx, &mut state_builder)
            .expect_report("Failed during init_PaymentReceiver");

        TestHost::new(state, state_builder)
    }

    fn deposit_ctx() -> TestReceiveContext<'static> {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(PAYER)).set_invoker(PAYER);
        ctx
    }

    #[concordium_test]
    fn test_init() {
        let host = default_host();
        claim_eq!(host.state().logger, LOGGER);
    }

    #[concordium_test]
    fn test_deposit_is_logged() {
        let mut host = default_host();
        let ctx = deposit_ctx();

        // Logger accepts only the exact report of this deposit
        host.setup_mock_entrypoint(
            LOGGER,
            OwnedEntrypointName::new_unchecked(String::from("log")),
            parse_and_check_mock::<LogPaymentParams, _>(
                |params| {
                    params.payer == Address::Account(PAYER)
                        && params.amount == Amount::from_ccd(5)
                },
                (),
            ),
        );

        let result = receiver_deposit(&ctx, &mut host, Amount::from_ccd(5));
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_deposit_rejected_by_logger() {
        let mut host = default_host();
        let ctx = deposit_ctx();

        host.setup_mock_entrypoint(
            LOGGER,
            OwnedEntrypointName::new_unchecked(String::from("log")),
            parse_and_check_mock::<LogPaymentParams, _>(|_| false, ()),
        );

        let result = receiver_deposit(&ctx, &mut host, Amount::from_ccd(5));
        claim_eq!(result, Err(CustomContractError::InvokeContractError));
    }

    #[concordium_test]
    fn test_payment() {
        let mut host = default_host();

        host.setup_mock_entrypoint(
            LOGGER,
            OwnedEntrypointName::new_unchecked(String::from("getEntry")),
            parse_and_map_mock(|params: &EntryParams| {
                if params.payer == Address::Account(PAYER) && params.index == 0 {
                    Some(PaymentEntry {
                        amount: Amount::from_ccd(5),
                        timestamp: Timestamp::from_timestamp_millis(10),
                    })
                } else {
                    None
                }
            }),
        );

        let bytes = to_bytes(&EntryParams {
            payer: Address::Account(PAYER),
            index: 0,
        });
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&bytes);
        claim_eq!(receiver_payment(&ctx, &host), Ok(Amount::from_ccd(5)));

        let bytes = to_bytes(&EntryParams {
            payer: Address::Account(PAYER),
            index: 1,
        });
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&bytes);
        claim_eq!(
            receiver_payment(&ctx, &host),
            Err(CustomContractError::InvokeContractError)
        );
    }
}
