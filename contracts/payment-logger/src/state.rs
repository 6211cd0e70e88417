use commons::CustomContractError;
use concordium_std::*;

use crate::external::PaymentEntry;

/// The `PaymentLogger` state.
#[derive(Serial, DeserialWithState)]
#[concordium(state_parameter = "S")]
pub struct LoggerState<S: HasStateApi> {
    /// Payments of every payer in arrival order.
    pub payments: StateMap<Address, Vec<PaymentEntry>, S>,
}

impl<S: HasStateApi> LoggerState<S> {
    pub fn new(state_builder: &mut StateBuilder<S>) -> Self {
        LoggerState {
            payments: state_builder.new_map(),
        }
    }

    /// Append an entry to the payer's list.
    pub fn append(&mut self, payer: Address, entry: PaymentEntry) {
        let mut entries = self.payments.entry(payer).or_insert_with(Vec::new);
        entries.push(entry);
    }

    pub fn entry(&self, payer: &Address, index: u32) -> Result<PaymentEntry, CustomContractError> {
        self.payments
            .get(payer)
            .and_then(|entries| (*entries).get(index as usize).copied())
            .ok_or(CustomContractError::NotFound)
    }

    pub fn count(&self, payer: &Address) -> u32 {
        self.payments
            .get(payer)
            .map(|entries| entries.len() as u32)
            .unwrap_or(0)
    }
}

/// The `PaymentReceiver` state.
#[derive(Serialize, SchemaType, Clone)]
pub struct ReceiverState {
    /// Logger every deposit is reported to.
    pub logger: ContractAddress,
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use test_infrastructure::*;

    const ACCOUNT_0: AccountAddress = AccountAddress([0; 32]);
    const ACCOUNT_1: AccountAddress = AccountAddress([1; 32]);

    fn entry(micro_ccd: u64, millis: u64) -> PaymentEntry {
        PaymentEntry {
            amount: Amount::from_micro_ccd(micro_ccd),
            timestamp: Timestamp::from_timestamp_millis(millis),
        }
    }

    #[concordium_test]
    fn test_entries_are_kept_per_payer_in_order() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = LoggerState::new(&mut state_builder);
        let payer = Address::Account(ACCOUNT_0);
        let other = Address::Account(ACCOUNT_1);

        state.append(payer, entry(10, 1));
        state.append(other, entry(20, 2));
        state.append(payer, entry(30, 3));

        claim_eq!(state.count(&payer), 2);
        claim_eq!(state.count(&other), 1);
        claim_eq!(state.entry(&payer, 0), Ok(entry(10, 1)));
        claim_eq!(state.entry(&payer, 1), Ok(entry(30, 3)));
        claim_eq!(state.entry(&other, 0), Ok(entry(20, 2)));
    }

    #[concordium_test]
    fn test_missing_entry() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = LoggerState::new(&mut state_builder);
        let payer = Address::Account(ACCOUNT_0);

        claim_eq!(state.count(&payer), 0);
        claim_eq!(state.entry(&payer, 0), Err(CustomContractError::NotFound));

        state.append(payer, entry(10, 1));
        claim_eq!(state.entry(&payer, 1), Err(CustomContractError::NotFound));
    }
}
