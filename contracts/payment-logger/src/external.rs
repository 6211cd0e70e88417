use concordium_std::*;

/// Parameter of the `log` function.
#[derive(Debug, Clone, Serialize, SchemaType, PartialEq, Eq)]
pub struct LogPaymentParams {
    /// Address the payment came from.
    pub payer: Address,
    pub amount: Amount,
}

/// Parameter of the `getEntry` and `payment` functions.
#[derive(Debug, Clone, Serialize, SchemaType, PartialEq, Eq)]
pub struct EntryParams {
    pub payer: Address,
    /// Position in the payer's list, starting at zero.
    pub index: u32,
}

/// A single logged payment.
#[derive(Debug, Clone, Copy, Serialize, SchemaType, PartialEq, Eq)]
pub struct PaymentEntry {
    pub amount: Amount,
    /// Slot time at which the payment was logged.
    pub timestamp: Timestamp,
}
