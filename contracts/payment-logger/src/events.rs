use commons::PAYMENT_LOGGED_TAG;
use concordium_std::*;

/// Logged payment event data.
#[derive(Debug, Serial)]
pub struct PaymentLoggedEvent<'a> {
    pub payer: &'a Address,
    pub amount: Amount,
    pub timestamp: Timestamp,
}

/// Tagged Custom event to be serialized for the event log.
#[derive(Debug)]
pub enum LoggerEvents<'a> {
    PaymentLogged(PaymentLoggedEvent<'a>),
}

impl<'a> Serial for LoggerEvents<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            LoggerEvents::PaymentLogged(event) => {
                out.write_u8(PAYMENT_LOGGED_TAG)?;
                event.serial(out)
            }
        }
    }
}
