use super::*;

/// Division of a final price between the platform and the seller.
#[derive(SchemaType, Serialize, Eq, PartialEq, Debug, Clone, Copy)]
pub struct FeeSplit {
    pub platform_fee: Amount,
    pub seller_proceeds: Amount,
}

// convert the basis points and amount into a payout, rounding down
fn basis_points_to_payout(price: Amount, basis_points: u64) -> Amount {
    Amount::from_micro_ccd(
        (price.micro_ccd as u128 * basis_points as u128 / BASIS_POINTS_DENOMINATOR as u128) as u64,
    )
}

/// Splits `price` using the engine-wide platform fee.
pub fn split_fee(price: Amount) -> FeeSplit {
    split_fee_with(price, PLATFORM_FEE_BASIS_POINTS)
}

/// Splits `price`, giving `fee_basis_points` of it to the platform. The fee is
/// floored, so the seller receives any rounding remainder.
pub fn split_fee_with(price: Amount, fee_basis_points: u64) -> FeeSplit {
    let platform_fee =
        basis_points_to_payout(price, fee_basis_points.min(BASIS_POINTS_DENOMINATOR));
    FeeSplit {
        platform_fee,
        seller_proceeds: Amount::from_micro_ccd(price.micro_ccd - platform_fee.micro_ccd),
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;

    #[concordium_test]
    fn test_split_fee() {
        let expected = FeeSplit {
            platform_fee: Amount::from_ccd(10),
            seller_proceeds: Amount::from_ccd(90),
        };

        claim_eq!(split_fee(Amount::from_ccd(100)), expected);
    }

    #[concordium_test]
    fn test_split_fee_rounds_down() {
        let split = split_fee(Amount::from_micro_ccd(97));

        claim_eq!(split.platform_fee, Amount::from_micro_ccd(9));
        claim_eq!(split.seller_proceeds, Amount::from_micro_ccd(88));
    }

    #[concordium_test]
    fn test_split_fee_zero_price() {
        let split = split_fee(Amount::zero());

        claim_eq!(split.platform_fee, Amount::zero());
        claim_eq!(split.seller_proceeds, Amount::zero());
    }

    #[concordium_test]
    fn test_split_fee_large_price_does_not_overflow() {
        let price = Amount::from_micro_ccd(u64::MAX);
        let split = split_fee(price);

        claim_eq!(split.platform_fee, Amount::from_micro_ccd(u64::MAX / 10));
        claim_eq!(
            split.platform_fee.micro_ccd + split.seller_proceeds.micro_ccd,
            u64::MAX
        );
    }

    #[concordium_test]
    fn test_split_fee_is_capped_at_whole_price() {
        let split = split_fee_with(Amount::from_ccd(5), 20_000);

        claim_eq!(split.platform_fee, Amount::from_ccd(5));
        claim_eq!(split.seller_proceeds, Amount::zero());
    }
}
