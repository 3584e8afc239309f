//! Line-item pricing.
//!
//! All money math runs on fixed-point decimals so totals reconcile exactly no
//! matter how many lines an order accumulates; floating point never touches a
//! price.

use rust_decimal::Decimal;

/// Computed prices for one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrice {
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Computes the unit and total price for a single order line.
///
/// `unit_price = menu_item_price + Σ customization surcharges` and
/// `total_price = unit_price × quantity`. Pure and infallible; `quantity >= 1`
/// is validated before any cart line reaches this point.
pub fn compute_line_item(
    menu_item_price: Decimal,
    customization_surcharges: &[Decimal],
    quantity: i32,
) -> LinePrice {
    let unit_price: Decimal = customization_surcharges
        .iter()
        .fold(menu_item_price, |acc, extra| acc + extra);
    let total_price = unit_price * Decimal::from(quantity);

    LinePrice {
        unit_price,
        total_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn plain_line_multiplies_by_quantity() {
        // Two of an 8.50 dish with no customizations.
        let price = compute_line_item(dec!(8.50), &[], 2);
        assert_eq!(price.unit_price, dec!(8.50));
        assert_eq!(price.total_price, dec!(17.00));
    }

    #[test]
    fn surcharges_are_added_to_the_unit_price() {
        // 8.50 dish with +1.25 and +0.75 add-ons.
        let price = compute_line_item(dec!(8.50), &[dec!(1.25), dec!(0.75)], 1);
        assert_eq!(price.unit_price, dec!(10.50));
        assert_eq!(price.total_price, dec!(10.50));
    }

    #[test]
    fn repeated_small_surcharges_sum_exactly() {
        // 3 x 0.10 must be exactly 0.30, with no binary rounding drift.
        let price = compute_line_item(dec!(0.00), &[dec!(0.10), dec!(0.10), dec!(0.10)], 1);
        assert_eq!(price.unit_price, dec!(0.30));
    }

    #[test]
    fn zero_surcharge_choices_do_not_change_the_price() {
        let price = compute_line_item(dec!(12.00), &[dec!(0.00)], 3);
        assert_eq!(price.unit_price, dec!(12.00));
        assert_eq!(price.total_price, dec!(36.00));
    }

    proptest! {
        #[test]
        fn total_is_always_unit_times_quantity(
            cents in 0i64..100_000,
            extras in prop::collection::vec(0i64..10_000, 0..6),
            quantity in 1i32..50,
        ) {
            let base = Decimal::new(cents, 2);
            let surcharges: Vec<Decimal> =
                extras.iter().map(|c| Decimal::new(*c, 2)).collect();

            let price = compute_line_item(base, &surcharges, quantity);

            let expected_unit = surcharges.iter().fold(base, |acc, s| acc + s);
            prop_assert_eq!(price.unit_price, expected_unit);
            prop_assert_eq!(price.total_price, expected_unit * Decimal::from(quantity));
        }
    }
}
