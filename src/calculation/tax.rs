//! Progressive tax bracket table.
//!
//! Each bracket taxes only the slice of gross salary between the previous
//! bracket's upper limit and its own. Tables are validated when they are
//! built, so a [`TaxBracketTable`] value is always well-formed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::round_money;
use crate::error::{EngineError, EngineResult};

/// One `(upper limit, rate)` pair of a bracket table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Upper limit of the bracket. `None` means unbounded.
    #[serde(default)]
    pub upper_limit: Option<Decimal>,
    /// Marginal rate as a fraction (0.15 = 15%).
    pub rate: Decimal,
}

impl TaxBracket {
    /// A bracket that ends at `upper_limit`.
    pub fn bounded(upper_limit: Decimal, rate: Decimal) -> Self {
        Self {
            upper_limit: Some(upper_limit),
            rate,
        }
    }

    /// The final, unbounded bracket.
    pub fn unbounded(rate: Decimal) -> Self {
        Self {
            upper_limit: None,
            rate,
        }
    }
}

/// The portion of gross salary taxed within one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSlice {
    /// Lower bound of the bracket.
    pub lower_limit: Decimal,
    /// Upper bound of the bracket, `None` when unbounded.
    pub upper_limit: Option<Decimal>,
    /// The marginal rate applied.
    pub rate: Decimal,
    /// The amount of gross salary falling in this bracket.
    pub taxable_amount: Decimal,
    /// `taxable_amount x rate`, unrounded.
    pub tax: Decimal,
}

/// The result of applying a bracket table to a gross amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAssessment {
    /// The gross amount assessed.
    pub gross: Decimal,
    /// Total tax, rounded to 2 decimal places.
    pub tax: Decimal,
    /// The slices that contributed, in ascending bracket order.
    pub slices: Vec<TaxSlice>,
}

/// An ordered, validated progressive tax table covering `[0, inf)`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::TaxBracketTable;
/// use rust_decimal::Decimal;
///
/// let table = TaxBracketTable::default();
/// // 1000 x 10% + 4000 x 15% + 48000 x 20%
/// assert_eq!(table.tax_for(Decimal::from(53000)), Decimal::from(10300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaxBracketTable {
    brackets: Vec<TaxBracket>,
}

impl TaxBracketTable {
    /// Validates and builds a bracket table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTaxConfiguration` if the table is empty, a rate is
    /// outside `[0, 1]`, an upper limit is not positive, upper limits are not
    /// strictly increasing, or the last bracket is bounded.
    pub fn new(brackets: Vec<TaxBracket>) -> EngineResult<Self> {
        let invalid = |message: String| EngineError::InvalidTaxConfiguration { message };

        if brackets.is_empty() {
            return Err(invalid("bracket table is empty".to_string()));
        }

        let last = brackets.len() - 1;
        let mut previous_limit = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(invalid(format!(
                    "bracket {} has rate {} outside 0..=1",
                    index + 1,
                    bracket.rate
                )));
            }

            match bracket.upper_limit {
                Some(limit) if index == last => {
                    return Err(invalid(format!(
                        "last bracket must be unbounded, found limit {}",
                        limit
                    )));
                }
                Some(limit) if limit <= previous_limit => {
                    return Err(invalid(format!(
                        "bracket {} limit {} does not exceed previous limit {}",
                        index + 1,
                        limit,
                        previous_limit
                    )));
                }
                Some(limit) => previous_limit = limit,
                None if index != last => {
                    return Err(invalid(format!(
                        "bracket {} is unbounded but is not the last bracket",
                        index + 1
                    )));
                }
                None => {}
            }
        }

        Ok(Self { brackets })
    }

    /// The brackets in ascending order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// The highest marginal rate in the table.
    pub fn max_rate(&self) -> Decimal {
        self.brackets
            .iter()
            .map(|b| b.rate)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Applies the table to `gross`, recording each contributing slice.
    ///
    /// Brackets are walked in ascending order; each taxes
    /// `min(remaining, limit - previous_limit)` and the walk stops once
    /// nothing remains.
    pub fn assess(&self, gross: Decimal) -> TaxAssessment {
        let mut tax = Decimal::ZERO;
        let mut remaining = gross;
        let mut previous_limit = Decimal::ZERO;
        let mut slices = Vec::new();

        for bracket in &self.brackets {
            if remaining <= Decimal::ZERO {
                break;
            }

            let taxable_amount = match bracket.upper_limit {
                Some(limit) => remaining.min(limit - previous_limit),
                None => remaining,
            };
            let slice_tax = taxable_amount * bracket.rate;

            tax += slice_tax;
            remaining -= taxable_amount;
            slices.push(TaxSlice {
                lower_limit: previous_limit,
                upper_limit: bracket.upper_limit,
                rate: bracket.rate,
                taxable_amount,
                tax: slice_tax,
            });

            if let Some(limit) = bracket.upper_limit {
                previous_limit = limit;
            }
        }

        TaxAssessment {
            gross,
            tax: round_money(tax),
            slices,
        }
    }

    /// Total tax on `gross`, rounded to 2 decimal places.
    pub fn tax_for(&self, gross: Decimal) -> Decimal {
        self.assess(gross).tax
    }
}

impl Default for TaxBracketTable {
    /// `[1000 -> 10%, 5000 -> 15%, inf -> 20%]`.
    fn default() -> Self {
        Self {
            brackets: vec![
                TaxBracket::bounded(Decimal::from(1000), Decimal::new(10, 2)),
                TaxBracket::bounded(Decimal::from(5000), Decimal::new(15, 2)),
                TaxBracket::unbounded(Decimal::new(20, 2)),
            ],
        }
    }
}

impl<'de> Deserialize<'de> for TaxBracketTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let brackets = Vec::<TaxBracket>::deserialize(deserializer)?;
        TaxBracketTable::new(brackets).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn expect_invalid(result: EngineResult<TaxBracketTable>, needle: &str) {
        match result {
            Err(EngineError::InvalidTaxConfiguration { message }) => {
                assert!(message.contains(needle), "unexpected message: {}", message)
            }
            other => panic!("Expected InvalidTaxConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_default_table_matches_documented_brackets() {
        let table = TaxBracketTable::default();
        assert_eq!(
            TaxBracketTable::new(table.brackets().to_vec()).unwrap(),
            table
        );
        assert_eq!(table.brackets().len(), 3);
        assert_eq!(table.max_rate(), dec("0.20"));
    }

    #[test]
    fn test_tax_on_53000_is_10300() {
        let assessment = TaxBracketTable::default().assess(dec("53000"));
        assert_eq!(assessment.tax, dec("10300.00"));
        assert_eq!(assessment.slices.len(), 3);
        assert_eq!(assessment.slices[0].tax, dec("100.00"));
        assert_eq!(assessment.slices[1].taxable_amount, dec("4000"));
        assert_eq!(assessment.slices[1].tax, dec("600.00"));
        assert_eq!(assessment.slices[2].taxable_amount, dec("48000"));
        assert_eq!(assessment.slices[2].tax, dec("9600.00"));
    }

    #[test]
    fn test_tax_within_first_bracket() {
        let assessment = TaxBracketTable::default().assess(dec("800"));
        assert_eq!(assessment.tax, dec("80.00"));
        assert_eq!(assessment.slices.len(), 1);
    }

    #[test]
    fn test_tax_at_bracket_boundary_stops_early() {
        let assessment = TaxBracketTable::default().assess(dec("1000"));
        assert_eq!(assessment.tax, dec("100.00"));
        assert_eq!(assessment.slices.len(), 1);
    }

    #[test]
    fn test_zero_gross_has_zero_tax_and_no_slices() {
        let assessment = TaxBracketTable::default().assess(Decimal::ZERO);
        assert_eq!(assessment.tax, Decimal::ZERO);
        assert!(assessment.slices.is_empty());
    }

    #[test]
    fn test_tax_is_not_a_flat_rate() {
        // A flat 20% would be 1200; marginal is 100 + 600 + 200
        let tax = TaxBracketTable::default().tax_for(dec("6000"));
        assert_eq!(tax, dec("900.00"));
    }

    #[test]
    fn test_tax_rounds_to_two_places() {
        // 123.456 x 10% = 12.3456
        assert_eq!(TaxBracketTable::default().tax_for(dec("123.456")), dec("12.35"));
    }

    #[test]
    fn test_single_unbounded_bracket_is_flat() {
        let table = TaxBracketTable::new(vec![TaxBracket::unbounded(dec("0.25"))]).unwrap();
        assert_eq!(table.tax_for(dec("400")), dec("100.00"));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        expect_invalid(TaxBracketTable::new(vec![]), "empty");
    }

    #[test]
    fn test_non_increasing_limits_are_rejected() {
        expect_invalid(
            TaxBracketTable::new(vec![
                TaxBracket::bounded(dec("5000"), dec("0.10")),
                TaxBracket::bounded(dec("1000"), dec("0.15")),
                TaxBracket::unbounded(dec("0.20")),
            ]),
            "does not exceed",
        );
        expect_invalid(
            TaxBracketTable::new(vec![
                TaxBracket::bounded(dec("1000"), dec("0.10")),
                TaxBracket::bounded(dec("1000"), dec("0.15")),
                TaxBracket::unbounded(dec("0.20")),
            ]),
            "does not exceed",
        );
    }

    #[test]
    fn test_bounded_last_bracket_is_rejected() {
        expect_invalid(
            TaxBracketTable::new(vec![
                TaxBracket::bounded(dec("1000"), dec("0.10")),
                TaxBracket::bounded(dec("5000"), dec("0.15")),
            ]),
            "last bracket must be unbounded",
        );
    }

    #[test]
    fn test_unbounded_bracket_in_the_middle_is_rejected() {
        expect_invalid(
            TaxBracketTable::new(vec![
                TaxBracket::unbounded(dec("0.10")),
                TaxBracket::unbounded(dec("0.20")),
            ]),
            "not the last bracket",
        );
    }

    #[test]
    fn test_rate_out_of_range_is_rejected() {
        expect_invalid(
            TaxBracketTable::new(vec![TaxBracket::unbounded(dec("1.5"))]),
            "outside 0..=1",
        );
        expect_invalid(
            TaxBracketTable::new(vec![TaxBracket::unbounded(dec("-0.1"))]),
            "outside 0..=1",
        );
    }

    #[test]
    fn test_zero_first_limit_is_rejected() {
        expect_invalid(
            TaxBracketTable::new(vec![
                TaxBracket::bounded(Decimal::ZERO, dec("0.10")),
                TaxBracket::unbounded(dec("0.20")),
            ]),
            "does not exceed",
        );
    }

    #[test]
    fn test_deserialize_validates_table() {
        let yaml = "- upper_limit: 1000\n  rate: 0.1\n- rate: 0.2\n";
        let table: TaxBracketTable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(table.tax_for(dec("2000")), dec("300.00"));

        let bad = "- upper_limit: 1000\n  rate: 0.1\n";
        assert!(serde_yaml::from_str::<TaxBracketTable>(bad).is_err());
    }

    fn money() -> impl Strategy<Value = Decimal> {
        (0i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    fn bracket_table() -> impl Strategy<Value = TaxBracketTable> {
        (
            proptest::collection::vec((1i64..500_000, 0u32..=100), 0..5),
            0u32..=100,
        )
            .prop_map(|(steps, last_rate)| {
                let mut limit = Decimal::ZERO;
                let mut brackets: Vec<TaxBracket> = steps
                    .into_iter()
                    .map(|(step, rate)| {
                        limit += Decimal::from(step);
                        TaxBracket::bounded(limit, Decimal::new(rate as i64, 2))
                    })
                    .collect();
                brackets.push(TaxBracket::unbounded(Decimal::new(last_rate as i64, 2)));
                TaxBracketTable::new(brackets).unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_tax_is_non_decreasing_in_gross(
            table in bracket_table(),
            a in money(),
            b in money(),
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(table.tax_for(low) <= table.tax_for(high));
        }

        #[test]
        fn prop_tax_never_exceeds_max_rate(table in bracket_table(), gross in money()) {
            let bound = round_money(gross * table.max_rate());
            prop_assert!(table.tax_for(gross) <= bound);
            prop_assert!(table.tax_for(gross) >= Decimal::ZERO);
        }

        #[test]
        fn prop_slices_cover_gross_exactly(table in bracket_table(), gross in money()) {
            let assessment = table.assess(gross);
            let covered: Decimal = assessment.slices.iter().map(|s| s.taxable_amount).sum();
            prop_assert_eq!(covered, gross);
        }
    }
}
