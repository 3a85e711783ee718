use rust_decimal::{Decimal, RoundingStrategy};

/// Renders an amount the way pt-BR locales print Brazilian reais, e.g. `R$ 1.234,56`
/// with a non-breaking space after the symbol.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let cents = (rounded.abs() * Decimal::ONE_HUNDRED).trunc();
    let digits = cents.to_string();
    let digits = format!("{digits:0>3}");
    let (whole, fraction) = digits.split_at(digits.len() - 2);

    format!("{sign}R$\u{a0}{},{fraction}", group_thousands(whole))
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, ch) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
