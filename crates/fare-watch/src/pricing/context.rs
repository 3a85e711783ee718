use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::alerts::money::format_brl;

/// Where a price sits relative to what the route usually costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceLevel {
    Low,
    Typical,
    High,
}

impl PriceLevel {
    pub fn label(self) -> &'static str {
        match self {
            PriceLevel::Low => "BAIXO",
            PriceLevel::Typical => "NA MÉDIA",
            PriceLevel::High => "ALTO",
        }
    }
}

/// First and third quartile of historical fares for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuartiles {
    pub first: Decimal,
    pub third: Decimal,
}

impl PriceQuartiles {
    pub fn classify(&self, price: Decimal) -> PriceLevel {
        if price <= self.first {
            PriceLevel::Low
        } else if price <= self.third {
            PriceLevel::Typical
        } else {
            PriceLevel::High
        }
    }

    /// HTML sentence placed in the confirmation email.
    pub fn describe(&self, price: Decimal) -> String {
        let level = self.classify(price);
        let verb = match level {
            PriceLevel::Typical => "está",
            PriceLevel::Low | PriceLevel::High => "é considerado",
        };
        format!(
            "Este preço {verb} <strong>{}</strong> para esta rota.",
            level.label()
        )
    }
}

/// Google Flights commentary as relayed by the tracker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceInsights {
    #[serde(default)]
    pub lowest_price: Option<Decimal>,
    #[serde(default)]
    pub price_level: Option<String>,
    #[serde(default)]
    pub typical_price_range: Option<(Decimal, Decimal)>,
}

impl PriceInsights {
    /// HTML sentence placed in the price-change email, `None` without a level.
    pub fn describe(&self) -> Option<String> {
        let level = self
            .price_level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())?
            .to_uppercase();

        let mut sentence =
            format!("Este novo preço é considerado <strong>{level}</strong> para esta rota");
        if let Some((low, high)) = self.typical_price_range {
            sentence.push_str(&format!(
                " (normalmente entre {} e {})",
                format_brl(low),
                format_brl(high)
            ));
        }
        sentence.push('.');
        Some(sentence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quartiles() -> PriceQuartiles {
        PriceQuartiles {
            first: Decimal::new(800, 0),
            third: Decimal::new(1400, 0),
        }
    }

    #[test]
    fn classifies_on_inclusive_quartile_bounds() {
        let q = quartiles();
        assert_eq!(q.classify(Decimal::new(800, 0)), PriceLevel::Low);
        assert_eq!(q.classify(Decimal::new(80001, 2)), PriceLevel::Typical);
        assert_eq!(q.classify(Decimal::new(1400, 0)), PriceLevel::Typical);
        assert_eq!(q.classify(Decimal::new(1401, 0)), PriceLevel::High);
    }

    #[test]
    fn quartile_sentence_mentions_level() {
        let sentence = quartiles().describe(Decimal::new(2000, 0));
        assert!(sentence.contains("<strong>ALTO</strong>"));
    }

    #[test]
    fn insights_sentence_includes_typical_range() {
        let insights: PriceInsights = serde_json::from_value(serde_json::json!({
            "lowest_price": 612,
            "price_level": "low",
            "typical_price_range": [700, 1100]
        }))
        .expect("insights parse");
        let sentence = insights.describe().expect("level present");
        assert!(sentence.contains("<strong>LOW</strong>"));
        assert!(sentence.contains("R$\u{a0}700,00 e R$\u{a0}1.100,00"));
    }

    #[test]
    fn insights_without_level_produce_no_sentence() {
        let insights = PriceInsights {
            lowest_price: Some(Decimal::new(612, 0)),
            price_level: None,
            typical_price_range: None,
        };
        assert!(insights.describe().is_none());
    }

    #[test]
    fn insights_without_range_end_with_period() {
        let insights = PriceInsights {
            lowest_price: None,
            price_level: Some("high".to_string()),
            typical_price_range: None,
        };
        assert_eq!(
            insights.describe().as_deref(),
            Some("Este novo preço é considerado <strong>HIGH</strong> para esta rota.")
        );
    }
}
