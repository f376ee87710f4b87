//! Currency and unit normalization.
//!
//! Rates are fixed for the duration of a run. A price of `0` means the
//! amount could not be determined and the record must be rejected.

use luxe_core::AppConfig;
use once_cell::sync::Lazy;
use regex::Regex;

pub const SQFT_PER_SQM: f64 = 10.763_910_416_7;

static GROUPED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,3}(?:[,.]\d{3})+").unwrap());
static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static MILLION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\d\s?(?:million|mn|m)\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    Aed,
    Eur,
    Gbp,
    Hkd,
    Chf,
}

impl Currency {
    /// Detects the currency from explicit markers in a price snippet.
    pub fn detect(text: &str) -> Option<Currency> {
        let upper = text.to_uppercase();
        if upper.contains("AED") || text.contains("د.إ") {
            Some(Currency::Aed)
        } else if upper.contains("HKD") || upper.contains("HK$") {
            Some(Currency::Hkd)
        } else if upper.contains("CHF") {
            Some(Currency::Chf)
        } else if upper.contains("EUR") || text.contains('€') {
            Some(Currency::Eur)
        } else if upper.contains("GBP") || text.contains('£') {
            Some(Currency::Gbp)
        } else if upper.contains("USD") || text.contains('$') {
            Some(Currency::Usd)
        } else {
            None
        }
    }
}

/// Fixed conversion rates into USD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyRates {
    pub aed: f64,
    pub eur: f64,
    pub gbp: f64,
    pub hkd: f64,
    pub chf: f64,
}

impl Default for CurrencyRates {
    fn default() -> Self {
        Self { aed: 0.27, eur: 1.08, gbp: 1.27, hkd: 0.128, chf: 1.12 }
    }
}

impl CurrencyRates {
    pub fn from_config(config: &AppConfig) -> Self {
        Self { aed: config.aed_to_usd, ..Self::default() }
    }

    pub fn rate(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => 1.0,
            Currency::Aed => self.aed,
            Currency::Eur => self.eur,
            Currency::Gbp => self.gbp,
            Currency::Hkd => self.hkd,
            Currency::Chf => self.chf,
        }
    }

    /// Whole USD for `amount` in `currency`, rounded half away from zero.
    pub fn to_usd(&self, amount: f64, currency: Currency) -> i64 {
        (amount * self.rate(currency)).round() as i64
    }

    /// Parses a raw price snippet and converts it to whole USD.
    ///
    /// The hint wins over markers found in the text; without either the
    /// amount is taken as USD. Returns `0` when no positive amount is found.
    pub fn normalize_price(&self, raw: &str, hint: Option<Currency>) -> i64 {
        let Some(amount) = parse_amount(raw) else {
            return 0;
        };
        let currency = hint.or_else(|| Currency::detect(raw)).unwrap_or(Currency::Usd);
        self.to_usd(amount, currency).max(0)
    }
}

/// [`CurrencyRates::normalize_price`] with the default rates.
pub fn normalize_price(raw: &str, hint: Option<Currency>) -> i64 {
    CurrencyRates::default().normalize_price(raw, hint)
}

/// Extracts the numeric amount from a price snippet.
///
/// A comma- or dot-grouped number is taken as a whole group, so digits fused
/// onto the end of the last group are dropped (`296,000,0007` reads as
/// 296,000,000). Otherwise the leading digit run, with an optional decimal
/// part, is used. A `million`/`m` suffix scales the result. Zero is `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let multiplier = if MILLION_RE.is_match(raw) { 1_000_000.0 } else { 1.0 };

    let value = if let Some(grouped) = GROUPED_RE.find(raw) {
        grouped.as_str().replace([',', '.'], "").parse::<f64>().ok()?
    } else {
        DECIMAL_RE.find(raw)?.as_str().parse::<f64>().ok()?
    };

    let amount = value * multiplier;
    (amount > 0.0 && amount.is_finite()).then_some(amount)
}

pub fn sqm_to_sqft(sqm: f64) -> i64 {
    (sqm * SQFT_PER_SQM).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aed_conversion_is_deterministic() {
        let first = normalize_price("AED 10,000,000", Some(Currency::Aed));
        assert_eq!(first, 2_700_000);
        for _ in 0..100 {
            assert_eq!(normalize_price("AED 10,000,000", Some(Currency::Aed)), first);
        }
    }

    #[test]
    fn test_scenario_price() {
        assert_eq!(normalize_price("AED 3,700,000", Some(Currency::Aed)), 999_000);
    }

    #[test]
    fn test_currency_detection_without_hint() {
        assert_eq!(normalize_price("AED 1,000,000", None), 270_000);
        assert_eq!(normalize_price("$2,500,000", None), 2_500_000);
        assert_eq!(normalize_price("USD 12,000", None), 12_000);
        assert_eq!(normalize_price("€1.000.000", None), 1_080_000);
        assert_eq!(normalize_price("1,000,000", None), 1_000_000);
    }

    #[test]
    fn test_hint_overrides_text_marker() {
        assert_eq!(normalize_price("$1,000,000", Some(Currency::Aed)), 270_000);
    }

    #[test]
    fn test_unparseable_or_zero_is_zero() {
        assert_eq!(normalize_price("Price on request", Some(Currency::Aed)), 0);
        assert_eq!(normalize_price("AED 0", Some(Currency::Aed)), 0);
        assert_eq!(normalize_price("", None), 0);
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("3,700,000"), Some(3_700_000.0));
        assert_eq!(parse_amount("296,000,0007Beds"), Some(296_000_000.0));
        assert_eq!(parse_amount("$4.2 million"), Some(4_200_000.0));
        assert_eq!(parse_amount("USD 12m"), Some(12_000_000.0));
        assert_eq!(parse_amount("1,250.50"), Some(1_250.0));
        assert_eq!(parse_amount("45000"), Some(45_000.0));
        assert_eq!(parse_amount("none"), None);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let rates = CurrencyRates { aed: 0.5, ..Default::default() };
        assert_eq!(rates.to_usd(3.0, Currency::Aed), 2);
        assert_eq!(rates.to_usd(5.0, Currency::Aed), 3);
    }

    #[test]
    fn test_configured_aed_rate() {
        let config = AppConfig { aed_to_usd: 0.2723, ..Default::default() };
        let rates = CurrencyRates::from_config(&config);
        assert_eq!(rates.normalize_price("AED 1,000,000", Some(Currency::Aed)), 272_300);
    }

    #[test]
    fn test_sqm_to_sqft() {
        assert_eq!(sqm_to_sqft(100.0), 1_076);
        assert_eq!(sqm_to_sqft(0.0), 0);
    }
}
