//! Currency normalization into a company's base currency.
//!
//! Rates are quoted against a reference currency as
//! `1 reference = rate × currency`, so converting `amount` from `from` into
//! `base` is `amount / rate(from) × rate(base)`. With the default table the
//! reference is USD: `100 EUR` becomes `100 / 0.85 = 117.65 USD`.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{Currency, EngineError, Money, ResultEngine};

/// Source of exchange rates.
///
/// Returning `None` means the provider cannot price that currency, which
/// fails the conversion with [`EngineError::UnknownCurrency`].
pub trait RateProvider: Send + Sync + std::fmt::Debug {
    fn rate_for(&self, currency: Currency) -> Option<Decimal>;
}

/// Fixed in-memory rate table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticRates {
    rates: HashMap<Currency, Decimal>,
}

impl StaticRates {
    /// An empty table; every lookup misses until rates are added.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_rate(mut self, currency: Currency, rate: Decimal) -> Self {
        self.rates.insert(currency, rate);
        self
    }

    /// Inserts or replaces a rate. Non-positive rates are rejected.
    pub fn set_rate(&mut self, currency: Currency, rate: Decimal) -> ResultEngine<()> {
        if rate <= Decimal::ZERO {
            return Err(EngineError::InvalidAmount(format!(
                "rate for {currency} must be > 0"
            )));
        }
        self.rates.insert(currency, rate);
        Ok(())
    }
}

impl Default for StaticRates {
    /// USD-referenced table.
    fn default() -> Self {
        Self::empty()
            .with_rate(Currency::Usd, Decimal::ONE)
            .with_rate(Currency::Eur, Decimal::new(85, 2))
            .with_rate(Currency::Gbp, Decimal::new(73, 2))
            .with_rate(Currency::Inr, Decimal::new(75, 0))
            .with_rate(Currency::Cad, Decimal::new(125, 2))
            .with_rate(Currency::Aud, Decimal::new(135, 2))
            .with_rate(Currency::Jpy, Decimal::new(110, 0))
    }
}

impl RateProvider for StaticRates {
    fn rate_for(&self, currency: Currency) -> Option<Decimal> {
        self.rates.get(&currency).copied()
    }
}

fn rate(rates: &dyn RateProvider, currency: Currency) -> ResultEngine<Decimal> {
    rates
        .rate_for(currency)
        .filter(|r| *r > Decimal::ZERO)
        .ok_or_else(|| EngineError::UnknownCurrency(format!("no exchange rate for {currency}")))
}

/// Converts a positive `amount` into `base`.
///
/// Same-currency amounts are returned untouched and never consult the
/// provider.
pub fn normalize(amount: Money, base: Currency, rates: &dyn RateProvider) -> ResultEngine<Money> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
    }
    if amount.currency() == base {
        return Ok(amount);
    }

    let from_rate = rate(rates, amount.currency())?;
    let base_rate = rate(rates, base)?;
    let value = amount
        .to_decimal()
        .checked_div(from_rate)
        .and_then(|v| v.checked_mul(base_rate))
        .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;

    let converted = Money::from_decimal(value, base)?;
    if !converted.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "{amount} is below the smallest {base} unit"
        )));
    }
    Ok(converted)
}
