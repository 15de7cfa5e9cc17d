use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::indicators::ratio::PriceRatio;
use crate::indicators::spread::YieldSpread;
use crate::indicators::CalculatedIndicator;

/// Broad equity index used when a metric has no direct data source.
pub const PROXY_TICKER: &str = "^GSPC";

// ============================================================================
// ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Consumption,
    Supply,
    InterestRate,
    Market,
}

impl Category {
    /// Display order
    pub const ALL: [Category; 4] = [
        Category::Consumption,
        Category::Supply,
        Category::InterestRate,
        Category::Market,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Consumption => "Consumption",
            Category::Supply => "Supply",
            Category::InterestRate => "Interest Rate",
            Category::Market => "Market",
        }
    }

    /// Case-insensitive; accepts the label with or without spaces.
    pub fn from_label(label: &str) -> Option<Category> {
        let wanted: String = label.chars().filter(|c| !c.is_whitespace()).collect();
        Category::ALL
            .into_iter()
            .find(|c| c.label().replace(' ', "").eq_ignore_ascii_case(&wanted))
    }
}

/// How a metric's level series is obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RetrievalStrategy {
    /// One series from the macro-data provider
    MacroSeries { id: &'static str },
    /// Daily closes of two instruments, numerator / denominator
    Ratio { numerator: &'static str, denominator: &'static str },
    /// Two macro series, minuend - subtrahend
    Spread { minuend: &'static str, subtrahend: &'static str },
    /// Daily closes of one instrument
    SingleInstrument { ticker: &'static str },
    /// Placeholder: the broad equity index ([`PROXY_TICKER`])
    DefaultProxy,
}

impl RetrievalStrategy {
    /// Calculator for two-input strategies.
    pub fn calculator(&self) -> Option<Box<dyn CalculatedIndicator>> {
        match self {
            RetrievalStrategy::Ratio { numerator, denominator } => {
                Some(Box::new(PriceRatio::new(numerator, denominator)))
            }
            RetrievalStrategy::Spread { minuend, subtrahend } => {
                Some(Box::new(YieldSpread::new(minuend, subtrahend)))
            }
            _ => None,
        }
    }
}

// ============================================================================
// METADATA STRUCT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MetricMetadata {
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub strategy: RetrievalStrategy,
}

macro_rules! metric {
    ($name:expr, $cat:expr, $strategy:expr, $desc:expr) => {
        MetricMetadata {
            name: $name,
            category: $cat,
            description: $desc,
            strategy: $strategy,
        }
    };
}

fn fred(id: &'static str) -> RetrievalStrategy {
    RetrievalStrategy::MacroSeries { id }
}

// ============================================================================
// STATIC METRIC CATALOG (declaration order is display order)
// ============================================================================

static METRICS: Lazy<Vec<MetricMetadata>> = Lazy::new(|| {
    use Category::*;
    use RetrievalStrategy::*;

    vec![
        // =====================================================================
        // CONSUMPTION
        // =====================================================================
        metric!("GDP Growth Rate", Consumption, fred("GDPC1"),
            "Real Gross Domestic Product (FRED: GDPC1) - Inflation-adjusted measure of the total value of goods and services produced in the US."),
        metric!("Non-Farm Payroll", Consumption, fred("PAYEMS"),
            "Total Nonfarm Payroll (FRED: PAYEMS) - Number of U.S. workers in the economy excluding proprietors, private household employees, and farm employees."),
        metric!("Employment Data", Consumption, fred("ICSA"),
            "Initial Unemployment Claims (FRED: ICSA) - Number of new jobless claims filed by individuals seeking unemployment benefits."),
        metric!("Personal Finance", Consumption, fred("PSAVERT"),
            "Personal Savings Rate (FRED: PSAVERT) - Percentage of disposable personal income saved by individuals."),
        metric!("Housing Sales", Consumption, fred("HSN1F"),
            "New Home Sales (FRED: HSN1F) - Number of new single-family houses sold and for sale."),
        metric!("Auto Sales", Consumption, fred("TOTALSA"),
            "Total Vehicle Sales (FRED: TOTALSA) - Total number of light weight vehicles sold."),
        metric!("Retail Sales", Consumption, fred("RSXFS"),
            "Retail Sales (FRED: RSXFS) - Total sales for retail and food services."),

        // =====================================================================
        // SUPPLY
        // =====================================================================
        metric!("Manufacturing PMI", Supply, fred("NAPM"),
            "ISM Manufacturing PMI (FRED: NAPM) - Index based on surveys of manufacturing businesses, values over 50 indicate expansion."),
        metric!("Services PMI", Supply, fred("NMFCI"),
            "ISM Services PMI (FRED: NMFCI) - Index based on surveys of service sector businesses, values over 50 indicate expansion."),
        metric!("Housing Supply", Supply, fred("PERMIT"),
            "Building Permits (FRED: PERMIT) - Number of new housing units authorized by building permits."),
        metric!("Manufacturing Orders", Supply, fred("DGORDER"),
            "Durable Goods Orders (FRED: DGORDER) - New orders for manufactured durable goods."),
        metric!("Weekly Economic Index (WEI)", Supply, fred("WEI"),
            "NY Fed Weekly Economic Index (FRED: WEI) - An index of real economic activity using timely high-frequency data."),
        metric!("Copper/Gold Ratio", Supply, Ratio { numerator: "HG=F", denominator: "GC=F" },
            "Ratio between Copper and Gold futures prices - A measure of economic health and inflation expectations."),
        metric!("Oil/Gold Ratio", Supply, Ratio { numerator: "CL=F", denominator: "GC=F" },
            "Ratio between Crude Oil and Gold futures prices - An indicator of economic activity and inflation."),

        // =====================================================================
        // INTEREST RATE
        // =====================================================================
        metric!("Key Interest Rates", InterestRate, fred("DFF"),
            "Federal Funds Rate (FRED: DFF) - The interest rate at which banks lend money to each other overnight."),
        metric!("Credit Spread", InterestRate, Spread { minuend: "BAA", subtrahend: "DGS10" },
            "BAA Corporate Bond Yield minus 10-Year Treasury Yield - Measures market risk perception."),
        metric!("VIX Index", InterestRate, SingleInstrument { ticker: "^VIX" },
            "CBOE Volatility Index (^VIX) - Measures market's expectation of 30-day volatility."),

        // =====================================================================
        // MARKET (no free source yet, S&P 500 stands in)
        // =====================================================================
        metric!("AAII Investor Sentiment Survey", Market, DefaultProxy,
            "S&P 500 as proxy - Measures individual investor sentiment (bullish vs bearish)."),
        metric!("NAAIM Manager Sentiment", Market, DefaultProxy,
            "S&P 500 as proxy - Reflects professional money managers' current equity exposure."),
        metric!("Put/Call Ratio", Market, DefaultProxy,
            "S&P 500 as proxy - Ratio of put options to call options, indicating market sentiment."),
        metric!("CFTC Commitments of Traders", Market, DefaultProxy,
            "S&P 500 as proxy - Shows positions of large institutional traders."),
        metric!("Market Breadth", Market, DefaultProxy,
            "S&P 500 as proxy - Percentage of stocks above their moving averages."),
        metric!("Sector Relative Strength", Market, DefaultProxy,
            "S&P 500 as proxy - Relative performance of different market sectors."),
    ]
});

/// HashMap for O(1) name -> index lookup
static METRIC_MAP: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    METRICS
        .iter()
        .enumerate()
        .map(|(idx, m)| (m.name, idx))
        .collect()
});

// ============================================================================
// REGISTRY STRUCT & IMPL
// ============================================================================

pub struct Registry;

impl Registry {
    /// Categories in display order, each with its metric names in display order.
    pub fn list_categories() -> Vec<(Category, Vec<&'static str>)> {
        Category::ALL
            .into_iter()
            .map(|cat| (cat, Self::get_by_category(cat).into_iter().map(|m| m.name).collect()))
            .collect()
    }

    pub fn get_all() -> &'static [MetricMetadata] {
        &METRICS
    }

    pub fn get_by_category(category: Category) -> Vec<&'static MetricMetadata> {
        METRICS.iter().filter(|m| m.category == category).collect()
    }

    /// Exact, case-sensitive lookup.
    pub fn get_metadata(name: &str) -> Option<&'static MetricMetadata> {
        METRIC_MAP.get(name).and_then(|&idx| METRICS.get(idx))
    }

    pub fn definition(name: &str) -> Option<&'static str> {
        Self::get_metadata(name).map(|m| m.description)
    }

    /// Strategy for `name`; names outside the catalog get [`RetrievalStrategy::DefaultProxy`].
    pub fn strategy_for(name: &str) -> RetrievalStrategy {
        Self::get_metadata(name)
            .map(|m| m.strategy.clone())
            .unwrap_or(RetrievalStrategy::DefaultProxy)
    }
}
