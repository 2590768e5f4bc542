//! Statistical calibration of the backtesting pipeline on synthetic P&L.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use risk_core::types::{Date, PortfolioId};
use risk_engine::backtesting::{evaluate, kupiec_p_value, BacktestingRecord};

fn date(offset: i64) -> Date {
    let base = Date::from_ymd(2020, 1, 1).unwrap().into_inner();
    Date::parse(&(base + chrono::Duration::days(offset)).format("%Y-%m-%d").to_string()).unwrap()
}

/// On i.i.d. normal P&L with a correctly sized 95% VaR, the exception rate
/// converges to 5%. Seeded run, tolerance three standard errors.
#[test]
fn exception_rate_converges_to_coverage() {
    let portfolio = PortfolioId::new("PF-SYN");
    let sigma = 1_000.0;
    // True 95% quantile of N(0, sigma).
    let var_forecast = 1.644_853_626_951 * sigma;

    let mut rng = StdRng::seed_from_u64(20_260_302);
    let normal = Normal::new(0.0, sigma).unwrap();

    let n = 5_000;
    let records: Vec<BacktestingRecord> = (0..n)
        .map(|i| {
            BacktestingRecord::pair(portfolio.clone(), date(i), var_forecast, normal.sample(&mut rng))
        })
        .collect();

    let exceptions = records.iter().filter(|r| r.is_exception).count();
    let rate = exceptions as f64 / n as f64;

    // Standard error of the rate: sqrt(0.05 * 0.95 / 5000) ≈ 0.0031.
    assert!(
        (rate - 0.05).abs() < 0.01,
        "exception rate {rate} outside tolerance"
    );
}

/// A grossly undersized VaR produces an exception rate far above coverage
/// and a vanishing Kupiec p-value.
#[test]
fn undersized_var_is_rejected() {
    let portfolio = PortfolioId::new("PF-SYN");
    let sigma = 1_000.0;
    let undersized = 0.5 * sigma;

    let mut rng = StdRng::seed_from_u64(7);
    let normal = Normal::new(0.0, sigma).unwrap();

    let records: Vec<BacktestingRecord> = (0..250)
        .map(|i| {
            BacktestingRecord::pair(portfolio.clone(), date(i), undersized, normal.sample(&mut rng))
        })
        .collect();

    let result = evaluate(&records, &portfolio, 0.95);
    assert!(result.exception_rate > 0.15);
    let p = kupiec_p_value(result.observations, result.exceptions, 0.95).unwrap();
    assert!(p < 1e-6, "p-value {p}");
}
