//! Pipeline-level behaviour: determinism, degradation, cancellation, batch.

mod common;

use risk_core::config::EngineConfig;
use risk_core::market_data::{MarketDataView, ViewRequirements};
use risk_core::types::{Currency, Isin};
use risk_engine::engine::{CancelToken, RiskEngine, RunControl};
use risk_engine::snapshot::SnapshotStatus;

fn engine() -> RiskEngine {
    RiskEngine::new(EngineConfig::default()).unwrap()
}

// ========================================
// Determinism
// ========================================

#[test]
fn recomputation_is_bit_stable() {
    let inputs = common::base_inputs();
    let engine = engine();

    let first = engine.compute_snapshot(&inputs);
    let second = engine.compute_snapshot(&inputs);

    // The stored documents must be byte-equal.
    let a = serde_json::to_string(&first.snapshot).unwrap();
    let b = serde_json::to_string(&second.snapshot).unwrap();
    assert_eq!(a, b);
    assert_eq!(first.stress, second.stress);
    assert_eq!(first.alerts, second.alerts);
}

#[test]
fn parallelism_does_not_change_results() {
    let inputs = common::base_inputs();
    let serial = RiskEngine::new(EngineConfig {
        parallelism: 1,
        ..EngineConfig::default()
    })
    .unwrap()
    .compute_snapshot(&inputs);
    let parallel = RiskEngine::new(EngineConfig {
        parallelism: 4,
        ..EngineConfig::default()
    })
    .unwrap()
    .compute_snapshot(&inputs);

    assert_eq!(
        serde_json::to_string(&serial.snapshot).unwrap(),
        serde_json::to_string(&parallel.snapshot).unwrap()
    );
}

#[test]
fn snapshot_identity_fields() {
    let inputs = common::base_inputs();
    let computed = engine().compute_snapshot(&inputs);
    assert_eq!(computed.snapshot.portfolio_id, common::portfolio_id());
    assert_eq!(computed.snapshot.as_of_date, common::as_of());
    assert_eq!(computed.snapshot.engine_version, "1.4.0");
    assert_eq!(
        computed.snapshot.market_data_snapshot_id,
        inputs.market.content_hash()
    );
}

// ========================================
// Degradation and failure
// ========================================

#[test]
fn zero_price_downgrades_to_partial() {
    let mut inputs = common::base_inputs();
    if let Some(quote) = inputs.market.quotes.get_mut(&Isin::new("DE0001102345")) {
        quote.clean_price = Some(0.0);
    }
    let computed = engine().compute_snapshot(&inputs);

    assert_eq!(computed.snapshot.status, SnapshotStatus::Partial);
    // The bond never priced: no DV01, and the cause is recorded.
    let market = computed.snapshot.market.as_ref().unwrap();
    assert_eq!(market.dv01_total, 0.0);
    assert!(computed.snapshot.error_message.is_some());
    assert!(computed
        .dq_issues
        .iter()
        .any(|i| i.code.code() == "DQ-02"));
}

#[test]
fn missing_quote_excludes_position_not_run() {
    let mut inputs = common::base_inputs();
    inputs.market.quotes.clear();
    let computed = engine().compute_snapshot(&inputs);

    assert_eq!(computed.snapshot.status, SnapshotStatus::Partial);
    let message = computed.snapshot.error_message.unwrap();
    assert!(message.contains("missing quote"), "{message}");
}

#[test]
fn missing_base_curve_fails_snapshot() {
    let mut inputs = common::base_inputs();
    inputs.market.zero_curves.remove(&Currency::EUR);
    let computed = engine().compute_snapshot(&inputs);

    assert_eq!(computed.snapshot.status, SnapshotStatus::Failed);
    assert!(computed.snapshot.market.is_none());
    assert!(computed.snapshot.capital.is_none());
    assert!(computed.snapshot.error_message.is_some());
}

#[test]
fn empty_portfolio_yields_zero_metrics() {
    let mut inputs = common::base_inputs();
    inputs.positions.clear();
    let computed = engine().compute_snapshot(&inputs);

    let market = computed.snapshot.market.as_ref().unwrap();
    assert_eq!(market.dv01_total, 0.0);
    assert_eq!(market.duration, 0.0);
    let credit = computed.snapshot.credit.as_ref().unwrap();
    assert_eq!(credit.total_exposure, 0.0);
    assert_eq!(credit.expected_loss, 0.0);
    let ccr = computed.snapshot.ccr.as_ref().unwrap();
    assert_eq!(ccr.ead_total, 0.0);
}

#[test]
fn short_history_nulls_var_only() {
    let mut inputs = common::base_inputs();
    inputs.pnl_history.truncate(10);
    let computed = engine().compute_snapshot(&inputs);

    assert_eq!(computed.snapshot.status, SnapshotStatus::Partial);
    let market = computed.snapshot.market.as_ref().unwrap();
    assert!(market.var_1d_95.is_none());
    // Pricing still ran.
    assert!(market.dv01_total > 0.0);
    let message = computed.snapshot.error_message.unwrap();
    assert!(message.contains("insufficient history"), "{message}");
}

// ========================================
// Cancellation and deadline
// ========================================

#[test]
fn pre_cancelled_run_fails_with_cancelled() {
    let inputs = common::base_inputs();
    let token = CancelToken::new();
    token.cancel();
    let control = RunControl::new(token, 0);

    let computed = engine().compute_snapshot_with_control(&inputs, &control);
    assert_eq!(computed.snapshot.status, SnapshotStatus::Failed);
    assert_eq!(computed.snapshot.error_message.as_deref(), Some("cancelled"));
}

#[test]
fn expired_deadline_fails_with_deadline_exceeded() {
    let inputs = common::base_inputs();
    // A 1 ms budget elapses before the first checkpoint.
    let control = RunControl::new(CancelToken::new(), 1);
    std::thread::sleep(std::time::Duration::from_millis(10));

    let computed = engine().compute_snapshot_with_control(&inputs, &control);
    assert_eq!(computed.snapshot.status, SnapshotStatus::Failed);
    assert_eq!(
        computed.snapshot.error_message.as_deref(),
        Some("deadline exceeded")
    );
}

// ========================================
// Batch
// ========================================

#[test]
fn batch_matches_individual_runs() {
    let inputs = common::base_inputs();
    let batch = vec![inputs.clone(), inputs.clone(), inputs.clone()];
    let engine = engine();

    let individual = engine.compute_snapshot(&inputs);
    let results = engine.compute_batch(&batch);

    assert_eq!(results.len(), 3);
    for result in &results {
        assert_eq!(
            serde_json::to_string(&result.snapshot).unwrap(),
            serde_json::to_string(&individual.snapshot).unwrap()
        );
    }
}

// ========================================
// Public DQ entry point
// ========================================

#[test]
fn evaluate_dq_is_exposed_and_pure() {
    let inputs = common::base_inputs();
    let requirements = ViewRequirements {
        isins: vec![Isin::new("DE0001102345")],
        currencies: vec![Currency::EUR],
        ..Default::default()
    };
    let view = MarketDataView::build(&inputs.market, &requirements).unwrap();

    let engine = engine();
    let a = engine.evaluate_dq(&view, &inputs.positions, &inputs.issuers);
    let b = engine.evaluate_dq(&view, &inputs.positions, &inputs.issuers);
    assert_eq!(a, b);
    assert!(a.is_empty());
}
