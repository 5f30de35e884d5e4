//! scenario_cycle_panic_is_contained
//!
//! A cycle that panics does not take the scheduler down: later ticks still
//! start cycles and shutdown still reaches `Stopped`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pfx_config::OverlapPolicy;
use pfx_portfolio::{Account, ApiError, InstrumentMeta, PortfolioApi, PortfolioSnapshot};
use pfx_runtime::{Scheduler, SchedulerConfig, SchedulerState, ScrapeCycle};
use pfx_testkit::RecordingSink;

#[derive(Default)]
struct PanickingApi {
    calls: AtomicUsize,
}

#[async_trait]
impl PortfolioApi for PanickingApi {
    fn exchange(&self) -> &str {
        "tinkoff"
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("broken client");
    }

    async fn get_portfolio(&self, _: &str, _: &str) -> Result<PortfolioSnapshot, ApiError> {
        unreachable!()
    }

    async fn resolve_instrument(&self, _: &str) -> Result<InstrumentMeta, ApiError> {
        unreachable!()
    }
}

#[tokio::test]
async fn panicking_cycle_does_not_stop_ticking() {
    let api = Arc::new(PanickingApi::default());
    let sink = Arc::new(RecordingSink::new());
    let handle = Scheduler::new(
        ScrapeCycle::new(api.clone(), sink.clone()),
        SchedulerConfig {
            interval: Duration::from_millis(20),
            overlap: OverlapPolicy::Skip,
        },
    )
    .unwrap()
    .spawn();

    for _ in 0..200 {
        if api.calls.load(Ordering::SeqCst) >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let status = handle.status();
    handle.shutdown().await;

    assert!(api.calls.load(Ordering::SeqCst) >= 2, "ticks stopped after a panic");
    let st = status.read().await;
    assert_eq!(st.state, SchedulerState::Stopped);
    assert!(st.cycles_started >= 2);
    assert_eq!(st.cycles_finished, 0);
    assert_eq!(sink.update_count(), 0);
}
