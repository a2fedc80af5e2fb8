//! Shared utilities for integration tests.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::{net::SocketAddr, time::Duration};

use betwire::client::{BackoffConfig, ClientConfig, PollPolicy, RetryPolicy};
use proptest::test_runner::{Config as ProptestConfig, RngAlgorithm, TestRng, TestRunner};

pub fn deterministic_runner(cases: u32) -> TestRunner {
    let config = ProptestConfig {
        cases,
        ..ProptestConfig::default()
    };
    let rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
    TestRunner::new_with_rng(config, rng)
}

/// Client configuration with short deadlines so failure paths finish quickly.
pub fn fast_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new("1", addr.to_string())
        .retry_policy(RetryPolicy {
            max_attempts: 3,
            attempt_timeout: Duration::from_millis(500),
            backoff: BackoffConfig {
                initial_delay: Duration::from_millis(5),
                max_delay: Duration::from_millis(20),
            },
        })
        .poll_policy(PollPolicy {
            max_polls: 5,
            interval: Duration::from_millis(10),
            read_timeout: Duration::from_millis(300),
        })
}

/// Wait until `condition` holds, giving background server tasks time to run.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
