//! Behaviour and property tests spanning the core pipeline stages.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected pipeline outcomes"
)]

mod flatten_steps;
