//! Integration-test host crate. The suite lives under `tests/`.
