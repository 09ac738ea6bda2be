//! Test-only crate. The integration tests live under `tests/`.
