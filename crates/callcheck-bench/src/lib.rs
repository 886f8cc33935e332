//! Benchmark-only crate. The measurements live under `benches/`.
