//! Logging helpers for Vesper.
//!
//! All engine logging goes through `tracing` with per-subsystem targets
//! (`vesper_core::signal`, `vesper_menu::prioritized`, ...). Tests that want
//! visible output install a `tracing-subscriber` fmt subscriber themselves;
//! this module only adds the shared conveniences.

/// RAII guard that scopes a named operation for performance tracing.
///
/// The span stays active until the guard is dropped, so subscribers that
/// record span timings see the full duration of the operation.
///
/// # Example
///
/// ```
/// use vesper_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("flush_batch");
///     // ... the timed work ...
/// } // span closes here
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "vesper::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perf_span_guard_compiles_and_drops() {
        let _span = PerfSpan::new("test_operation");
    }
}
