/// Sink for diagnostic events emitted by loaders and models.
pub trait DiagnosticLog: Send + Sync {
    fn log(&self, event: &str, details: &[(&str, String)]);
}
