use metrics::Counter;
use metrics_derive::Metrics;

/// Metrics for a [`RelayPipeline`](crate::relay::RelayPipeline).
#[derive(Metrics)]
#[metrics(scope = "relay")]
pub struct RelayMetrics {
    /// Number of envelopes prepared.
    pub prepared: Counter,
    /// Number of envelopes bundling an account deployment.
    pub deployments_bundled: Counter,
    /// Number of fee quotes requested.
    pub fee_quotes: Counter,
    /// Number of submitted envelopes.
    pub submitted: Counter,
    /// Number of failed submissions.
    pub failed_submissions: Counter,
}
