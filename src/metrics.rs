//! Request and provider-call metrics.
//!
//! The relay only sees the [`CallRecorder`] trait; [`Metrics`] is the
//! Prometheus-backed implementation the server wires in, and it also tracks
//! plain HTTP request counts and latencies for the router middleware.

use std::time::Duration;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};

use crate::llm::ProviderKind;

/// How a provider call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    Failure,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::Failure => "failure",
        }
    }
}

/// Receives one `call_started` and one `call_finished` per provider call.
pub trait CallRecorder: Send + Sync {
    fn call_started(&self, provider: ProviderKind);
    fn call_finished(&self, provider: ProviderKind, outcome: CallOutcome, elapsed: Duration);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl CallRecorder for NoopRecorder {
    fn call_started(&self, _provider: ProviderKind) {}
    fn call_finished(&self, _provider: ProviderKind, _outcome: CallOutcome, _elapsed: Duration) {}
}

/// Prometheus metric families, kept in a private registry.
pub struct Metrics {
    registry: Registry,
    http_requests: IntCounterVec,
    http_latency: HistogramVec,
    provider_calls: IntCounterVec,
    provider_in_flight: IntGaugeVec,
    provider_latency: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests"),
            &["method", "endpoint", "status"],
        )?;
        let http_latency = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request latency"),
            &["method", "endpoint"],
        )?;
        let provider_calls = IntCounterVec::new(
            Opts::new("provider_calls_total", "Completed LLM provider calls"),
            &["provider", "outcome"],
        )?;
        let provider_in_flight = IntGaugeVec::new(
            Opts::new("provider_calls_in_flight", "LLM provider calls currently running"),
            &["provider"],
        )?;
        // Model calls routinely take tens of seconds.
        let provider_latency = HistogramVec::new(
            HistogramOpts::new("provider_call_duration_seconds", "LLM provider call duration")
                .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
            &["provider"],
        )?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(http_latency.clone()))?;
        registry.register(Box::new(provider_calls.clone()))?;
        registry.register(Box::new(provider_in_flight.clone()))?;
        registry.register(Box::new(provider_latency.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            http_latency,
            provider_calls,
            provider_in_flight,
            provider_latency,
        })
    }

    pub fn observe_request(&self, method: &str, endpoint: &str, status: u16, elapsed: Duration) {
        self.http_requests
            .with_label_values(&[method, endpoint, &status.to_string()])
            .inc();
        self.http_latency
            .with_label_values(&[method, endpoint])
            .observe(elapsed.as_secs_f64());
    }

    /// Completed calls for `provider` with `outcome` so far.
    pub fn provider_calls(&self, provider: ProviderKind, outcome: CallOutcome) -> u64 {
        self.provider_calls
            .with_label_values(&[provider.label(), outcome.as_str()])
            .get()
    }

    /// Render every family in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl CallRecorder for Metrics {
    fn call_started(&self, provider: ProviderKind) {
        self.provider_in_flight
            .with_label_values(&[provider.label()])
            .inc();
    }

    fn call_finished(&self, provider: ProviderKind, outcome: CallOutcome, elapsed: Duration) {
        self.provider_in_flight
            .with_label_values(&[provider.label()])
            .dec();
        self.provider_calls
            .with_label_values(&[provider.label(), outcome.as_str()])
            .inc();
        self.provider_latency
            .with_label_values(&[provider.label()])
            .observe(elapsed.as_secs_f64());
    }
}
