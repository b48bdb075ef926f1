//! Mock converter for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{
    ConversionJob, ConversionResult, Converter, ConverterError, MediaInfo, TrimPlan,
};

/// A recorded conversion job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The job that was submitted.
    pub job: ConversionJob,
    /// The resolved cut, if planning succeeded.
    pub plan: Option<TrimPlan>,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Plans the cut exactly like the real converter (probing its configured
/// duration when needed) and writes a small output file, so the rest of the
/// pipeline sees a real artifact.
///
/// # Example
///
/// ```rust,ignore
/// use sheetcut_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.set_probe_duration(240.0).await;
///
/// let result = converter.convert(job).await?;
///
/// let conversions = converter.recorded_conversions().await;
/// assert_eq!(conversions[0].plan.as_ref().unwrap().effective_end, Some(240.0));
/// ```
#[derive(Debug, Clone)]
pub struct MockConverter {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// If set, the next conversion will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// Duration reported by `probe`.
    probe_duration: Arc<RwLock<f64>>,
    /// Number of probes performed.
    probes: Arc<RwLock<usize>>,
    /// Simulated conversion duration.
    conversion_duration: Arc<RwLock<Duration>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            probe_duration: Arc::new(RwLock::new(180.0)),
            probes: Arc::new(RwLock::new(0)),
            conversion_duration: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Get the number of probes performed.
    pub async fn probe_count(&self) -> usize {
        *self.probes.read().await
    }

    /// Set the source duration reported by `probe`.
    pub async fn set_probe_duration(&self, secs: f64) {
        *self.probe_duration.write().await = secs;
    }

    /// Configure the next conversion to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated conversion duration.
    pub async fn set_conversion_duration(&self, duration: Duration) {
        *self.conversion_duration.write().await = duration;
    }

    async fn record(&self, job: ConversionJob, plan: Option<TrimPlan>, success: bool) {
        self.conversions.write().await.push(RecordedConversion { job, plan, success });
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, ConverterError> {
        *self.probes.write().await += 1;
        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes: 4 * 1024 * 1024,
            duration_secs: *self.probe_duration.read().await,
            format: "webm".to_string(),
            audio_codec: Some("opus".to_string()),
        })
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        if !job.input_path.exists() {
            return Err(ConverterError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        let source_duration = if job.params.needs_probe() {
            Some(self.probe(&job.input_path).await?.duration_secs)
        } else {
            None
        };
        let plan = match TrimPlan::resolve(&job.params, source_duration) {
            Ok(plan) => plan,
            Err(e) => {
                self.record(job, None, false).await;
                return Err(e);
            }
        };

        let delay = *self.conversion_duration.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        // Output lands before the failure so cleanup is exercised
        tokio::fs::write(&job.output_path, b"mock audio").await?;

        if let Some(err) = self.next_error.write().await.take() {
            self.record(job, Some(plan), false).await;
            return Err(err);
        }

        self.record(job.clone(), Some(plan), true).await;
        Ok(ConversionResult {
            job_id: job.job_id,
            output_path: job.output_path,
            output_size_bytes: 10,
            duration_ms: delay.as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}
