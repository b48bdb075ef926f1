//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::error::ConverterError;

/// Requested trim and fade settings, all in seconds.
///
/// `end` is the nominal end of the cut, not counting the fade-out: a fade-out
/// extends the cut past `end` rather than eating into it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CutParams {
    /// Offset into the source where the cut starts.
    pub start: Option<f64>,
    /// Offset into the source where the cut ends. Zero means no end.
    pub end: Option<f64>,
    /// Fade-in length.
    pub fade_in: Option<f64>,
    /// Fade-out length.
    pub fade_out: Option<f64>,
}

impl CutParams {
    /// Whether the total source duration is needed to plan this cut.
    pub fn needs_probe(&self) -> bool {
        self.fade_out.is_some_and(|f| f > 0.0) && self.nominal_end().is_none()
    }

    /// The end offset, with a zero end treated as "to the end of the source".
    pub fn nominal_end(&self) -> Option<f64> {
        self.end.filter(|e| *e != 0.0)
    }
}

/// Direction of an audio fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeKind {
    In,
    Out,
}

/// One `afade` filter, positioned relative to the start of the cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeFilter {
    pub kind: FadeKind,
    pub start_time: f64,
    pub duration: f64,
}

impl fmt::Display for FadeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            FadeKind::In => "in",
            FadeKind::Out => "out",
        };
        write!(
            f,
            "afade=type={}:start_time={}:duration={}",
            kind, self.start_time, self.duration
        )
    }
}

/// Resolved cut: what ffmpeg is actually asked to do.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimPlan {
    /// Input seek (`-ss`), omitted when the cut starts at 0.
    pub seek: Option<f64>,
    /// Input duration (`-t`), omitted when the cut runs to the end.
    pub duration: Option<f64>,
    /// End offset the cut resolves to, after adding the fade-out and, when
    /// needed, falling back to the probed source duration.
    pub effective_end: Option<f64>,
    pub fade_in: Option<FadeFilter>,
    pub fade_out: Option<FadeFilter>,
}

impl TrimPlan {
    /// Resolves cut parameters against the (optional) probed source duration.
    ///
    /// - `end` and `fade_out` both set: the cut ends at `end + fade_out`
    /// - `fade_out` without `end`: the cut ends at `source_duration`, which
    ///   must then be known
    /// - missing `start` counts as 0
    pub fn resolve(params: &CutParams, source_duration: Option<f64>) -> Result<Self, ConverterError> {
        let fade_in = params.fade_in.filter(|d| *d > 0.0);
        let fade_out = params.fade_out.filter(|d| *d > 0.0);
        let start = params.start.unwrap_or(0.0);

        if start < 0.0 {
            return Err(ConverterError::invalid_cut(format!("negative start {}", start)));
        }

        let end = match (params.nominal_end(), fade_out) {
            (Some(end), Some(fade)) => Some(end + fade),
            (end, _) => end,
        };

        let duration = match end {
            Some(end) if end <= start => {
                return Err(ConverterError::invalid_cut(format!(
                    "end {} is not after start {}",
                    end, start
                )));
            }
            Some(end) => Some(end - start),
            None => None,
        };

        let mut effective_end = end;
        let fade_out = match fade_out {
            Some(fade) => {
                let total_end = match end.or(source_duration) {
                    Some(e) => e,
                    None => {
                        return Err(ConverterError::invalid_cut(
                            "fade-out requested but the source duration is unknown",
                        ))
                    }
                };
                effective_end = Some(total_end);
                let length = total_end - start;
                if length <= 0.0 {
                    return Err(ConverterError::invalid_cut(format!(
                        "source ends at {} before start {}",
                        total_end, start
                    )));
                }
                Some(FadeFilter {
                    kind: FadeKind::Out,
                    start_time: (length - fade).max(0.0),
                    duration: fade,
                })
            }
            None => None,
        };

        Ok(Self {
            seek: params.start.filter(|s| *s > 0.0),
            duration,
            effective_end,
            fade_in: fade_in.map(|d| FadeFilter {
                kind: FadeKind::In,
                start_time: 0.0,
                duration: d,
            }),
            fade_out,
        })
    }

    /// Input-side ffmpeg arguments (`-ss`/`-t`).
    pub fn input_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(seek) = self.seek {
            args.extend(["-ss".to_string(), seek.to_string()]);
        }
        if let Some(duration) = self.duration {
            args.extend(["-t".to_string(), duration.to_string()]);
        }
        args
    }

    /// The comma-joined filter chain, if any fade is requested.
    pub fn filter_chain(&self) -> Option<String> {
        let filters: Vec<String> = [self.fade_in, self.fade_out]
            .iter()
            .flatten()
            .map(ToString::to_string)
            .collect();
        if filters.is_empty() {
            None
        } else {
            Some(filters.join(","))
        }
    }
}

/// Metadata to embed in the output file. Empty fields are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedMetadata {
    pub title: String,
    pub artist: String,
    pub genre: String,
}

impl EmbeddedMetadata {
    /// Converts to ffmpeg `-metadata` arguments.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        [
            ("title", &self.title),
            ("artist", &self.artist),
            ("genre", &self.genre),
        ]
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .flat_map(|(key, value)| ["-metadata".to_string(), format!("{}={}", key, value)])
        .collect()
    }
}

/// A conversion job.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    /// Identifier used in logs.
    pub job_id: String,
    /// Source file.
    pub input_path: PathBuf,
    /// Destination file (extension decides the container).
    pub output_path: PathBuf,
    /// Trim and fade settings.
    pub params: CutParams,
    /// Metadata to embed.
    pub metadata: EmbeddedMetadata,
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub job_id: String,
    pub output_path: PathBuf,
    pub output_size_bytes: u64,
    /// Wall-clock time spent converting.
    pub duration_ms: u64,
}

/// Information about a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_secs: f64,
    /// Container format name as reported by ffprobe.
    pub format: String,
    pub audio_codec: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(start: Option<f64>, end: Option<f64>, fade_in: Option<f64>, fade_out: Option<f64>) -> CutParams {
        CutParams {
            start,
            end,
            fade_in,
            fade_out,
        }
    }

    #[test]
    fn test_fade_out_extends_end() {
        let plan = TrimPlan::resolve(&params(None, Some(60.0), None, Some(5.0)), None).unwrap();
        assert_eq!(plan.effective_end, Some(65.0));
        assert_eq!(plan.duration, Some(65.0));
        let fade = plan.fade_out.unwrap();
        assert_eq!(fade.start_time, 60.0);
        assert_eq!(fade.duration, 5.0);
    }

    #[test]
    fn test_fade_out_without_end_uses_probed_duration() {
        let p = params(Some(10.0), None, None, Some(5.0));
        assert!(p.needs_probe());

        let plan = TrimPlan::resolve(&p, Some(200.0)).unwrap();
        assert_eq!(plan.effective_end, Some(200.0));
        assert_eq!(plan.seek, Some(10.0));
        assert_eq!(plan.duration, None);
        assert_eq!(plan.fade_out.unwrap().start_time, 185.0);
    }

    #[test]
    fn test_fade_out_without_any_end_fails() {
        let err = TrimPlan::resolve(&params(None, None, None, Some(5.0)), None).unwrap_err();
        assert!(matches!(err, ConverterError::InvalidCut { .. }));
    }

    #[test]
    fn test_start_and_end_only() {
        let p = params(Some(30.0), Some(90.0), None, None);
        assert!(!p.needs_probe());

        let plan = TrimPlan::resolve(&p, None).unwrap();
        assert_eq!(plan.input_args(), vec!["-ss", "30", "-t", "60"]);
        assert_eq!(plan.filter_chain(), None);
    }

    #[test]
    fn test_fades_build_filter_chain() {
        let plan = TrimPlan::resolve(&params(Some(10.0), Some(70.0), Some(2.0), Some(4.0)), None).unwrap();
        assert_eq!(
            plan.filter_chain().unwrap(),
            "afade=type=in:start_time=0:duration=2,afade=type=out:start_time=60:duration=4"
        );
    }

    #[test]
    fn test_end_before_start_fails() {
        let err = TrimPlan::resolve(&params(Some(50.0), Some(20.0), None, None), None).unwrap_err();
        assert!(matches!(err, ConverterError::InvalidCut { .. }));
    }

    #[test]
    fn test_zero_start_is_not_a_seek() {
        let plan = TrimPlan::resolve(&params(Some(0.0), Some(20.0), None, None), None).unwrap();
        assert_eq!(plan.input_args(), vec!["-t", "20"]);
    }

    #[test]
    fn test_zero_end_means_no_end() {
        let p = params(None, Some(0.0), None, None);
        assert!(!p.needs_probe());
        let plan = TrimPlan::resolve(&p, None).unwrap();
        assert_eq!(plan.duration, None);
        assert!(plan.input_args().is_empty());

        let p = params(Some(30.0), Some(0.0), None, Some(5.0));
        assert!(p.needs_probe());
        let plan = TrimPlan::resolve(&p, Some(200.0)).unwrap();
        assert_eq!(plan.effective_end, Some(200.0));
        assert_eq!(plan.fade_out.unwrap().start_time, 165.0);
    }

    #[test]
    fn test_negative_end_is_rejected() {
        let err = TrimPlan::resolve(&params(None, Some(-5.0), None, None), None).unwrap_err();
        assert!(matches!(err, ConverterError::InvalidCut { .. }));
    }

    #[test]
    fn test_metadata_skips_empty_fields() {
        let metadata = EmbeddedMetadata {
            title: "Song".to_string(),
            artist: String::new(),
            genre: "Rock".to_string(),
        };
        assert_eq!(
            metadata.to_ffmpeg_args(),
            vec!["-metadata", "title=Song", "-metadata", "genre=Rock"]
        );
        assert!(EmbeddedMetadata::default().to_ffmpeg_args().is_empty());
    }
}
