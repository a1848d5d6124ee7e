//! Progress reporting at the stage boundaries of the codec.
//!
//! The pipeline calls [`Progress::report`] as it enters each stage and only continues once the
//! call returns, so a caller can redraw a progress bar between stages.

/// Kind of a progress message.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Error,
    Success,
}

/// Receiver of progress updates.
pub trait Progress {
    /// `percent` is in `0..=100`.
    fn report(&mut self, percent: u8, message: &str, severity: Severity);
}

impl<F> Progress for F
where
    F: FnMut(u8, &str, Severity),
{
    fn report(&mut self, percent: u8, message: &str, severity: Severity) {
        self(percent, message, severity)
    }
}

/// Discards all updates.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _percent: u8, _message: &str, _severity: Severity) {}
}

/// Milestones of embedding and extraction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Initializing,
    // Embedding.
    MakingWatermarks,
    CarrierSpectrum,
    WatermarkSpectrum,
    EncodedSpectrum,
    EncodedImage,
    // Extraction.
    ExtractCarrierSpectrum,
    Scaling,
    ExtractEncodedSpectrum,
    ExtractWatermarkSpectrum,
    WatermarkImage,
    ResultImage,
    Finished,
}

impl Stage {
    pub fn percent(&self) -> u8 {
        match self {
            Stage::Initializing => 0,
            Stage::MakingWatermarks => 5,
            Stage::CarrierSpectrum => 20,
            Stage::WatermarkSpectrum => 40,
            Stage::EncodedSpectrum => 60,
            Stage::EncodedImage => 80,
            Stage::ExtractCarrierSpectrum => 5,
            Stage::Scaling => 20,
            Stage::ExtractEncodedSpectrum => 30,
            Stage::ExtractWatermarkSpectrum => 45,
            Stage::WatermarkImage => 60,
            Stage::ResultImage => 80,
            Stage::Finished => 100,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Stage::Initializing => "Initializing",
            Stage::MakingWatermarks => "Making watermarks",
            Stage::CarrierSpectrum | Stage::ExtractCarrierSpectrum => {
                "Calculating the frequency domain of original image"
            }
            Stage::WatermarkSpectrum | Stage::ExtractWatermarkSpectrum => {
                "Calculating the frequency domain of watermarks"
            }
            Stage::EncodedSpectrum | Stage::ExtractEncodedSpectrum => {
                "Calculating the frequency domain of encoded image"
            }
            Stage::Scaling => "Scaling the encoded image",
            Stage::WatermarkImage => "Calculating the watermarks image",
            Stage::EncodedImage | Stage::ResultImage => "Calculating the resulting image",
            Stage::Finished => "Finished!",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Stage::Finished => Severity::Success,
            _ => Severity::Info,
        }
    }
}

/// Wraps a [`Progress`], remembering the last stage so failures can be reported against it.
pub(crate) struct Reporter<'a> {
    sink: &'a mut dyn Progress,
    percent: u8,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(sink: &'a mut dyn Progress) -> Self {
        Reporter { sink, percent: 0 }
    }

    pub(crate) fn stage(&mut self, stage: Stage) {
        tracing::debug!(percent = stage.percent(), "{}", stage.message());
        self.percent = stage.percent();
        self.sink
            .report(stage.percent(), stage.message(), stage.severity());
    }

    pub(crate) fn fail(&mut self, error: &crate::AirglowError) {
        tracing::warn!(percent = self.percent, %error, "aborted");
        self.sink
            .report(self.percent, &error.to_string(), Severity::Error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_progress() {
        let mut seen = vec![];
        {
            let mut sink = |p: u8, m: &str, s: Severity| seen.push((p, m.to_owned(), s));
            let mut reporter = Reporter::new(&mut sink);
            reporter.stage(Stage::Initializing);
            reporter.stage(Stage::Scaling);
            reporter.fail(&crate::AirglowError::EmptyKey);
        }
        assert_eq!(
            seen,
            vec![
                (0, "Initializing".to_owned(), Severity::Info),
                (20, "Scaling the encoded image".to_owned(), Severity::Info),
                (20, "secret key cannot be empty".to_owned(), Severity::Error),
            ]
        );
    }

    #[test]
    fn test_finished_is_success() {
        assert_eq!(Stage::Finished.percent(), 100);
        assert_eq!(Stage::Finished.message(), "Finished!");
        assert_eq!(Stage::Finished.severity(), Severity::Success);
        assert_eq!(Stage::EncodedImage.severity(), Severity::Info);
    }
}
