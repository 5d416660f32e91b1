use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::{error, info, instrument};

use crate::hdr_pipeline::camera::{
    CaptureConfig, ColorConverter, ExposureSequencer, SensorDevice,
};
use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::frame::{Bracket, FrameStore, RgbImage};
use crate::hdr_pipeline::fusion::{ExposureFusionBlender, FusionConfig};
use crate::hdr_pipeline::io::ImageWriter;
use crate::hdr_pipeline::radiance::{RadianceRecoverer, RecoveryConfig};
use crate::hdr_pipeline::tonemap::{DragoToneMapper, TonemapConfig};

/// Configuration for a full capture-and-reconstruct run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Exposure times to bracket, in microseconds.
    pub exposures_us: Vec<f64>,
    /// Directory receiving captures and reconstruction outputs.
    pub output_dir: PathBuf,
    /// Discard one settle frame after each exposure change.
    pub settle_discard: bool,
    /// Per-frame acquisition timeout; `None` blocks until a frame arrives.
    pub frame_timeout: Option<Duration>,
    pub recovery: RecoveryConfig,
    pub tonemap: TonemapConfig,
    pub fusion: FusionConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            exposures_us: Vec::new(),
            output_dir: PathBuf::from("output_images"),
            settle_discard: true,
            frame_timeout: None,
            recovery: RecoveryConfig::default(),
            tonemap: TonemapConfig::default(),
            fusion: FusionConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }
}

/// Builder for RunConfig
#[derive(Default)]
pub struct RunConfigBuilder {
    exposures_us: Option<Vec<f64>>,
    output_dir: Option<PathBuf>,
    settle_discard: Option<bool>,
    frame_timeout: Option<Option<Duration>>,
    recovery: Option<RecoveryConfig>,
    tonemap: Option<TonemapConfig>,
    fusion: Option<FusionConfig>,
}

impl RunConfigBuilder {
    pub fn exposures_us(mut self, exposures_us: Vec<f64>) -> Self {
        self.exposures_us = Some(exposures_us);
        self
    }

    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn settle_discard(mut self, settle_discard: bool) -> Self {
        self.settle_discard = Some(settle_discard);
        self
    }

    pub fn frame_timeout(mut self, frame_timeout: Option<Duration>) -> Self {
        self.frame_timeout = Some(frame_timeout);
        self
    }

    pub fn recovery(mut self, recovery: RecoveryConfig) -> Self {
        self.recovery = Some(recovery);
        self
    }

    pub fn tonemap(mut self, tonemap: TonemapConfig) -> Self {
        self.tonemap = Some(tonemap);
        self
    }

    pub fn fusion(mut self, fusion: FusionConfig) -> Self {
        self.fusion = Some(fusion);
        self
    }

    pub fn build(self) -> RunConfig {
        let default = RunConfig::default();
        RunConfig {
            exposures_us: self.exposures_us.unwrap_or(default.exposures_us),
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            settle_discard: self.settle_discard.unwrap_or(default.settle_discard),
            frame_timeout: self.frame_timeout.unwrap_or(default.frame_timeout),
            recovery: self.recovery.unwrap_or(default.recovery),
            tonemap: self.tonemap.unwrap_or(default.tonemap),
            fusion: self.fusion.unwrap_or(default.fusion),
        }
    }
}

/// Outcome of a run: what was captured and which outputs were written.
#[derive(Debug)]
pub struct RunSummary {
    pub captured: usize,
    pub capture_paths: Vec<PathBuf>,
    pub hdr_output: Option<PathBuf>,
    pub fusion_output: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Runs the two reconstruction paths over a bracket and writes their
/// outputs. Failure in one path is logged and does not prevent the other.
pub struct HdrReconstructor<W: ImageWriter> {
    writer: W,
    recovery: RecoveryConfig,
    tonemap: TonemapConfig,
    fusion: FusionConfig,
}

impl<W: ImageWriter> HdrReconstructor<W> {
    pub fn new(
        writer: W,
        recovery: RecoveryConfig,
        tonemap: TonemapConfig,
        fusion: FusionConfig,
    ) -> Self {
        Self {
            writer,
            recovery,
            tonemap,
            fusion,
        }
    }

    pub fn from_config(writer: W, config: &RunConfig) -> Self {
        Self::new(
            writer,
            config.recovery.clone(),
            config.tonemap.clone(),
            config.fusion.clone(),
        )
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Run recovery+tonemap and fusion independently over `bracket`,
    /// writing whichever outputs succeed into `output_dir`.
    pub fn reconstruct(
        &self,
        bracket: &Bracket,
        output_dir: &Path,
        timestamp: u64,
    ) -> (Option<PathBuf>, Option<PathBuf>) {
        let hdr_output = self.run_path(
            "radiance recovery",
            || self.recover_and_tonemap(bracket),
            output_dir,
            &format!("hdr_image_{}", timestamp),
        );
        let fusion_output = self.run_path(
            "exposure fusion",
            || ExposureFusionBlender::new(self.fusion.clone()).blend(bracket),
            output_dir,
            &format!("fusion_image_{}", timestamp),
        );
        (hdr_output, fusion_output)
    }

    /// Rebuild a bracket from persisted captures and reconstruct in place,
    /// with no device attached.
    #[instrument(skip(self, dir))]
    pub fn reconstruct_from_dir<P: AsRef<Path>>(&self, dir: P) -> Result<RunSummary> {
        let started = Instant::now();
        let dir = dir.as_ref();

        let bracket = FrameStore::load(dir)?;
        let (hdr_output, fusion_output) = self.reconstruct(&bracket, dir, unix_timestamp());

        Ok(RunSummary {
            captured: bracket.len(),
            capture_paths: Vec::new(),
            hdr_output,
            fusion_output,
            elapsed: started.elapsed(),
        })
    }

    fn recover_and_tonemap(&self, bracket: &Bracket) -> Result<RgbImage> {
        let map = RadianceRecoverer::new(self.recovery.clone()).recover(bracket)?;
        DragoToneMapper::new(self.tonemap.clone()).tonemap(&map)
    }

    fn run_path<F>(
        &self,
        label: &str,
        produce: F,
        output_dir: &Path,
        stem: &str,
    ) -> Option<PathBuf>
    where
        F: FnOnce() -> Result<RgbImage>,
    {
        let image = match produce() {
            Ok(image) => image,
            Err(e) => {
                error!("{} path failed: {}", label, e);
                return None;
            }
        };

        let path = output_dir.join(format!("{}.{}", stem, self.writer.extension()));
        match self.writer.write_image(&image, &path) {
            Ok(()) => {
                info!("{} image saved to: {}", label, path.display());
                Some(path)
            }
            Err(e) => {
                error!("Failed to write {} image: {}", label, e);
                None
            }
        }
    }
}

/// Capture a bracket from the device, persist each exposure, then hand the
/// bracket to both reconstruction paths.
pub struct HdrPipeline<D: SensorDevice, C: ColorConverter, W: ImageWriter> {
    sequencer: ExposureSequencer<D, C>,
    reconstructor: HdrReconstructor<W>,
    output_dir: PathBuf,
}

impl<D: SensorDevice, C: ColorConverter, W: ImageWriter> HdrPipeline<D, C, W> {
    pub fn new(device: D, converter: C, writer: W, config: RunConfig) -> Self {
        let capture = CaptureConfig::builder()
            .exposures_us(config.exposures_us.clone())
            .settle_discard(config.settle_discard)
            .frame_timeout(config.frame_timeout)
            .build();

        Self {
            sequencer: ExposureSequencer::new(device, converter, capture),
            reconstructor: HdrReconstructor::from_config(writer, &config),
            output_dir: config.output_dir,
        }
    }

    #[instrument(skip(self))]
    pub fn run(&mut self) -> Result<RunSummary> {
        let started = Instant::now();
        std::fs::create_dir_all(&self.output_dir)?;
        let timestamp = unix_timestamp();

        let frames = self.sequencer.capture_bracket()?;

        let mut store = FrameStore::new();
        let mut capture_paths = Vec::new();
        for frame in frames {
            let filename = format!(
                "image_{}_{}_{}.{}",
                timestamp,
                frame.index(),
                frame.exposure().micros() as u64,
                self.reconstructor.writer().extension()
            );
            let path = self.output_dir.join(filename);
            self.reconstructor.writer().write_image(frame.image(), &path)?;
            info!("Saved image: {}", path.display());
            capture_paths.push(path);
            store.store(frame);
        }

        let captured = store.len();
        let bracket = store.into_bracket()?;
        let (hdr_output, fusion_output) =
            self.reconstructor
                .reconstruct(&bracket, &self.output_dir, timestamp);

        let elapsed = started.elapsed();
        info!("Run complete in {:.2} s", elapsed.as_secs_f64());
        Ok(RunSummary {
            captured,
            capture_paths,
            hdr_output,
            fusion_output,
            elapsed,
        })
    }

    /// Release the device handle once the run is over.
    pub fn close(self) -> Result<()> {
        self.sequencer.close()
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
