use bracket_hdr_rs::hdr_pipeline::{HdrReconstructor, PngImageWriter, RunConfig};
use bracket_hdr_rs::logger;

use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting bracket_hdr...");

    let config = RunConfig::builder()
        .exposures_us(vec![10_000.0, 40_000.0, 160_000.0, 640_000.0, 1_000_000.0])
        .output_dir("output_images")
        .build();

    // Reconstruction-only run over previously captured frames. Capturing a
    // fresh bracket means implementing SensorDevice for the camera SDK and
    // driving HdrPipeline::run with it.
    let reconstructor = HdrReconstructor::from_config(PngImageWriter, &config);

    info!("HDR reconstruction pipeline initialized");
    info!("Exposure bracket: {:?} us", config.exposures_us);
    info!("Output directory: {}", config.output_dir.display());

    match reconstructor.reconstruct_from_dir(&config.output_dir) {
        Ok(summary) => info!(
            "Reconstruction successful: {} frame(s) in {:.2} s",
            summary.captured,
            summary.elapsed.as_secs_f64()
        ),
        Err(e) => error!("Reconstruction failed: {}", e),
    }

    Ok(())
}
