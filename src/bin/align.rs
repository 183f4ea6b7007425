//! `align` - CLI entry point for the alignment pipeline

use std::process::ExitCode;

use clap::Parser;

use axis_align::config::AlignmentConfig;
use axis_align::error::AlignError;
use axis_align::geometry::distinct_sorted;
use axis_align::io::{JsonModelSink, JsonModelSource, ModelSink, ModelSource};
use axis_align::pipeline::{AlignmentPipeline, ReferenceInputs};

/// Snap a structural model's vertices onto discovered canonical axis lines
/// and apply the object-level normalization rules.
#[derive(Debug, Parser)]
#[command(name = "align", version, about)]
struct Cli {
    /// Path to the input model (JSON)
    #[arg(long = "input-model")]
    input_model: std::path::PathBuf,

    /// Path to the structural database enrichment (unused by the JSON source;
    /// kept for interface parity with the binary-format ingestor)
    #[arg(long = "input-db")]
    input_db: Option<std::path::PathBuf>,

    /// Path to write the aligned output (JSON)
    #[arg(long = "output")]
    output: std::path::PathBuf,

    /// Optional reference-aligned model for recall/comparison checks
    #[arg(long = "reference-model")]
    reference_model: Option<std::path::PathBuf>,

    #[arg(long = "max-snap-distance")]
    max_snap_distance: Option<f64>,

    #[arg(long = "outlier-snap-distance")]
    outlier_snap_distance: Option<f64>,

    #[arg(long = "min-floors")]
    min_floors: Option<usize>,

    #[arg(long = "rounding-precision")]
    rounding_precision: Option<f64>,

    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<(), AlignError> {
    let _ = &cli.input_db; // interface parity with the binary-format ingestor; unused by the JSON source

    let mut config = AlignmentConfig::default();
    if let Some(v) = cli.max_snap_distance {
        config = config.with_max_snap_distance(v);
    }
    if let Some(v) = cli.outlier_snap_distance {
        config = config.with_outlier_snap_distance(v);
    }
    if let Some(v) = cli.min_floors {
        config = config.with_min_floors(v);
    }
    if let Some(v) = cli.rounding_precision {
        config = config.with_rounding_precision(v);
    }

    let source = JsonModelSource::from_path(&cli.input_model)?;
    let elements = source.elements()?;

    let reference_source = cli
        .reference_model
        .as_ref()
        .map(JsonModelSource::from_path)
        .transpose()?;
    let reference_elements = reference_source.as_ref().map(|s| s.elements()).transpose()?;
    let reference_aligned: Option<Vec<_>> = reference_elements.as_ref().map(|elements| {
        elements
            .iter()
            .flat_map(|e| e.vertices.iter().copied().map(axis_align::model::AlignedVertex::unsnapped))
            .collect()
    });
    // A reference model is itself already aligned, so its distinct X/Y
    // coordinates stand in for the reference axis-line positions.
    let reference_x_positions: Option<Vec<f64>> = reference_aligned
        .as_ref()
        .map(|avs| distinct_sorted(avs.iter().map(|v| v.aligned_x), config.rounding_precision));
    let reference_y_positions: Option<Vec<f64>> = reference_aligned
        .as_ref()
        .map(|avs| distinct_sorted(avs.iter().map(|v| v.aligned_y), config.rounding_precision));

    let pipeline = AlignmentPipeline::new(config);
    let reference = ReferenceInputs {
        aligned: reference_aligned.as_deref(),
        elements: reference_elements.as_deref(),
        x_axis_positions: reference_x_positions.as_deref(),
        y_axis_positions: reference_y_positions.as_deref(),
    };
    let output = pipeline.run(&elements, reference)?;

    if let Some(reference_elements) = &reference_elements {
        log::info!(
            "reference model supplied ({} elements); compared against aligned output",
            reference_elements.len()
        );
    }

    let mut sink = JsonModelSink::to_path(&cli.output);
    sink.apply(&output.aligned, &output.edits)?;

    let report_path = cli.output.with_extension("report.json");
    let report_file = std::fs::File::create(&report_path)?;
    serde_json::to_writer_pretty(report_file, &output.report)?;

    log::info!(
        "alignment complete: {} X axes, {} Y axes, {} object edits",
        output.report.x_axis_count,
        output.report.y_axis_count,
        output.edits.len()
    );
    if output.report.low_alignment_warning {
        log::warn!(
            "aligned fraction {:.3} is below the 0.85 warning threshold",
            output.report.aligned_fraction
        );
    }
    if !output.report.missing_reference_positions.is_empty() {
        log::warn!(
            "{} reference axis position(s) not matched by any discovered line",
            output.report.missing_reference_positions.len()
        );
    }
    if !output.report.object_count_drift.is_empty() {
        log::warn!(
            "{} element kind(s) drifted more than 10% from the reference model's counts",
            output.report.object_count_drift.len()
        );
    }

    Ok(())
}
