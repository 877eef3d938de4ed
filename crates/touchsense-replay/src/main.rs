//! touchsense-replay: run a recorded contact script through the gesture
//! classifier and print what it recognizes.

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use touchsense_core::{
    default_config_path, kinds, load_yaml, ClassifierConfig, ContactScript, GestureKind,
    GestureRecord, Replayer,
};
use touchsense_platform::VirtualSurface;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One aligned line per gesture.
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "touchsense-replay", version, about)]
struct Args {
    /// Contact script (YAML).
    script: PathBuf,

    /// YAML list of expected gesture kinds. Exit status 1 on mismatch.
    #[arg(long)]
    expect: Option<PathBuf>,

    /// Timing overrides. Defaults to the user config file if present.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Gesture kinds whose handlers request a haptic pulse.
    #[arg(long, value_delimiter = ',', value_parser = parse_kind)]
    vibrate: Vec<GestureKind>,

    /// Also write logs to a daily-rotating file in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Debug-level console logging (unless RUST_LOG is set).
    #[arg(short, long)]
    verbose: bool,
}

fn parse_kind(name: &str) -> Result<GestureKind, String> {
    GestureKind::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = GestureKind::ALL.iter().map(|k| k.as_str()).collect();
        format!(
            "unknown gesture kind '{}', expected one of: {}",
            name,
            known.join(", ")
        )
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::setup(args.verbose, args.log_dir.as_deref());

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("replay failed: {:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns false when `--expect` was given and did not match.
fn run(args: &Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => ClassifierConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ClassifierConfig::load_or_default(default_config_path()),
    };

    let (records, surface) = replay_file(&args.script, config, &args.vibrate)?;
    print!("{}", render(&records, args.format)?);

    let pulses = surface.pulses().len();
    if pulses > 0 {
        info!(pulses, "haptic pulses requested");
    }

    match &args.expect {
        Some(path) => {
            let expected = load_expected(path)?;
            match mismatch(&expected, &kinds(&records)) {
                Some(report) => {
                    eprintln!("{}", report);
                    Ok(false)
                }
                None => Ok(true),
            }
        }
        None => Ok(true),
    }
}

fn replay_file(
    path: &Path,
    config: ClassifierConfig,
    vibrate_on: &[GestureKind],
) -> Result<(Vec<GestureRecord>, Arc<VirtualSurface>)> {
    let script: ContactScript =
        load_yaml(path).with_context(|| format!("loading script {}", path.display()))?;

    let label = script
        .name
        .clone()
        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "script".into());
    let surface = Arc::new(VirtualSurface::new(label));

    let mut replayer = Replayer::bind(surface.clone(), config, vibrate_on)?;
    let records = replayer
        .run(&script)
        .with_context(|| format!("replaying {}", path.display()))?;
    Ok((records, surface))
}

fn load_expected(path: &Path) -> Result<Vec<GestureKind>> {
    load_yaml(path).with_context(|| format!("loading expectations {}", path.display()))
}

fn render(records: &[GestureRecord], format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    for record in records {
        let line = match format {
            OutputFormat::Text => format!(
                "{:>8} ms  {:<10}  ({}, {})",
                record.at_ms,
                record.kind.as_str(),
                record.event.x,
                record.event.y
            ),
            OutputFormat::Json => serde_json::to_string(record)?,
        };
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Human readable report, or `None` when the sequences agree.
fn mismatch(expected: &[GestureKind], actual: &[GestureKind]) -> Option<String> {
    if expected == actual {
        return None;
    }
    let join = |kinds: &[GestureKind]| {
        kinds
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let at = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected.len().min(actual.len()));
    Some(format!(
        "gesture mismatch at position {}\n  expected: [{}]\n  actual:   [{}]",
        at,
        join(expected),
        join(actual)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use touchsense_core::Surface;
    use GestureKind::*;

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const DOUBLE_TAP: &str = r#"
name: double-tap
steps:
  - { at_ms: 0, phase: start, x: 5, y: 5 }
  - { at_ms: 90, phase: end, x: 5, y: 5 }
  - { at_ms: 200, phase: start, x: 6, y: 5 }
  - { at_ms: 260, phase: end, x: 6, y: 5 }
"#;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("long_touch"), Ok(LongTouch));
        assert!(parse_kind("pinch").unwrap_err().contains("drag_start"));
    }

    #[test]
    fn test_cli_arguments() {
        let args = Args::try_parse_from([
            "touchsense-replay",
            "script.yaml",
            "--format",
            "json",
            "--vibrate",
            "tap,long_touch",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.vibrate, vec![Tap, LongTouch]);
        assert!(args.expect.is_none());

        let bad = Args::try_parse_from(["touchsense-replay", "s.yaml", "--vibrate", "wave"]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_replay_file_with_vibrate() {
        let script = yaml_file(DOUBLE_TAP);
        let (records, surface) =
            replay_file(script.path(), ClassifierConfig::default(), &[DoubleTap]).unwrap();

        assert_eq!(kinds(&records), vec![Touch, Tap, Touch, DoubleTap, Tap]);
        assert_eq!(surface.label(), "double-tap");
        assert_eq!(surface.pulses(), vec![vec![30]]);
    }

    #[test]
    fn test_custom_config_changes_outcome() {
        let script = yaml_file(DOUBLE_TAP);
        let config = ClassifierConfig {
            double_tap_ms: 50,
            ..ClassifierConfig::default()
        };
        let (records, _) = replay_file(script.path(), config, &[]).unwrap();
        assert_eq!(kinds(&records), vec![Touch, Tap, Touch, Tap]);
    }

    #[test]
    fn test_render_formats() {
        let script = yaml_file(DOUBLE_TAP);
        let (records, _) = replay_file(script.path(), ClassifierConfig::default(), &[]).unwrap();

        let text = render(&records, OutputFormat::Text).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert!(text.lines().nth(3).unwrap().contains("double_tap"));

        let json = render(&records, OutputFormat::Json).unwrap();
        let first: serde_json::Value = serde_json::from_str(json.lines().next().unwrap()).unwrap();
        assert_eq!(first["kind"], "touch");
        assert_eq!(first["at_ms"], 0);
    }

    #[test]
    fn test_expectations() {
        let expect = yaml_file("[touch, tap, touch, double_tap, tap]\n");
        let expected = load_expected(expect.path()).unwrap();
        assert!(mismatch(&expected, &[Touch, Tap, Touch, DoubleTap, Tap]).is_none());

        let report = mismatch(&expected, &[Touch, Tap, Touch, Tap]).unwrap();
        assert!(report.contains("position 3"));
    }

    #[test]
    fn test_missing_script_is_an_error() {
        let err = replay_file(
            Path::new("/nonexistent/touchsense.yaml"),
            ClassifierConfig::default(),
            &[],
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("loading script"));
    }

    #[test]
    fn test_shipped_scripts_match_expectations() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scripts");
        for name in ["double_tap", "long_press_drag"] {
            let (records, _) = replay_file(
                &dir.join(format!("{}.yaml", name)),
                ClassifierConfig::default(),
                &[],
            )
            .unwrap();
            let expected = load_expected(&dir.join(format!("{}.expect.yaml", name))).unwrap();
            assert_eq!(mismatch(&expected, &kinds(&records)), None, "{}", name);
        }
    }
}
