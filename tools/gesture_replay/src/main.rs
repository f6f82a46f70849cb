mod trace;

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use gesture_engine::{GestureConfig, GestureEngine, GestureEvent, RawTouch, RawTouchEvent};

use trace::{apply_group, group_rows, read_trace};

#[derive(Debug, Parser)]
#[command(name = "gesture_replay")]
#[command(about = "Replay a recorded touch trace through the gesture engine")]
struct Cli {
    /// Trace file with `touch,ms,phase,id,x,y[,pressure]` rows.
    trace: PathBuf,
    /// Expected gesture labels, one per line (e.g. `tap`, `swipe_left`).
    #[arg(long)]
    expect: Option<PathBuf>,
    /// Gesture tunables in TOML.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 1080.0)]
    width: f32,
    #[arg(long, default_value_t = 1920.0)]
    height: f32,
    /// Print one JSON object per gesture instead of CSV.
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GestureConfig::default(),
    };

    let rows = read_trace(&cli.trace)?;
    let events = replay(&rows, config, (cli.width, cli.height));

    if cli.json {
        for event in &events {
            println!("{}", serde_json::to_string(event)?);
        }
    } else {
        println!("gesture,ms,kind,x,y,start_x,start_y,duration_ms,multi_touch,scale,rotation,edge");
        for event in &events {
            println!(
                "gesture,{},{},{:.1},{:.1},{:.1},{:.1},{},{},{},{},{}",
                event.time_ms,
                event.label(),
                event.current.x,
                event.current.y,
                event.start.x,
                event.start.y,
                event.duration_ms,
                event.multi_touch,
                event.scale.map(|s| format!("{s:.3}")).unwrap_or_default(),
                event.rotation.map(|r| format!("{r:.1}")).unwrap_or_default(),
                event.edge.map(|e| e.label()).unwrap_or_default(),
            );
        }
    }

    if let Some(expect_path) = &cli.expect {
        let expected = read_expected(expect_path)?;
        let actual: Vec<&str> = events.iter().map(GestureEvent::label).collect();
        if actual != expected {
            eprintln!("expected gestures: {}", expected.join(","));
            eprintln!("actual gestures:   {}", actual.join(","));
            bail!("gesture sequence mismatch");
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<GestureConfig> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    GestureConfig::from_toml_str(&source).with_context(|| format!("in {}", path.display()))
}

fn replay(rows: &[trace::TraceRow], config: GestureConfig, size: (f32, f32)) -> Vec<GestureEvent> {
    let thresholds = config.thresholds;
    let mut engine = GestureEngine::new(config, size);
    let mut live: Vec<RawTouch> = Vec::new();
    let mut events = Vec::new();

    let groups = group_rows(rows);
    for group in &groups {
        apply_group(&mut live, group);
        let output = engine.handle(&RawTouchEvent {
            phase: group.phase,
            time_ms: group.ms,
            touches: &live,
            changed: &group.changed,
        });
        events.extend(output.events().copied());
    }

    // Traces usually stop right after the last lift; run the clock past
    // every pending window so deferred taps and long-presses resolve.
    if let Some(last) = groups.last() {
        let tail_ms = last
            .ms
            .saturating_add(thresholds.double_tap_delay_ms)
            .saturating_add(thresholds.long_press_ms);
        events.extend(engine.advance(tail_ms).events().copied());
    }

    events
}

fn read_expected(path: &Path) -> Result<Vec<String>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_ascii_lowercase)
        .collect())
}
