use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{anyhow, bail, Context, Result};
use gesture_engine::{RawTouch, TouchPhase};

pub const TRACE_HEADER: &str = "touch,ms,phase,id,x,y,pressure";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceRow {
    pub ms: u64,
    pub phase: TouchPhase,
    pub touch: RawTouch,
}

/// Consecutive rows sharing a timestamp and phase: one platform event.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceGroup {
    pub ms: u64,
    pub phase: TouchPhase,
    pub changed: Vec<RawTouch>,
}

pub fn read_trace(path: &Path) -> Result<Vec<TraceRow>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut rows = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.with_context(|| format!("failed to read {}:{line_no}", path.display()))?;
        if let Some(row) =
            parse_row(&line).with_context(|| format!("{}:{line_no}", path.display()))?
        {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Parses one trace line; comments, blanks, the header and rows of other
/// record types yield `None`.
pub fn parse_row(line: &str) -> Result<Option<TraceRow>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == TRACE_HEADER {
        return Ok(None);
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if parts[0] != "touch" {
        return Ok(None);
    }
    if parts.len() < 6 {
        bail!("invalid trace line, expected at least 6 columns");
    }

    let ms = parts[1]
        .parse::<u64>()
        .with_context(|| format!("invalid ms '{}'", parts[1]))?;
    let phase = parse_phase(parts[2])?;
    let id = parts[3]
        .parse::<u32>()
        .with_context(|| format!("invalid id '{}'", parts[3]))?;
    let x = parse_coord(parts[4], "x")?;
    let y = parse_coord(parts[5], "y")?;
    let pressure = match parts.get(6) {
        Some(raw) if !raw.is_empty() => parse_coord(raw, "pressure")?,
        _ => 1.0,
    };

    Ok(Some(TraceRow {
        ms,
        phase,
        touch: RawTouch { id, x, y, pressure },
    }))
}

pub fn group_rows(rows: &[TraceRow]) -> Vec<TraceGroup> {
    let mut groups: Vec<TraceGroup> = Vec::new();
    for row in rows {
        match groups.last_mut() {
            Some(group) if group.ms == row.ms && group.phase == row.phase => {
                group.changed.push(row.touch);
            }
            _ => groups.push(TraceGroup {
                ms: row.ms,
                phase: row.phase,
                changed: vec![row.touch],
            }),
        }
    }
    groups
}

/// Applies a group to the live contact list the way a platform would
/// before dispatching the event.
pub fn apply_group(live: &mut Vec<RawTouch>, group: &TraceGroup) {
    match group.phase {
        TouchPhase::Start | TouchPhase::Move => {
            for touch in &group.changed {
                match live.iter_mut().find(|t| t.id == touch.id) {
                    Some(slot) => *slot = *touch,
                    None => live.push(*touch),
                }
            }
        }
        TouchPhase::End | TouchPhase::Cancel => {
            live.retain(|t| !group.changed.iter().any(|c| c.id == t.id));
        }
    }
}

pub fn parse_phase(raw: &str) -> Result<TouchPhase> {
    match raw.to_ascii_lowercase().as_str() {
        "start" => Ok(TouchPhase::Start),
        "move" => Ok(TouchPhase::Move),
        "end" => Ok(TouchPhase::End),
        "cancel" => Ok(TouchPhase::Cancel),
        other => Err(anyhow!("invalid phase '{other}'")),
    }
}

fn parse_coord(raw: &str, field: &str) -> Result<f32> {
    raw.parse::<f32>()
        .with_context(|| format!("invalid {field} '{raw}'"))
}
