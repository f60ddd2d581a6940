use cloudingest_core::{Point, PointCloud, PointSink};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::config::AsciiColumns;
use crate::error::{LoadError, Result};
use crate::parallel;
use crate::tokenizer::{self, LineSpan};

/// Per-column extremes over every parsed row.
///
/// Columns are indexed like fields; a row shorter than the widest row does
/// not contribute to the columns it lacks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnRange {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

/// Hook receiving the raw text fields of a line.
pub type RawFieldsHook<'a> = dyn Fn(&mut Point, &[&str], &AsciiColumns) + Sync + 'a;

/// Hook receiving the parsed numeric row and the whole-file column range.
pub type NumericFieldsHook<'a> =
    dyn Fn(&mut Point, &[f64], &ColumnRange, &AsciiColumns) + Sync + 'a;

/// Optional enrichment hooks run after default field extraction and before a
/// point is committed.
///
/// `numeric_fields` only runs when [`AsciiColumns::compute_min_max`] is set,
/// since it needs the whole-file range.
#[derive(Clone, Copy, Default)]
pub struct AsciiHooks<'a> {
    pub raw_fields: Option<&'a RawFieldsHook<'a>>,
    pub numeric_fields: Option<&'a NumericFieldsHook<'a>>,
}

/// Reads a whitespace-delimited text point cloud (XYZ, TXT, PTS...).
pub fn read_ascii(path: impl AsRef<Path>, columns: &AsciiColumns) -> Result<PointCloud> {
    let raw = fs::read(path)?;
    let points = parse_ascii(&raw, columns)?;
    Ok(PointCloud::from_points(points))
}

pub fn parse_ascii(buf: &[u8], columns: &AsciiColumns) -> Result<Vec<Point>> {
    parse_ascii_with(buf, columns, AsciiHooks::default())
}

#[tracing::instrument(skip_all, fields(bytes = buf.len()))]
pub fn parse_ascii_with(
    buf: &[u8],
    columns: &AsciiColumns,
    hooks: AsciiHooks<'_>,
) -> Result<Vec<Point>> {
    let spans = tokenizer::line_spans(buf);
    let skip = usize::try_from(columns.lines_to_skip)
        .ok()
        .filter(|&n| n <= spans.len())
        .ok_or_else(|| {
            LoadError::InvalidConfig(format!(
                "lines_to_skip {} outside [0, {}]",
                columns.lines_to_skip,
                spans.len()
            ))
        })?;
    let spans = &spans[skip..];
    debug!(lines = spans.len(), skipped = skip, "tokenized text point cloud");

    if columns.compute_min_max {
        Ok(parse_two_pass(buf, spans, columns, hooks))
    } else {
        Ok(parse_single_pass(buf, spans, columns, hooks))
    }
}

fn parse_single_pass(
    buf: &[u8],
    spans: &[LineSpan],
    columns: &AsciiColumns,
    hooks: AsciiHooks<'_>,
) -> Vec<Point> {
    parallel::map_slots(spans.len(), |i| {
        let fields: Vec<&[u8]> = tokenizer::fields(spans[i].slice(buf)).collect();
        let mut point = build_point(columns, fields.len(), |c| tokenizer::parse_f64(fields[c]));
        if let Some(hook) = hooks.raw_fields {
            let text: Vec<&str> = fields.iter().map(|f| tokenizer::field_str(f)).collect();
            hook(&mut point, &text, columns);
        }
        point
    })
}

fn parse_two_pass(
    buf: &[u8],
    spans: &[LineSpan],
    columns: &AsciiColumns,
    hooks: AsciiHooks<'_>,
) -> Vec<Point> {
    let rows: Vec<Vec<f64>> = parallel::map_slots(spans.len(), |i| {
        tokenizer::fields(spans[i].slice(buf))
            .map(tokenizer::parse_f64)
            .collect()
    });

    let range = column_min_max(&rows);
    debug!(columns = range.min.len(), "computed column ranges");

    parallel::map_slots(rows.len(), |i| {
        let row = &rows[i];
        let mut point = build_point(columns, row.len(), |c| row[c]);
        if let Some(hook) = hooks.raw_fields {
            let text: Vec<&str> = tokenizer::fields(spans[i].slice(buf))
                .map(tokenizer::field_str)
                .collect();
            hook(&mut point, &text, columns);
        }
        if let Some(hook) = hooks.numeric_fields {
            hook(&mut point, row, &range, columns);
        }
        point
    })
}

/// Sequential per-column reduction over parsed rows.
pub fn column_min_max(rows: &[Vec<f64>]) -> ColumnRange {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut range = ColumnRange {
        min: vec![f64::INFINITY; width],
        max: vec![f64::NEG_INFINITY; width],
    };
    for row in rows {
        for (c, &v) in row.iter().enumerate() {
            range.min[c] = range.min[c].min(v);
            range.max[c] = range.max[c].max(v);
        }
    }
    range
}

fn build_point(columns: &AsciiColumns, field_count: usize, value: impl Fn(usize) -> f64) -> Point {
    let get = |index: i32| {
        usize::try_from(index)
            .ok()
            .filter(|&c| c < field_count)
            .map(&value)
    };

    let mut point = Point::default();
    for (axis, index) in [columns.x, columns.y, columns.z].into_iter().enumerate() {
        if let Some(v) = get(index) {
            point.position[axis] = v;
        }
    }

    let scale = if columns.float_colors { 255.0 } else { 1.0 };
    for (channel, index) in [columns.r, columns.g, columns.b, columns.a]
        .into_iter()
        .enumerate()
    {
        if let Some(v) = get(index) {
            point.color[channel] = quantize(v * scale);
        }
    }

    for (axis, index) in [columns.nx, columns.ny, columns.nz].into_iter().enumerate() {
        if let Some(v) = get(index) {
            point.normal[axis] = v as f32;
        }
    }
    point
}

fn quantize(v: f64) -> u8 {
    // NaN saturates to 0 through the cast
    v.round().clamp(0.0, 255.0) as u8
}
