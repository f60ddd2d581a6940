//! PCD (Point Cloud Data) reader and writer.
//!
//! Supports the three data encodings: `ascii`, `binary` (row-major records)
//! and `binary_compressed` (LZF over a column-major layout).

use cloudingest_core::{HasColor, HasNormal, HasPosition, Point, PointCloud, PointSink};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{LoadError, Result};
use crate::tokenizer::{self, Lines};
use crate::{lzf, parallel};

/// Encoding of the section following the `DATA` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdDataKind {
    Ascii,
    Binary,
    BinaryCompressed,
}

impl PcdDataKind {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "ascii" => Some(Self::Ascii),
            "binary" => Some(Self::Binary),
            "binary_compressed" => Some(Self::BinaryCompressed),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Binary => "binary",
            Self::BinaryCompressed => "binary_compressed",
        }
    }
}

/// Sensor pose: translation followed by a `w x y z` quaternion, as written on
/// the `VIEWPOINT` header line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub translation: [f64; 3],
    pub orientation: [f64; 4],
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            orientation: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PcdOptions {
    /// Caller-side viewpoint. Accepted but not applied: positions are returned
    /// in the file's own frame until a local-to-world transform is wired in.
    pub viewpoint: Viewpoint,
}

/// Scalar interpretation from the `TYPE` header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Float,
    Unsigned,
    Signed,
}

impl ScalarKind {
    fn parse(token: &str) -> Self {
        match token {
            "U" | "u" => Self::Unsigned,
            "I" | "i" => Self::Signed,
            _ => Self::Float,
        }
    }
}

/// Header keyword to token list. Only the first occurrence of a keyword is
/// kept.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeaderTable {
    entries: HashMap<String, Vec<String>>,
}

impl HeaderTable {
    fn insert_first(&mut self, keyword: &str, tokens: Vec<String>) {
        self.entries.entry(keyword.to_owned()).or_insert(tokens);
    }

    pub(crate) fn get(&self, keyword: &str) -> Option<&[String]> {
        self.entries.get(keyword).map(Vec::as_slice)
    }

    fn first_usize(&self, keyword: &str) -> Option<usize> {
        let token = self.get(keyword)?.first()?;
        match token.parse::<usize>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(keyword, token = token.as_str(), "ignoring unparseable header value");
                None
            }
        }
    }
}

/// Field layout derived from the header.
///
/// `names`, `kinds` and `counts` follow the `FIELDS` line; `sizes` and
/// `offsets` follow `SIZE`. They only line up when the header is consistent,
/// which the binary paths verify before touching the data.
#[derive(Debug, Clone, PartialEq)]
pub struct PcdSchema {
    pub names: Vec<String>,
    pub kinds: Vec<ScalarKind>,
    pub counts: Vec<usize>,
    /// Byte width of each field (`SIZE * COUNT`).
    pub sizes: Vec<usize>,
    pub offsets: Vec<usize>,
    pub chunk_size: usize,
    pub record_count: usize,
    pub data: PcdDataKind,
    /// First byte after the `DATA` line.
    pub data_offset: usize,
    pub viewpoint: Viewpoint,
    x: Option<usize>,
    y: Option<usize>,
    z: Option<usize>,
    rgb: Option<usize>,
    has_alpha: bool,
    normal: [Option<usize>; 3],
}

impl PcdSchema {
    fn from_header(table: &HeaderTable, data: PcdDataKind, data_offset: usize) -> Result<Self> {
        let names: Vec<String> = table.get("FIELDS").map(<[String]>::to_vec).unwrap_or_default();
        let position = |name: &str| names.iter().position(|n| n == name);

        let counts = match table.get("COUNT") {
            Some(tokens) => parse_all(tokens, "COUNT")?,
            None => vec![1; names.len()],
        };
        let sizes = match table.get("SIZE") {
            Some(tokens) => {
                let sizes = parse_all(tokens, "SIZE")?;
                if table.get("COUNT").is_some() && counts.len() != sizes.len() {
                    return Err(LoadError::Malformed(format!(
                        "COUNT has {} entries but SIZE has {}",
                        counts.len(),
                        sizes.len()
                    )));
                }
                sizes
                    .iter()
                    .enumerate()
                    .map(|(i, &s)| s.checked_mul(counts.get(i).copied().unwrap_or(1)))
                    .collect::<Option<Vec<usize>>>()
                    .ok_or_else(|| LoadError::Malformed("field width overflows".into()))?
            }
            None => Vec::new(),
        };
        let mut offsets = Vec::with_capacity(sizes.len());
        let mut chunk_size = 0usize;
        for &s in &sizes {
            offsets.push(chunk_size);
            chunk_size = chunk_size
                .checked_add(s)
                .ok_or_else(|| LoadError::Malformed("record width overflows".into()))?;
        }

        let kinds = (0..names.len())
            .map(|i| {
                table
                    .get("TYPE")
                    .and_then(|t| t.get(i))
                    .map_or(ScalarKind::Float, |t| ScalarKind::parse(t))
            })
            .collect();

        let width = table.first_usize("WIDTH").unwrap_or(0);
        let height = table.first_usize("HEIGHT").unwrap_or(1);
        let grid = width.checked_mul(height).ok_or_else(|| {
            LoadError::Malformed(format!("WIDTH {width} x HEIGHT {height} overflows"))
        })?;
        let record_count = table.first_usize("POINTS").unwrap_or(0).max(grid);

        let viewpoint = table
            .get("VIEWPOINT")
            .filter(|t| t.len() == 7)
            .map(|t| {
                let v: Vec<f64> = t.iter().map(|s| tokenizer::parse_f64(s.as_bytes())).collect();
                Viewpoint {
                    translation: [v[0], v[1], v[2]],
                    orientation: [v[3], v[4], v[5], v[6]],
                }
            })
            .unwrap_or_default();

        let (rgb, has_alpha) = match (position("rgb"), position("rgba")) {
            (Some(i), _) => (Some(i), false),
            (None, Some(i)) => (Some(i), true),
            (None, None) => (None, false),
        };

        let (x, y, z) = (position("x"), position("y"), position("z"));
        let normal = [
            position("normal_x"),
            position("normal_y"),
            position("normal_z"),
        ];

        Ok(Self {
            x,
            y,
            z,
            rgb,
            has_alpha,
            normal,
            names,
            kinds,
            counts,
            sizes,
            offsets,
            chunk_size,
            record_count,
            data,
            data_offset,
            viewpoint,
        })
    }

    /// Bytes the row-major data section must provide.
    pub fn required_bytes(&self) -> Result<usize> {
        self.record_count.checked_mul(self.chunk_size).ok_or_else(|| {
            LoadError::Malformed(format!(
                "{} records of {} bytes overflow",
                self.record_count, self.chunk_size
            ))
        })
    }

    fn check_binary_layout(&self) -> Result<()> {
        if self.names.len() != self.offsets.len() {
            return Err(LoadError::Malformed(format!(
                "{} fields but {} binary offsets",
                self.names.len(),
                self.offsets.len()
            )));
        }
        if self.chunk_size == 0 && self.record_count > 0 {
            return Err(LoadError::Malformed("records have zero width".into()));
        }
        Ok(())
    }
}

fn parse_all(tokens: &[String], keyword: &str) -> Result<Vec<usize>> {
    tokens
        .iter()
        .map(|t| {
            t.parse::<usize>()
                .map_err(|_| LoadError::Malformed(format!("{keyword} entry {t:?} is not a count")))
        })
        .collect()
}

/// Scans header lines up to and including `DATA` and derives the schema.
pub fn parse_pcd_header(buf: &[u8]) -> Result<PcdSchema> {
    let mut table = HeaderTable::default();
    let mut lines = Lines::new(buf);

    while let Some(span) = lines.next() {
        let mut fields = tokenizer::fields(span.slice(buf)).map(tokenizer::field_str);
        let Some(keyword) = fields.next() else {
            continue;
        };
        if keyword.starts_with('#') {
            continue;
        }
        let tokens: Vec<String> = fields.map(str::to_owned).collect();

        if keyword == "DATA" {
            let mode = tokens.first().map(String::as_str).unwrap_or("");
            let kind = PcdDataKind::parse(mode)
                .ok_or_else(|| LoadError::Malformed(format!("unsupported DATA mode {mode:?}")))?;
            return PcdSchema::from_header(&table, kind, lines.offset());
        }
        table.insert_first(keyword, tokens);
    }

    Err(LoadError::Malformed("no DATA line found".into()))
}

/// Reads a PCD file into the reference point container.
pub fn read_pcd(path: impl AsRef<Path>, options: &PcdOptions) -> Result<PointCloud> {
    let raw = fs::read(path)?;
    let points = parse_pcd(&raw, options)?;
    Ok(PointCloud::from_points(points))
}

#[tracing::instrument(skip_all, fields(bytes = buf.len()))]
pub fn parse_pcd(buf: &[u8], options: &PcdOptions) -> Result<Vec<Point>> {
    let schema = parse_pcd_header(buf)?;
    debug!(
        fields = ?schema.names,
        records = schema.record_count,
        chunk = schema.chunk_size,
        data = schema.data.as_str(),
        "parsed PCD header"
    );

    // Reserved for a local-to-world transform; deliberately not applied.
    let _ = &options.viewpoint;

    let data = &buf[schema.data_offset..];
    match schema.data {
        PcdDataKind::Ascii => Ok(extract_ascii(data, &schema)),
        PcdDataKind::Binary => {
            schema.check_binary_layout()?;
            let need = schema.required_bytes()?;
            if data.len() < need {
                return Err(LoadError::Truncated {
                    expected: need,
                    available: data.len(),
                });
            }
            Ok(extract_binary(&data[..need], &schema))
        }
        PcdDataKind::BinaryCompressed => {
            schema.check_binary_layout()?;
            let rows = decompress_section(data, &schema)?;
            Ok(extract_binary(&rows, &schema))
        }
    }
}

fn read_u32_le(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Decodes a `binary_compressed` section into row-major records.
fn decompress_section(data: &[u8], schema: &PcdSchema) -> Result<Vec<u8>> {
    if data.len() < 8 {
        return Err(LoadError::Truncated {
            expected: 8,
            available: data.len(),
        });
    }
    let compressed = read_u32_le(data, 0) as usize;
    let uncompressed = read_u32_le(data, 4) as usize;
    let payload = &data[8..];
    if compressed > payload.len() {
        return Err(LoadError::Truncated {
            expected: compressed,
            available: payload.len(),
        });
    }

    let columns = lzf::decompress(&payload[..compressed], uncompressed)?;
    let need = schema.required_bytes()?;
    debug!(compressed, uncompressed, decoded = columns.len(), "decompressed PCD data");
    if columns.len() < need {
        return Err(LoadError::Truncated {
            expected: need,
            available: columns.len(),
        });
    }
    Ok(columns_to_rows(&columns, &schema.sizes, &schema.offsets, schema.record_count))
}

/// Reorders a column-major buffer (all of field 0, then all of field 1...)
/// into fixed-size row-major records.
pub fn columns_to_rows(
    columns: &[u8],
    sizes: &[usize],
    offsets: &[usize],
    records: usize,
) -> Vec<u8> {
    let chunk: usize = sizes.iter().sum();
    let mut rows = vec![0u8; records * chunk];
    let mut base = 0;
    for (&w, &off) in sizes.iter().zip(offsets) {
        for r in 0..records {
            let src = base + r * w;
            let dst = r * chunk + off;
            rows[dst..dst + w].copy_from_slice(&columns[src..src + w]);
        }
        base += records * w;
    }
    rows
}

/// Inverse of [`columns_to_rows`].
pub fn rows_to_columns(rows: &[u8], sizes: &[usize], offsets: &[usize], records: usize) -> Vec<u8> {
    let chunk: usize = sizes.iter().sum();
    let mut columns = Vec::with_capacity(records * chunk);
    for (&w, &off) in sizes.iter().zip(offsets) {
        for r in 0..records {
            let src = r * chunk + off;
            columns.extend_from_slice(&rows[src..src + w]);
        }
    }
    columns
}

/// Reads one scalar of the given width; unsupported widths read as zero.
fn read_scalar(b: &[u8], kind: ScalarKind, size: usize) -> f64 {
    match (kind, size) {
        (ScalarKind::Float, 4) => f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64,
        (ScalarKind::Float, 8) => {
            f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        }
        (ScalarKind::Unsigned, 1) => b[0] as f64,
        (ScalarKind::Unsigned, 2) => u16::from_le_bytes([b[0], b[1]]) as f64,
        (ScalarKind::Unsigned, 4) => u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64,
        (ScalarKind::Unsigned, 8) => {
            u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f64
        }
        (ScalarKind::Signed, 1) => b[0] as i8 as f64,
        (ScalarKind::Signed, 2) => i16::from_le_bytes([b[0], b[1]]) as f64,
        (ScalarKind::Signed, 4) => i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64,
        (ScalarKind::Signed, 8) => {
            i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f64
        }
        _ => 0.0,
    }
}

fn unpack_rgb(packed: u32, has_alpha: bool) -> [u8; 4] {
    let alpha = if has_alpha {
        (packed >> 24) as u8
    } else {
        255
    };
    [
        ((packed >> 16) & 0xff) as u8,
        ((packed >> 8) & 0xff) as u8,
        (packed & 0xff) as u8,
        alpha,
    ]
}

fn extract_binary(rows: &[u8], schema: &PcdSchema) -> Vec<Point> {
    let chunk = schema.chunk_size;
    // Element width of a field; multi-count fields contribute their first element.
    let element = |field: usize| {
        schema.sizes[field] / schema.counts.get(field).copied().unwrap_or(1).max(1)
    };
    let scalar = |record: &[u8], field: Option<usize>| {
        field.map(|f| {
            let at = schema.offsets[f];
            let size = element(f);
            read_scalar(&record[at..at + size], schema.kinds[f], size)
        })
    };

    parallel::map_slots(schema.record_count, |i| {
        let record = &rows[i * chunk..(i + 1) * chunk];
        let mut point = Point::default();
        for (axis, field) in [schema.x, schema.y, schema.z].into_iter().enumerate() {
            if let Some(v) = scalar(record, field) {
                point.position[axis] = v;
            }
        }
        if let Some(f) = schema.rgb.filter(|&f| schema.sizes[f] >= 4) {
            point.color = unpack_rgb(read_u32_le(record, schema.offsets[f]), schema.has_alpha);
        }
        for (axis, field) in schema.normal.into_iter().enumerate() {
            if let Some(v) = scalar(record, field) {
                point.normal[axis] = v as f32;
            }
        }
        point
    })
}

fn extract_ascii(data: &[u8], schema: &PcdSchema) -> Vec<Point> {
    // Token column of each field; COUNT > 1 fields span several tokens.
    let mut token_column = Vec::with_capacity(schema.names.len());
    let mut next = 0usize;
    for i in 0..schema.names.len() {
        token_column.push(next);
        next += schema.counts.get(i).copied().unwrap_or(1);
    }

    let spans: Vec<_> = Lines::new(data).take(schema.record_count).collect();
    if spans.len() < schema.record_count {
        warn!(
            declared = schema.record_count,
            found = spans.len(),
            "PCD ascii section shorter than declared"
        );
    }

    parallel::map_slots(spans.len(), |i| {
        let tokens: Vec<&[u8]> = tokenizer::fields(spans[i].slice(data)).collect();
        let token = |field: Option<usize>| field.and_then(|f| tokens.get(token_column[f]).copied());

        let mut point = Point::default();
        for (axis, field) in [schema.x, schema.y, schema.z].into_iter().enumerate() {
            if let Some(t) = token(field) {
                point.position[axis] = tokenizer::parse_f64(t);
            }
        }
        if let Some(t) = token(schema.rgb) {
            let packed = match schema.rgb.map(|f| schema.kinds[f]) {
                Some(ScalarKind::Float) => {
                    tokenizer::field_str(t).parse::<f32>().map_or(0, f32::to_bits)
                }
                _ => tokenizer::parse_f64(t) as u32,
            };
            point.color = unpack_rgb(packed, schema.has_alpha);
        }
        for (axis, field) in schema.normal.into_iter().enumerate() {
            if let Some(t) = token(field) {
                point.normal[axis] = tokenizer::parse_f64(t) as f32;
            }
        }
        point
    })
}

const WRITE_FIELDS: &str = "x y z rgba normal_x normal_y normal_z";
const WRITE_SIZES: [usize; 7] = [8, 8, 8, 4, 4, 4, 4];
const WRITE_RECORD: usize = 40;

fn write_header(out: &mut Vec<u8>, n: usize, kind: PcdDataKind) {
    let header = format!(
        "# .PCD v0.7 - Point Cloud Data file format\n\
         VERSION 0.7\n\
         FIELDS {WRITE_FIELDS}\n\
         SIZE 8 8 8 4 4 4 4\n\
         TYPE F F F U F F F\n\
         COUNT 1 1 1 1 1 1 1\n\
         WIDTH {n}\n\
         HEIGHT 1\n\
         VIEWPOINT 0 0 0 1 0 0 0\n\
         POINTS {n}\n\
         DATA {}\n",
        kind.as_str()
    );
    out.extend_from_slice(header.as_bytes());
}

fn pack_rgba(c: [u8; 4]) -> u32 {
    (u32::from(c[3]) << 24) | (u32::from(c[0]) << 16) | (u32::from(c[1]) << 8) | u32::from(c[2])
}

fn encode_record<P: HasPosition + HasColor + HasNormal>(p: &P, out: &mut Vec<u8>) {
    for v in p.position() {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&pack_rgba(p.color()).to_le_bytes());
    for v in p.normal() {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// Serializes points as a complete PCD file image.
pub fn encode_pcd<P>(points: &[P], kind: PcdDataKind) -> Vec<u8>
where
    P: HasPosition + HasColor + HasNormal,
{
    let mut out = Vec::new();
    write_header(&mut out, points.len(), kind);

    match kind {
        PcdDataKind::Ascii => {
            for p in points {
                let [x, y, z] = p.position();
                let [nx, ny, nz] = p.normal();
                let line = format!("{x} {y} {z} {} {nx} {ny} {nz}\n", pack_rgba(p.color()));
                out.extend_from_slice(line.as_bytes());
            }
        }
        PcdDataKind::Binary => {
            out.reserve(points.len() * WRITE_RECORD);
            for p in points {
                encode_record(p, &mut out);
            }
        }
        PcdDataKind::BinaryCompressed => {
            let mut rows = Vec::with_capacity(points.len() * WRITE_RECORD);
            for p in points {
                encode_record(p, &mut rows);
            }
            let mut offsets = [0usize; 7];
            for i in 1..offsets.len() {
                offsets[i] = offsets[i - 1] + WRITE_SIZES[i - 1];
            }
            let columns = rows_to_columns(&rows, &WRITE_SIZES, &offsets, points.len());
            let packed = lzf::compress(&columns);
            out.extend_from_slice(&(packed.len() as u32).to_le_bytes());
            out.extend_from_slice(&(columns.len() as u32).to_le_bytes());
            out.extend_from_slice(&packed);
        }
    }
    out
}

pub fn write_pcd<P>(path: impl AsRef<Path>, points: &[P], kind: PcdDataKind) -> Result<()>
where
    P: HasPosition + HasColor + HasNormal,
{
    fs::write(path, encode_pcd(points, kind))?;
    Ok(())
}
