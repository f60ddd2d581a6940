#![forbid(unsafe_code)]

pub mod ascii;
pub mod config;
pub mod error;
pub mod lzf;
pub mod parallel;
pub mod pcd;
pub mod tokenizer;

pub use ascii::{
    column_min_max, parse_ascii, parse_ascii_with, read_ascii, AsciiHooks, ColumnRange,
    NumericFieldsHook, RawFieldsHook,
};
pub use config::AsciiColumns;
pub use error::{LoadError, Result};
pub use lzf::LzfError;
pub use pcd::{
    encode_pcd, parse_pcd, parse_pcd_header, read_pcd, write_pcd, PcdDataKind, PcdOptions,
    PcdSchema, Viewpoint,
};
