//! 报表前导行检测
//!
//! Extracts start with free-form report lines. Everything before the first
//! line matching the header pattern is skipped.

use std::io::{self, BufRead};

use regex::Regex;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// 前导行检测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    /// 跳过的行数
    pub skipped: usize,
    /// 表头行（含换行符），未找到时为 None
    pub header: Option<String>,
}

impl Preamble {
    /// Column names of the detected header
    pub fn columns(&self) -> Vec<String> {
        self.header
            .as_deref()
            .map(|h| {
                h.trim_end_matches(['\r', '\n'])
                    .split('\t')
                    .map(|c| c.trim().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Consume lines from `reader` up to and including the header row
///
/// Without a match the whole input is consumed and every line counts as skipped.
/// Lines are decoded lossily so stray bytes in report text never abort the scan,
/// and a leading byte-order mark is dropped.
pub fn split_preamble<R: BufRead>(reader: &mut R, header: &Regex) -> io::Result<Preamble> {
    let mut skipped = 0;
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            return Ok(Preamble {
                skipped,
                header: None,
            });
        }
        let bytes = match raw.strip_prefix(UTF8_BOM) {
            Some(rest) if skipped == 0 => rest,
            _ => raw.as_slice(),
        };
        let line = String::from_utf8_lossy(bytes);
        if header.is_match(line.trim_end_matches(['\r', '\n'])) {
            return Ok(Preamble {
                skipped,
                header: Some(line.into_owned()),
            });
        }
        skipped += 1;
    }
}
