// src/merge/sourcemap.rs

//! Line-level source maps for concatenated units.
//!
//! The builder records, per input, which run of generated lines it
//! contributed; `finalize` emits a source-map v3 document whose mappings pair
//! every generated line with line 0-column-0-accurate positions in its
//! original file. The map reflects the concatenation step; transform stages
//! do not rewrite mappings.

use std::path::Path;

use serde_json::json;

use crate::types::SourceKind;

const BASE64_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: i64 = 0b11111;
const VLQ_CONTINUATION_BIT: i64 = 0b100000;

/// Encode one signed value as a base64 VLQ segment field.
fn encode_vlq(value: i64, out: &mut String) {
    // Sign lives in the least significant bit.
    let mut vlq = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };

    loop {
        let mut digit = vlq & VLQ_BASE_MASK;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq > 0 {
            digit |= VLQ_CONTINUATION_BIT;
        }
        out.push(BASE64_CHARS[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}

/// Accumulates per-source line counts during concatenation.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    sources: Vec<String>,
    line_counts: Vec<usize>,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one input in concatenation order.
    pub fn add_source(&mut self, path: &Path, content: &str) {
        self.sources
            .push(path.to_string_lossy().replace('\\', "/"));
        self.line_counts.push(content.lines().count());
    }

    /// Emit the source-map v3 JSON document for a merged unit named `file`.
    pub fn finalize(&self, file: &str) -> String {
        let map = json!({
            "version": 3,
            "file": file,
            "sources": self.sources,
            "names": [],
            "mappings": self.mappings(),
        });
        map.to_string()
    }

    /// One segment per generated line: `[genCol, sourceDelta, lineDelta, colDelta]`,
    /// deltas relative to the previous segment as the format requires.
    fn mappings(&self) -> String {
        let mut out = String::new();
        let mut prev_source: i64 = 0;
        let mut prev_line: i64 = 0;
        let mut first_segment = true;

        for (source_idx, &lines) in self.line_counts.iter().enumerate() {
            for line in 0..lines {
                if !first_segment {
                    out.push(';');
                }

                encode_vlq(0, &mut out);
                encode_vlq(source_idx as i64 - prev_source, &mut out);
                encode_vlq(line as i64 - prev_line, &mut out);
                encode_vlq(0, &mut out);

                prev_source = source_idx as i64;
                prev_line = line as i64;
                first_segment = false;
            }
        }

        out
    }
}

/// The comment appended to a merged unit pointing at its map file.
pub fn source_mapping_comment(kind: SourceKind, map_file_name: &str) -> String {
    match kind {
        SourceKind::Scripts => format!("\n//# sourceMappingURL={map_file_name}\n"),
        SourceKind::Styles => format!("\n/*# sourceMappingURL={map_file_name} */\n"),
    }
}
