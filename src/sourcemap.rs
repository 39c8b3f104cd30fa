//! Source map for patched output.
//!
//! Injected text never contains a line break, so generated line N is
//! original line N. Every line gets a column-0 token, and every insertion
//! gets a token at its start and one right after it, both pointing at the
//! original injection column.

use oxc_sourcemap::{SourceMap, SourceMapBuilder};

use crate::patch::Patched;
use crate::source::SourceUnit;

pub fn build_source_map(unit: &SourceUnit<'_>, source_name: &str, patched: &Patched) -> SourceMap {
    let mut builder = SourceMapBuilder::default();
    let source_id = builder.set_source_and_content(source_name, unit.text);

    let lines = unit.lines();
    let line_count = lines.line_count();
    let mut pending = patched.insertions.iter().peekable();

    for line in 0..line_count {
        let dst_line = line as u32;
        builder.add_token(dst_line, 0, dst_line, 0, Some(source_id), None);

        let next_start = lines.line_start(line + 1);
        let mut shift = 0u32;
        while let Some(ins) =
            pending.next_if(|ins| next_start.map_or(true, |next| ins.offset < next))
        {
            let Some(origin) = unit.locate(ins.offset) else {
                continue;
            };
            let src_col = origin.column;
            builder.add_token(dst_line, src_col + shift, dst_line, src_col, Some(source_id), None);
            shift += utf16_len(&ins.text);
            builder.add_token(dst_line, src_col + shift, dst_line, src_col, Some(source_id), None);
        }
    }

    builder.into_sourcemap()
}

fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}
