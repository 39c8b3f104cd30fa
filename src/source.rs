//! Source units and position lookup.
//!
//! Positions follow the JavaScript tooling convention: lines are 1-based,
//! columns are 0-based and counted in UTF-16 code units. Only the emitted
//! identity presents columns 1-based (see `identity::COLUMN_OFFSET`).

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// One file handed to the core. Immutable for the whole invocation.
#[derive(Debug)]
pub struct SourceUnit<'s> {
    pub text: &'s str,
    pub path: &'s str,
    lines: LineIndex,
}

impl<'s> SourceUnit<'s> {
    pub fn new(text: &'s str, path: &'s str) -> Self {
        SourceUnit {
            text,
            path,
            lines: LineIndex::new(text),
        }
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn locate(&self, offset: u32) -> Option<SourceLocation> {
        self.lines.locate(self.text, offset)
    }

    /// The unit path relative to `base`, with `/` separators. Both sides are
    /// resolved against the working directory first, so siblings of the base
    /// come out as `../sibling/...`. Falls back to the raw path when no
    /// relative form exists.
    pub fn relative_path(&self, base: &Path) -> String {
        let cwd = std::env::current_dir().ok();
        let path = absolutize(Path::new(self.path), cwd.as_deref());
        let base = absolutize(base, cwd.as_deref());
        match pathdiff::diff_paths(&path, &base) {
            Some(rel) if !rel.as_os_str().is_empty() => to_slash(&rel),
            _ => self.path.replace('\\', "/"),
        }
    }

    pub fn file_name(&self) -> String {
        Path::new(self.path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string())
    }
}

/// Joins `path` onto `cwd` and folds `.` and `..` lexically.
fn absolutize(path: &Path, cwd: Option<&Path>) -> PathBuf {
    let joined = match cwd {
        Some(cwd) => cwd.join(path),
        None => path.to_path_buf(),
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

// ═══════════════════════════════════════════════════════════════════════════════
// LINE INDEX
// ═══════════════════════════════════════════════════════════════════════════════

/// Byte offsets of every line start, for offset → line/column lookup.
/// Line terminators are the ECMAScript ones: LF, CRLF, CR, U+2028, U+2029.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    starts.push((i + 2) as u32);
                    i += 1;
                }
                b'\n' | b'\r' => starts.push((i + 1) as u32),
                // U+2028 / U+2029 (E2 80 A8 / E2 80 A9)
                0xE2 if bytes.get(i + 1) == Some(&0x80)
                    && matches!(bytes.get(i + 2), Some(&0xA8) | Some(&0xA9)) =>
                {
                    starts.push((i + 3) as u32);
                    i += 2;
                }
                _ => {}
            }
            i += 1;
        }
        LineIndex { starts }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Byte offset where the 0-based `line` starts.
    pub fn line_start(&self, line: usize) -> Option<u32> {
        self.starts.get(line).copied()
    }

    /// 0-based line containing `offset`.
    pub fn line_of(&self, offset: u32) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    pub fn locate(&self, text: &str, offset: u32) -> Option<SourceLocation> {
        if offset as usize > text.len() {
            return None;
        }
        let line = self.line_of(offset);
        let start = self.starts[line] as usize;
        let column = text.get(start..offset as usize)?.encode_utf16().count();
        Some(SourceLocation {
            line: line as u32 + 1,
            column: column as u32,
        })
    }
}
