// SPDX-License-Identifier: Apache-2.0

//! Source positions, spans and the file table that names them.

use std::fmt;

/// Index into the session's file table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FileId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub lineno: u32,
    pub colno: u32,
}

impl Pos {
    pub fn new(lineno: u32, colno: u32) -> Self {
        Pos { lineno, colno }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Pos,
    pub limit: Pos,
}

impl Span {
    pub fn new(start: Pos, limit: Pos) -> Self {
        Span { start, limit }
    }

    pub fn to_human_string(&self) -> String {
        format!(
            "{}:{}..{}:{}",
            self.start.lineno, self.start.colno, self.limit.lineno, self.limit.colno
        )
    }
}

/// Location of a token or parse-tree node: a span within one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileRegion {
    pub file: FileId,
    pub start: Pos,
    pub limit: Pos,
}

impl FileRegion {
    pub fn new(file: FileId, span: Span) -> Self {
        FileRegion {
            file,
            start: span.start,
            limit: span.limit,
        }
    }

    /// Region covering `first` through `last`; both must be in the same file.
    pub fn join(first: FileRegion, last: FileRegion) -> Self {
        debug_assert_eq!(first.file, last.file);
        FileRegion {
            file: first.file,
            start: first.start,
            limit: last.limit,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.limit)
    }

    pub fn to_human_string(&self) -> String {
        self.span().to_human_string()
    }
}

impl fmt::Display for FileRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.file.0, self.span().to_human_string())
    }
}

/// Names of the source units read by a session, indexed by `FileId`.
#[derive(Debug, Default, Clone)]
pub struct FileTable {
    names: Vec<String>,
}

impl FileTable {
    pub fn add(&mut self, name: &str) -> FileId {
        let id = FileId(self.names.len() as u32);
        self.names.push(name.to_string());
        id
    }

    pub fn name(&self, id: FileId) -> Option<&str> {
        self.names.get(id.0 as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Renders `region` as `name:line:col..line:col`.
    pub fn describe(&self, region: FileRegion) -> String {
        match self.name(region.file) {
            Some(name) => format!("{}:{}", name, region.to_human_string()),
            None => region.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_covers_both_regions() {
        let file = FileId(0);
        let a = FileRegion::new(file, Span::new(Pos::new(1, 1), Pos::new(1, 7)));
        let b = FileRegion::new(file, Span::new(Pos::new(3, 2), Pos::new(3, 11)));
        let joined = FileRegion::join(a, b);
        assert_eq!(joined.start, Pos::new(1, 1));
        assert_eq!(joined.limit, Pos::new(3, 11));
        assert_eq!(joined.to_human_string(), "1:1..3:11");
    }

    #[test]
    fn test_file_table_describe() {
        let mut files = FileTable::default();
        let id = files.add("top.v");
        let region = FileRegion::new(id, Span::new(Pos::new(2, 5), Pos::new(2, 9)));
        assert_eq!(files.describe(region), "top.v:2:5..2:9");
        assert_eq!(files.name(FileId(7)), None);
    }
}
