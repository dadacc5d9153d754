use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Global string interner for element identifiers.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// An interned identifier attribute value (`path:line:column`).
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
///
/// The identifier is opaque to the overlay: it is only decoded into a
/// [`SourceLocation`] when an edit has to be reported.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern an attribute value, or return the existing handle.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to the raw attribute value.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Decode the source location encoded in this identifier.
    pub fn location(&self) -> Result<SourceLocation, IdentifierError> {
        SourceLocation::parse(self.as_str())
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}

// ─── Source location ─────────────────────────────────────────────────────

/// Why an identifier could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("identifier `{0}` has fewer than 3 colon-separated segments")]
    TooFewSegments(String),
    #[error("identifier `{0}` has a non-numeric line segment")]
    InvalidLine(String),
    #[error("identifier `{0}` has a non-numeric column segment")]
    InvalidColumn(String),
}

/// Where in source an annotated element was authored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Decode `filePath:line:column`, splitting from the right so the path
    /// itself may contain colons (`C:\src\App.tsx:3:1`).
    pub fn parse(id: &str) -> Result<Self, IdentifierError> {
        let mut parts = id.rsplitn(3, ':');
        let (Some(column), Some(line), Some(file_path)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(IdentifierError::TooFewSegments(id.to_string()));
        };

        let line = line
            .parse::<u32>()
            .map_err(|_| IdentifierError::InvalidLine(id.to_string()))?;
        let column = column
            .parse::<u32>()
            .map_err(|_| IdentifierError::InvalidColumn(id.to_string()))?;

        Ok(Self {
            file_path: file_path.to_string(),
            line,
            column,
        })
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_path, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ElementId::intern("src/Foo.tsx:10:4");
        let b = ElementId::intern("src/Foo.tsx:10:4");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "src/Foo.tsx:10:4");
    }

    #[test]
    fn parse_simple_location() {
        let loc = SourceLocation::parse("src/Foo.tsx:12:2").unwrap();
        assert_eq!(loc.file_path, "src/Foo.tsx");
        assert_eq!(loc.line, 12);
        assert_eq!(loc.column, 2);
    }

    #[test]
    fn parse_path_with_colons() {
        let loc = SourceLocation::parse("C:/work/app/page.tsx:7:15").unwrap();
        assert_eq!(loc.file_path, "C:/work/app/page.tsx");
        assert_eq!(loc.line, 7);
        assert_eq!(loc.column, 15);
    }

    #[test]
    fn parse_rejects_short_ids() {
        assert_eq!(
            SourceLocation::parse("Foo.tsx:12"),
            Err(IdentifierError::TooFewSegments("Foo.tsx:12".into()))
        );
        assert!(SourceLocation::parse("").is_err());
    }

    #[test]
    fn parse_rejects_non_numeric_segments() {
        assert_eq!(
            SourceLocation::parse("Foo.tsx:x:2"),
            Err(IdentifierError::InvalidLine("Foo.tsx:x:2".into()))
        );
        assert_eq!(
            SourceLocation::parse("Foo.tsx:3:y"),
            Err(IdentifierError::InvalidColumn("Foo.tsx:3:y".into()))
        );
    }

    #[test]
    fn element_id_decodes_location() {
        let id = ElementId::intern("app/page.tsx:40:8");
        let loc = id.location().unwrap();
        assert_eq!(loc.to_string(), "app/page.tsx:40:8");
    }
}
