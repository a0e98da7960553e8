use std::fmt::Write;

///
/// PathSegment
///

#[derive(Clone, Debug)]
pub enum PathSegment<'a> {
    Field(&'a str),
    Index(usize),
    Position(&'a str),
}

impl<'a> From<&'a str> for PathSegment<'a> {
    fn from(s: &'a str) -> Self {
        Self::Field(s)
    }
}

impl From<usize> for PathSegment<'_> {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

/// Extend a rendered path: `a.b` for fields, `a[0]` for elements,
/// `a(name)` for tuple positions.
#[must_use]
pub fn join(path: &str, seg: PathSegment<'_>) -> String {
    let mut out = String::from(path);

    match seg {
        PathSegment::Field(s) => {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(s);
        }
        PathSegment::Index(i) => {
            let _ = write!(out, "[{i}]");
        }
        PathSegment::Position(name) => {
            let _ = write!(out, "({name})");
        }
    }

    out
}

/// Prefix a message with its field path.
#[must_use]
pub fn issue(path: &str, message: impl AsRef<str>) -> String {
    format!("Field \"{path}\" {}", message.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_each_segment_kind() {
        assert_eq!(join("", "name".into()), "name");
        assert_eq!(join("a", "b".into()), "a.b");
        assert_eq!(join("list", 0.into()), "list[0]");
        assert_eq!(join("point", PathSegment::Position("x")), "point(x)");
        assert_eq!(join("", 2.into()), "[2]");
    }

    #[test]
    fn issue_quotes_the_path() {
        assert_eq!(issue("a.b", "is required"), "Field \"a.b\" is required");
    }
}
