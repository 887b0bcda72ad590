//! Route patterns: parsing, specificity and segment-wise matching.
//!
//! A pattern is an ordered list of segments:
//!
//! | Syntax        | Segment                | Matches                          |
//! |---------------|------------------------|----------------------------------|
//! | `books`       | literal                | exactly `books`                  |
//! | `:id`         | dynamic                | any single non-empty segment     |
//! | `:id(\d+)`    | constrained dynamic    | a segment matching `^\d+$`       |
//! | `:path*`      | catch-all (last only)  | one or more remaining segments   |

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

use crate::error::NocturneError;

/// Path parameters bound by a match, keyed by parameter name.
pub type Params = BTreeMap<String, String>;

/// Precedence rank of a route. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    Static,
    Dynamic,
    CatchAll,
}

#[derive(Debug, Clone)]
pub enum Segment {
    Literal(String),
    Param {
        name: String,
        constraint: Option<Regex>,
    },
    CatchAll(String),
}

impl Segment {
    fn parse(raw: &str, is_last: bool, pattern: &str) -> Result<Self, NocturneError> {
        let Some(rest) = raw.strip_prefix(':') else {
            return Ok(Segment::Literal(raw.to_string()));
        };

        if let Some(name) = rest.strip_suffix('*') {
            if !is_last {
                return Err(NocturneError::Manifest(format!(
                    "catch-all segment `{}` must be last in `{}`",
                    raw, pattern
                )));
            }
            validate_name(name, pattern)?;
            return Ok(Segment::CatchAll(name.to_string()));
        }

        let (name, constraint) = match rest.find('(') {
            Some(open) if rest.ends_with(')') => {
                let source = &rest[open + 1..rest.len() - 1];
                let re = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
                    NocturneError::Manifest(format!("bad constraint in `{}`: {}", pattern, e))
                })?;
                (&rest[..open], Some(re))
            }
            Some(_) => {
                return Err(NocturneError::Manifest(format!(
                    "unterminated constraint `{}` in `{}`",
                    raw, pattern
                )));
            }
            None => (rest, None),
        };
        validate_name(name, pattern)?;
        Ok(Segment::Param {
            name: name.to_string(),
            constraint,
        })
    }

    /// Key used by the scope trees: literal text, `:name` or `:name*`.
    ///
    /// Constraints are not part of the key so a layer declared at
    /// `/books/:id` covers a route declared as `/books/:id(\d+)`.
    pub fn token(&self) -> String {
        match self {
            Segment::Literal(lit) => lit.clone(),
            Segment::Param { name, .. } => format!(":{}", name),
            Segment::CatchAll(name) => format!(":{}*", name),
        }
    }

    fn specificity(&self) -> Specificity {
        match self {
            Segment::Literal(_) => Specificity::Static,
            Segment::Param { .. } => Specificity::Dynamic,
            Segment::CatchAll(_) => Specificity::CatchAll,
        }
    }
}

fn validate_name(name: &str, pattern: &str) -> Result<(), NocturneError> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(NocturneError::Manifest(format!(
            "invalid parameter name `{}` in `{}`",
            name, pattern
        )));
    }
    Ok(())
}

/// Split a request path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// A parsed route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
    specificity: Specificity,
}

impl RoutePattern {
    /// Parse a pattern. A missing leading slash is added and a trailing
    /// slash is dropped, so `no-leading-slash-here` and
    /// `/no-leading-slash-here/` parse to the same pattern.
    pub fn parse(raw: &str) -> Result<Self, NocturneError> {
        let trimmed = raw.trim_matches('/');
        let source = format!("/{}", trimmed);
        let parts = split_path(trimmed);

        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            segments.push(Segment::parse(part, i + 1 == parts.len(), &source)?);
        }

        let specificity = segments
            .iter()
            .map(Segment::specificity)
            .max()
            .unwrap_or(Specificity::Static);

        Ok(RoutePattern {
            source,
            segments,
            specificity,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Scope-tree tokens for this pattern, root first.
    pub fn tokens(&self) -> Vec<String> {
        self.segments.iter().map(Segment::token).collect()
    }

    /// Match already-split path segments, returning the bound parameters.
    pub fn matches(&self, path: &[&str]) -> Option<Params> {
        let mut params = Params::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(lit) => {
                    if path.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param { name, constraint } => {
                    let value = path.get(i)?;
                    if let Some(re) = constraint {
                        if !re.is_match(value) {
                            return None;
                        }
                    }
                    params.insert(name.clone(), (*value).to_string());
                }
                Segment::CatchAll(name) => {
                    if i >= path.len() {
                        return None;
                    }
                    params.insert(name.clone(), path[i..].join("/"));
                    return Some(params);
                }
            }
        }

        (path.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str, path: &str) -> Option<Params> {
        RoutePattern::parse(pattern).unwrap().matches(&split_path(path))
    }

    #[test]
    fn test_static() {
        assert!(m("/hello/world", "/hello/world").is_some());
        assert!(m("/hello/world", "/hello").is_none());
        assert!(m("/hello", "/hello/world").is_none());
        assert!(m("/", "/").is_some());
    }

    #[test]
    fn test_params() {
        let params = m("/props/:id", "/props/123").unwrap();
        assert_eq!(params.get("id").unwrap(), "123");
        assert!(m("/props/:id", "/props").is_none());

        let params = m("/users/:id/posts/:post_id", "/users/7/posts/abc").unwrap();
        assert_eq!(params.get("id").unwrap(), "7");
        assert_eq!(params.get("post_id").unwrap(), "abc");
    }

    #[test]
    fn test_catch_all() {
        let params = m("/foo/:path*", "/foo/bar/baz").unwrap();
        assert_eq!(params.get("path").unwrap(), "bar/baz");
        // one or more segments
        assert!(m("/foo/:path*", "/foo").is_none());
    }

    #[test]
    fn test_constraint() {
        assert!(m(r"/books/:id(\d+)", "/books/123").is_some());
        assert!(m(r"/books/:id(\d+)", "/books/abc").is_none());
        // anchored to the whole segment
        assert!(m(r"/books/:id(\d+)", "/books/12a").is_none());
    }

    #[test]
    fn test_specificity() {
        assert_eq!(RoutePattern::parse("/a/b").unwrap().specificity(), Specificity::Static);
        assert_eq!(RoutePattern::parse("/a/:b").unwrap().specificity(), Specificity::Dynamic);
        assert_eq!(RoutePattern::parse("/:a/:b*").unwrap().specificity(), Specificity::CatchAll);
        assert!(Specificity::Static < Specificity::Dynamic);
        assert!(Specificity::Dynamic < Specificity::CatchAll);
    }

    #[test]
    fn test_normalization() {
        assert_eq!(
            RoutePattern::parse("no-leading-slash-here").unwrap().as_str(),
            "/no-leading-slash-here"
        );
        assert_eq!(RoutePattern::parse("/trailing/").unwrap().as_str(), "/trailing");
        assert_eq!(RoutePattern::parse("/").unwrap().as_str(), "/");
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(RoutePattern::parse("/:rest*/tail").is_err());
        assert!(RoutePattern::parse("/:").is_err());
        assert!(RoutePattern::parse("/:id(").is_err());
        assert!(RoutePattern::parse("/:id([)").is_err());
    }

    #[test]
    fn test_tokens_ignore_constraints() {
        let pattern = RoutePattern::parse(r"/books/:id(\d+)/:rest*").unwrap();
        assert_eq!(pattern.tokens(), vec!["books", ":id", ":rest*"]);
    }
}
