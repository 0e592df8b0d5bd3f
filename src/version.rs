//! Homebrew version parsing and ordering.
//!
//! Homebrew versions are not semver. A version string is scanned into a
//! sequence of [`Token`]s (numbers, words, and the well-known pre-release and
//! patch markers) and two versions compare token by token, padding the shorter
//! one with [`Token::Null`]:
//!
//! - Numeric tokens compare by value: `1.10 > 1.9`
//! - Trailing zeros are padding: `1.2 == 1.2.0`
//! - Suffixes rank `alpha < beta < pre < rc < (none) < patch`, so
//!   `1.2.3rc3 < 1.2.3 < 1.2.3-p34`
//! - `HEAD` (optionally `HEAD-<commit>`) is newer than every other version
//! - [`Version::NULL`] is older than everything and equal to nothing
//!
//! Parsing never fails: strings with nothing to compare become
//! [`Version::NULL`], so callers check [`Version::is_null`] instead of handling
//! errors.
//!
//! # Examples
//!
//! ```
//! use brewkit::Version;
//!
//! let rc = Version::parse("1.2.3rc3");
//! let release = Version::parse("1.2.3");
//! let patched = Version::parse("1.2.3-p34");
//! assert!(rc < release && release < patched);
//!
//! assert_eq!(Version::parse("1.2"), Version::parse("1.2.0"));
//! assert!(Version::parse("HEAD") > Version::parse("2099.1"));
//! ```

pub mod detect;

use crate::error::{BrewError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A single comparable piece of a version string.
///
/// Composite tokens (`Alpha`, `Beta`, `Pre`, `Rc`, `Patch`) carry the number
/// that trails their keyword, or 0 when there is none.
#[derive(Debug, Clone)]
pub enum Token {
    /// Padding used when one version has fewer tokens than the other.
    Null,
    Numeric(u64),
    Text(String),
    Alpha(u64),
    Beta(u64),
    Pre(u64),
    Rc(u64),
    Patch(u64),
}

impl Token {
    /// Rank table for unlike token kinds. `Null`, numbers and plain words
    /// share the "no suffix" rank.
    fn rank(&self) -> u8 {
        match self {
            Token::Alpha(_) => 0,
            Token::Beta(_) => 1,
            Token::Pre(_) => 2,
            Token::Rc(_) => 3,
            Token::Null | Token::Numeric(_) | Token::Text(_) => 4,
            Token::Patch(_) => 5,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Token::Numeric(_))
    }

    fn numeric_value(&self) -> u64 {
        match self {
            Token::Numeric(n) => *n,
            _ => 0,
        }
    }

    /// Suffix keyword for a letter run and the digits right after it, or
    /// `None` when the letters are an ordinary word.
    fn keyword(letters: &str, digits: &str) -> Option<Token> {
        let rev = parse_number(digits);
        let has_digits = !digits.is_empty();

        match letters.to_ascii_lowercase().as_str() {
            "alpha" => Some(Token::Alpha(rev)),
            "a" if has_digits => Some(Token::Alpha(rev)),
            "beta" => Some(Token::Beta(rev)),
            "b" if has_digits => Some(Token::Beta(rev)),
            "pre" => Some(Token::Pre(rev)),
            "rc" => Some(Token::Rc(rev)),
            "p" | "patch" => Some(Token::Patch(rev)),
            _ => None,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Token {}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank()).then_with(|| match (self, other) {
            (Token::Alpha(a), Token::Alpha(b))
            | (Token::Beta(a), Token::Beta(b))
            | (Token::Pre(a), Token::Pre(b))
            | (Token::Rc(a), Token::Rc(b))
            | (Token::Patch(a), Token::Patch(b)) => a.cmp(b),
            (Token::Text(a), Token::Text(b)) => a.cmp(b),
            // Words sit above every number in the "no suffix" rank, so a
            // lettered release (1.0.2a) sorts after its base (1.0.2).
            (Token::Text(_), _) => Ordering::Greater,
            (_, Token::Text(_)) => Ordering::Less,
            // Null pads as zero: 1.2 == 1.2.0
            _ => self.numeric_value().cmp(&other.numeric_value()),
        })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Null => Ok(()),
            Token::Numeric(n) => write!(f, "{n}"),
            Token::Text(s) => f.write_str(s),
            Token::Alpha(n) => write!(f, "alpha{n}"),
            Token::Beta(n) => write!(f, "beta{n}"),
            Token::Pre(n) => write!(f, "pre{n}"),
            Token::Rc(n) => write!(f, "rc{n}"),
            Token::Patch(n) => write!(f, "p{n}"),
        }
    }
}

/// Overlong digit runs saturate instead of failing the parse.
fn parse_number(digits: &str) -> u64 {
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// Split a version string into tokens at digit/letter/separator boundaries.
///
/// Only suffix keywords absorb the digits directly after them (`rc3`,
/// `p243`). Any other word stops at the boundary, so `build10` is a word
/// followed by the number 10.
fn tokenize(s: &str) -> Vec<Token> {
    let bytes = s.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        if bytes[i].is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            tokens.push(Token::Numeric(parse_number(&s[start..i])));
        } else if bytes[i].is_ascii_alphabetic() {
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
            let mut end = i;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            let letters = &s[start..i];
            match Token::keyword(letters, &s[i..end]) {
                Some(token) => {
                    tokens.push(token);
                    i = end;
                }
                None => tokens.push(Token::Text(letters.to_string())),
            }
        } else {
            i += 1;
        }
    }

    tokens
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Form {
    Null,
    Head { commit: Option<String> },
    Release,
}

/// A parsed, comparable version.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    tokens: Vec<Token>,
    form: Form,
    detected: bool,
}

impl Version {
    /// "No version". Older than every real version and equal to nothing,
    /// itself included.
    pub const NULL: Version = Version {
        raw: String::new(),
        tokens: Vec::new(),
        form: Form::Null,
        detected: false,
    };

    /// Parse an explicitly declared version string.
    pub fn parse(raw: &str) -> Version {
        let raw = raw.trim();

        let head_commit = match raw.strip_prefix("HEAD") {
            Some("") => Some(None),
            Some(rest) => rest.strip_prefix('-').map(|c| Some(c).filter(|c| !c.is_empty())),
            None => None,
        };
        if let Some(commit) = head_commit {
            let commit = commit.map(str::to_string);
            let raw = match &commit {
                Some(c) => format!("HEAD-{c}"),
                None => "HEAD".to_string(),
            };
            return Version {
                raw,
                tokens: Vec::new(),
                form: Form::Head { commit },
                detected: false,
            };
        }

        let tokens = tokenize(raw);
        if tokens.is_empty() {
            return Version::NULL;
        }

        Version {
            raw: raw.to_string(),
            tokens,
            form: Form::Release,
            detected: false,
        }
    }

    /// Detect a version from a download URL, preferring the VCS tag when one
    /// is given. See [`detect::detect`].
    pub fn detect(url: &str, tag: Option<&str>) -> Version {
        detect::detect(url, tag)
    }

    pub(crate) fn mark_detected(mut self) -> Version {
        if !self.is_null() {
            self.detected = true;
        }
        self
    }

    pub fn is_null(&self) -> bool {
        self.form == Form::Null
    }

    pub fn is_head(&self) -> bool {
        matches!(self.form, Form::Head { .. })
    }

    /// Whether this version was detected from a URL rather than declared.
    /// Provenance only; it never affects ordering.
    pub fn is_detected(&self) -> bool {
        self.detected
    }

    pub fn commit(&self) -> Option<&str> {
        match &self.form {
            Form::Head { commit } => commit.as_deref(),
            _ => None,
        }
    }

    /// Record the commit a HEAD version was built from. No-op for other
    /// versions.
    pub fn update_commit(&mut self, commit: &str) {
        if let Form::Head { commit: current } = &mut self.form {
            let commit = commit.trim();
            if commit.is_empty() {
                *current = None;
                self.raw = "HEAD".to_string();
            } else {
                *current = Some(commit.to_string());
                self.raw = format!("HEAD-{commit}");
            }
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn numeric_at(&self, index: usize) -> Option<u64> {
        match self.tokens.get(index) {
            Some(Token::Numeric(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn major(&self) -> Option<u64> {
        self.numeric_at(0)
    }

    pub fn minor(&self) -> Option<u64> {
        self.numeric_at(1)
    }

    pub fn patch(&self) -> Option<u64> {
        self.numeric_at(2)
    }

    /// `1.2.3` -> `1.2`
    pub fn major_minor(&self) -> Version {
        self.truncated(2)
    }

    /// `1.2.3.4` -> `1.2.3`
    pub fn major_minor_patch(&self) -> Version {
        self.truncated(3)
    }

    fn truncated(&self, parts: usize) -> Version {
        let joined = (0..parts)
            .map_while(|i| self.numeric_at(i))
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        Version::parse(&joined)
    }

    /// Leading `major.minor` as a float; NaN for [`Version::NULL`].
    pub fn to_f64(&self) -> f64 {
        if self.is_null() {
            return f64::NAN;
        }
        let mut end = 0;
        let mut seen_dot = false;
        for (i, c) in self.raw.char_indices() {
            if c.is_ascii_digit() {
                end = i + 1;
            } else if c == '.' && !seen_dot && end == i && end > 0 {
                seen_dot = true;
            } else {
                break;
            }
        }
        self.raw[..end].parse().unwrap_or(0.0)
    }

    /// Three-way comparison; `None` when the pair is incomparable (two NULLs).
    pub fn compare(&self, other: &Version) -> Option<Ordering> {
        match (self.is_null(), other.is_null()) {
            (true, true) => return None,
            (true, false) => return Some(Ordering::Less),
            (false, true) => return Some(Ordering::Greater),
            (false, false) => {}
        }

        match (self.is_head(), other.is_head()) {
            (true, true) => return Some(Ordering::Equal),
            (true, false) => return Some(Ordering::Greater),
            (false, true) => return Some(Ordering::Less),
            (false, false) => {}
        }

        let len = self.tokens.len().max(other.tokens.len());
        for i in 0..len {
            let a = self.tokens.get(i).unwrap_or(&Token::Null);
            let b = other.tokens.get(i).unwrap_or(&Token::Null);
            match a.cmp(b) {
                Ordering::Equal => continue,
                ord => return Some(ord),
            }
        }
        Some(Ordering::Equal)
    }

    /// Total ordering for sorting: like [`Version::compare`] but NULLs are
    /// equal to each other.
    pub fn total_cmp(&self, other: &Version) -> Ordering {
        self.compare(other).unwrap_or(Ordering::Equal)
    }

    /// Compare against a loosely typed value (e.g. a `version` field from
    /// formula JSON). Strings and non-negative integers are parsed; anything
    /// else is incomparable.
    pub fn compare_value(&self, other: &serde_json::Value) -> Option<Ordering> {
        let other = coerce_value(other)?;
        self.compare(&other)
    }

    /// Strict form of [`Version::compare_value`]: a value that cannot be
    /// coerced to a version is an error.
    pub fn try_cmp_value(&self, other: &serde_json::Value) -> Result<Ordering> {
        let other = coerce_value(other).ok_or_else(|| BrewError::InvalidComparison {
            found: json_kind(other).to_string(),
        })?;
        // NULL orders below everything, itself included.
        Ok(self.compare(&other).unwrap_or(Ordering::Less))
    }
}

fn coerce_value(value: &serde_json::Value) -> Option<Version> {
    match value {
        serde_json::Value::String(s) => Some(Version::parse(s)),
        serde_json::Value::Number(n) => n.as_u64().map(|n| Version::parse(&n.to_string())),
        _ => None,
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "nil",
        serde_json::Value::Bool(_) => "Boolean",
        serde_json::Value::Number(_) => "Number",
        serde_json::Value::String(_) => "String",
        serde_json::Value::Array(_) => "Array",
        serde_json::Value::Object(_) => "Hash",
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Version::parse(s))
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Version::parse(s)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        *self == Version::parse(other)
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        *self == Version::parse(other)
    }
}

impl PartialEq<String> for Version {
    fn eq(&self, other: &String) -> bool {
        *self == Version::parse(other)
    }
}

impl PartialOrd<str> for Version {
    fn partial_cmp(&self, other: &str) -> Option<Ordering> {
        self.compare(&Version::parse(other))
    }
}

impl PartialOrd<&str> for Version {
    fn partial_cmp(&self, other: &&str) -> Option<Ordering> {
        self.compare(&Version::parse(other))
    }
}

impl PartialOrd<String> for Version {
    fn partial_cmp(&self, other: &String) -> Option<Ordering> {
        self.compare(&Version::parse(other))
    }
}

macro_rules! compare_with_integer {
    ($($int:ty),*) => {
        $(
            impl PartialEq<$int> for Version {
                fn eq(&self, other: &$int) -> bool {
                    self.partial_cmp(other) == Some(Ordering::Equal)
                }
            }

            impl PartialOrd<$int> for Version {
                #[allow(unused_comparisons)]
                fn partial_cmp(&self, other: &$int) -> Option<Ordering> {
                    if *other < 0 {
                        return None;
                    }
                    self.compare(&Version::parse(&other.to_string()))
                }
            }
        )*
    };
}

compare_with_integer!(u32, u64, usize, i32, i64);

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Version::parse(&raw))
    }
}

/// An installed package version: the formula version plus its `_N` revision.
///
/// ```
/// use brewkit::version::PkgVersion;
///
/// let keg = PkgVersion::parse("1.4.0_32");
/// assert_eq!(keg.revision(), 32);
/// assert_eq!(keg.version().to_string(), "1.4.0");
/// assert!(keg > PkgVersion::parse("1.4.0_31"));
/// ```
#[derive(Debug, Clone)]
pub struct PkgVersion {
    version: Version,
    revision: u32,
}

impl PkgVersion {
    pub fn new(version: Version, revision: u32) -> Self {
        Self { version, revision }
    }

    /// Split a trailing `_<digits>` revision off a keg version string.
    /// Underscores followed by anything else stay part of the version.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(pos) = raw.rfind('_') {
            let suffix = &raw[pos + 1..];
            if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(revision) = suffix.parse() {
                    return Self::new(Version::parse(&raw[..pos]), revision);
                }
            }
        }
        Self::new(Version::parse(raw), 0)
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn is_head(&self) -> bool {
        self.version.is_head()
    }

    pub fn compare(&self, other: &PkgVersion) -> Option<Ordering> {
        match self.version.compare(&other.version)? {
            Ordering::Equal => Some(self.revision.cmp(&other.revision)),
            ord => Some(ord),
        }
    }

    /// Ordering for sorting; see [`Version::total_cmp`].
    pub fn total_cmp(&self, other: &PkgVersion) -> Ordering {
        self.version
            .total_cmp(&other.version)
            .then(self.revision.cmp(&other.revision))
    }
}

impl PartialEq for PkgVersion {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for PkgVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl fmt::Display for PkgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.revision == 0 {
            write!(f, "{}", self.version)
        } else {
            write!(f, "{}_{}", self.version, self.revision)
        }
    }
}

impl Serialize for PkgVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(s: &str) -> Version {
        Version::parse(s)
    }

    #[test]
    fn test_tokenize_splits_on_boundaries() {
        let tokens = tokenize("1.2.3rc3");
        assert_eq!(
            tokens,
            vec![
                Token::Numeric(1),
                Token::Numeric(2),
                Token::Numeric(3),
                Token::Rc(3)
            ]
        );

        let tokens = tokenize("2.0_beta-1+build");
        assert_eq!(tokens.len(), 5);
        assert!(matches!(tokens[2], Token::Beta(0)));
        assert!(matches!(tokens[4], Token::Text(ref s) if s == "build"));
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert!(matches!(Token::keyword("RC", "2"), Some(Token::Rc(2))));
        assert!(matches!(Token::keyword("Alpha", ""), Some(Token::Alpha(0))));
        assert!(matches!(Token::keyword("a", "1"), Some(Token::Alpha(1))));
        assert!(matches!(Token::keyword("b", "7"), Some(Token::Beta(7))));
        assert!(matches!(Token::keyword("p", "243"), Some(Token::Patch(243))));
        assert!(matches!(Token::keyword("patch", ""), Some(Token::Patch(0))));
        // Bare single letters are lettered releases, not pre-releases
        assert!(Token::keyword("a", "").is_none());
        assert!(Token::keyword("b", "").is_none());
        assert!(Token::keyword("build", "10").is_none());
    }

    #[test]
    fn test_plain_words_release_their_digits() {
        assert_eq!(
            tokenize("1.0.0-build10"),
            vec![
                Token::Numeric(1),
                Token::Numeric(0),
                Token::Numeric(0),
                Token::Text("build".to_string()),
                Token::Numeric(10)
            ]
        );
        assert!(v("1.0-build9") < v("1.0-build10"));
        assert!(v("2.1-ubuntu3") < v("2.1-ubuntu10"));
        assert!(v("1.0.0-build10") > v("1.0.0-build9"));
    }

    #[test]
    fn test_padding_is_zero() {
        assert_eq!(v("1.2"), v("1.2.0"));
        assert_eq!(v("1.2"), v("1.2.0.0"));
        assert!(v("1.2") < v("1.2.1"));
    }

    #[test]
    fn test_suffix_rank() {
        assert!(v("1.0alpha") < v("1.0beta"));
        assert!(v("1.0beta") < v("1.0pre"));
        assert!(v("1.0pre") < v("1.0rc"));
        assert!(v("1.0rc") < v("1.0"));
        assert!(v("1.0") < v("1.0-p1"));
        assert!(v("1.0rc1") < v("1.0rc2"));
        assert!(v("1.0-p1") < v("1.0-p2"));
    }

    #[test]
    fn test_numeric_not_lexical() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("10.0") > v("9.99.99"));
    }

    #[test]
    fn test_lettered_release_after_base() {
        assert!(v("1.0.2a") > v("1.0.2"));
        assert!(v("1.0.2b") > v("1.0.2a"));
    }

    #[test]
    fn test_head() {
        let head = v("HEAD-abc123");
        assert!(head.is_head());
        assert_eq!(head.commit(), Some("abc123"));
        assert_eq!(head, v("HEAD-def456"));
        assert!(head > v("9999"));
        assert!(v("HEAD") > v("1.0-p99"));
    }

    #[test]
    fn test_head_is_anchored() {
        let header = v("HEADER");
        assert!(!header.is_head());
        assert!(header < v("HEAD"));
        assert_eq!(header.to_string(), "HEADER");

        let branch = v("HEAD-main");
        assert!(branch.is_head());
        assert_eq!(branch.commit(), Some("main"));
        assert_eq!(branch.to_string(), "HEAD-main");

        assert!(v("HEAD-").is_head());
        assert_eq!(v("HEAD-").commit(), None);
    }

    #[test]
    fn test_update_commit_keeps_ordering() {
        let mut head = v("HEAD");
        head.update_commit("deadbeef");
        assert_eq!(head.to_string(), "HEAD-deadbeef");
        assert_eq!(head.commit(), Some("deadbeef"));
        assert_eq!(head, v("HEAD"));

        let mut release = v("1.0");
        release.update_commit("deadbeef");
        assert_eq!(release.to_string(), "1.0");
    }

    #[test]
    fn test_null_sentinel() {
        let null = Version::NULL;
        assert!(null.is_null());
        assert!(null < v("0"));
        assert!(v("0") > null);
        assert!(null != Version::NULL);
        assert_eq!(null.compare(&Version::NULL), None);
        assert!(null.to_f64().is_nan());
        assert_eq!(null.to_string(), "");
    }

    #[test]
    fn test_unparseable_is_null() {
        assert!(v("").is_null());
        assert!(v("   ").is_null());
        assert!(v("-._+").is_null());
    }

    #[test]
    fn test_string_and_integer_coercion() {
        assert!(v("1.2.3") == "1.2.3");
        assert!(v("1.2.3") > "1.2");
        assert!(v("2") == 2u32);
        assert!(v("2.1") > 2i32);
        assert_eq!(v("1").partial_cmp(&-1i64), None);
    }

    #[test]
    fn test_compare_value() {
        let version = v("1.2");
        assert_eq!(version.compare_value(&json!("1.2.0")), Some(Ordering::Equal));
        assert_eq!(version.compare_value(&json!(1)), Some(Ordering::Greater));
        assert_eq!(version.compare_value(&json!({"stable": "1.2"})), None);
        assert_eq!(version.compare_value(&json!(true)), None);
    }

    #[test]
    fn test_try_cmp_value_is_strict() {
        let version = v("1.2");
        assert_eq!(version.try_cmp_value(&json!("1.3")).unwrap(), Ordering::Less);
        let err = version.try_cmp_value(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, BrewError::InvalidComparison { .. }));
        assert_eq!(err.to_string(), "comparison of Version with Array failed");
        assert_eq!(
            Version::NULL.try_cmp_value(&json!("")).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_accessors() {
        let version = v("1.2.3.4");
        assert_eq!(version.major(), Some(1));
        assert_eq!(version.minor(), Some(2));
        assert_eq!(version.patch(), Some(3));
        assert_eq!(version.major_minor().to_string(), "1.2");
        assert_eq!(version.major_minor_patch().to_string(), "1.2.3");
        assert_eq!(v("8").minor(), None);
        assert!(v("HEAD").major_minor().is_null());
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(v("1.2.3").to_f64(), 1.2);
        assert_eq!(v("10").to_f64(), 10.0);
        assert_eq!(v("HEAD").to_f64(), 0.0);
    }

    #[test]
    fn test_serde_roundtrip_keeps_text() {
        let json = serde_json::to_string(&v("1.2.3-p34")).unwrap();
        assert_eq!(json, "\"1.2.3-p34\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("1.2.3-p34"));
    }

    #[test]
    fn test_pkg_version_revision() {
        assert_eq!(PkgVersion::parse("1.4.0_32").revision(), 32);
        assert_eq!(PkgVersion::parse("2.14.1_1").version().to_string(), "2.14.1");
        assert_eq!(PkgVersion::parse("8.0").revision(), 0);
        assert_eq!(PkgVersion::parse("1.0_beta").to_string(), "1.0_beta");
        assert_eq!(PkgVersion::parse("1.0_beta_2").version().to_string(), "1.0_beta");
        assert_eq!(PkgVersion::parse("1.0_").revision(), 0);
    }

    #[test]
    fn test_pkg_version_ordering() {
        assert!(PkgVersion::parse("1.4.0_32") > PkgVersion::parse("1.4.0_31"));
        assert!(PkgVersion::parse("1.4.0_32") < PkgVersion::parse("1.4.1"));
        assert_eq!(
            PkgVersion::parse("1.4.0_1"),
            PkgVersion::new(v("1.4.0"), 1)
        );
        assert_eq!(PkgVersion::parse("3.0_2").to_string(), "3.0_2");
    }
}
