//! Version and constraint algebra.
//!
//! `Version` implements a PEP 440-flavored total order: release segments of
//! arbitrary length compared component-wise, pre-release/dev/post segments
//! ordered below/above the plain release, and a local-version segment
//! compared lexicographically after everything else.
//!
//! `Specifier` is a single `(operator, version)` clause. `RangeSpecifier` is a
//! conjunctive set of `Specifier`s, intersected together into a single range.

use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a version or specifier string cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The version string did not match the expected grammar.
    #[error("invalid version: {0}")]
    InvalidVersion(String),
    /// The specifier string did not match `(operator)(version)`.
    #[error("invalid specifier: {0}")]
    InvalidSpecifier(String),
}

/// Local-version segment, compared per PEP 440: numeric segments always
/// outrank alphanumeric ones, numeric segments compare numerically, and
/// alphanumeric segments compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LocalSegment {
    Numeric(u64),
    Alpha(String),
}

impl Ord for LocalSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Alpha(a), Self::Alpha(b)) => a.cmp(b),
            (Self::Numeric(_), Self::Alpha(_)) => Ordering::Greater,
            (Self::Alpha(_), Self::Numeric(_)) => Ordering::Less,
        }
    }
}
impl PartialOrd for LocalSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Alpha(s) => write!(f, "{s}"),
        }
    }
}

/// Pre-release kind, ordered `Alpha < Beta < Rc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum PreKind {
    Alpha,
    Beta,
    Rc,
}

/// A bound used to splice "no pre-release"/"no dev"/"no local segment" into
/// the comparison key at the correct position, mirroring the `packaging`
/// library's `_cmpkey` construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Bound<T: Ord> {
    NegInf,
    Value(T),
    PosInf,
}

/// A parsed, totally-ordered version identifier.
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: SmallVec<[u64; 4]>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: SmallVec<[LocalSegment; 2]>,
    original: String,
}

impl Version {
    /// Parse a version string.
    ///
    /// # Errors
    /// Returns [`ParseError::InvalidVersion`] if the string doesn't contain a
    /// numeric release segment.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let original = input.trim().to_string();
        let mut s = original.trim_start_matches(['v', 'V']);

        let epoch = if let Some(bang) = s.find('!') {
            let (head, rest) = s.split_at(bang);
            let epoch = head
                .parse::<u64>()
                .map_err(|_| ParseError::InvalidVersion(original.clone()))?;
            s = &rest[1..];
            epoch
        } else {
            0
        };

        // Release segment: leading run of `\d+(\.\d+)*`
        let release_end = {
            let mut end = 0;
            let bytes = s.as_bytes();
            let mut i = 0;
            let mut expect_digit = true;
            while i < bytes.len() {
                let c = bytes[i] as char;
                if expect_digit {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                        i += 1;
                    }
                    end = i;
                    expect_digit = false;
                } else if c == '.' {
                    i += 1;
                    expect_digit = true;
                } else {
                    break;
                }
            }
            end
        };
        if release_end == 0 {
            return Err(ParseError::InvalidVersion(original));
        }
        let release: SmallVec<[u64; 4]> = s[..release_end]
            .split('.')
            .map(|p| p.parse::<u64>().unwrap_or(0))
            .collect();
        let mut rest = &s[release_end..];

        let pre = parse_pre(&mut rest);
        let post = parse_post(&mut rest);
        let dev = parse_dev(&mut rest);
        let local = parse_local(&mut rest);

        if !rest.is_empty() {
            return Err(ParseError::InvalidVersion(original));
        }

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
            original,
        })
    }

    /// Release segments, e.g. `[1, 2, 3]` for `1.2.3`.
    #[must_use]
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// `true` if this version carries a pre-release or dev segment.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// `true` if this version carries a dev segment.
    #[must_use]
    pub const fn is_dev(&self) -> bool {
        self.dev.is_some()
    }

    /// The release segments as a `major.minor.patch...` string, ignoring
    /// epoch, pre/post/dev and local segments. Used by wildcard matching.
    #[must_use]
    pub fn release_str(&self) -> String {
        self.release
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    fn cmp_key(
        &self,
    ) -> (
        u64,
        SmallVec<[u64; 4]>,
        Bound<(PreKind, u64)>,
        Bound<u64>,
        Bound<u64>,
        Bound<SmallVec<[LocalSegment; 2]>>,
    ) {
        let mut release = self.release.clone();
        while release.len() > 1 && *release.last().unwrap() == 0 {
            release.pop();
        }

        let pre = if self.pre.is_none() && self.post.is_none() && self.dev.is_some() {
            Bound::NegInf
        } else if let Some(p) = self.pre {
            Bound::Value(p)
        } else {
            Bound::PosInf
        };

        let post = self.post.map_or(Bound::NegInf, Bound::Value);
        let dev = self.dev.map_or(Bound::PosInf, Bound::Value);
        let local = if self.local.is_empty() {
            Bound::NegInf
        } else {
            Bound::Value(self.local.clone())
        };

        (self.epoch, release, pre, post, dev, local)
    }
}

fn parse_pre(rest: &mut &str) -> Option<(PreKind, u64)> {
    let s = rest.trim_start_matches(['.', '-', '_']);
    let (kind, tail) = if let Some(t) = s.strip_prefix("alpha").or_else(|| s.strip_prefix('a')) {
        (PreKind::Alpha, t)
    } else if let Some(t) = s.strip_prefix("beta").or_else(|| s.strip_prefix('b')) {
        (PreKind::Beta, t)
    } else if let Some(t) = s
        .strip_prefix("rc")
        .or_else(|| s.strip_prefix('c'))
        .or_else(|| s.strip_prefix("pre"))
    {
        (PreKind::Rc, t)
    } else {
        return None;
    };
    let tail = tail.trim_start_matches(['.', '-', '_']);
    let digits_end = tail.bytes().take_while(u8::is_ascii_digit).count();
    let num: u64 = tail[..digits_end].parse().unwrap_or(0);
    *rest = &tail[digits_end..];
    Some((kind, num))
}

fn parse_post(rest: &mut &str) -> Option<u64> {
    let s = *rest;
    let stripped = s
        .strip_prefix(".post")
        .or_else(|| s.strip_prefix("-post"))
        .or_else(|| s.strip_prefix("_post"))
        .or_else(|| s.strip_prefix(".rev"))
        .or_else(|| s.strip_prefix("post"))
        .or_else(|| {
            // Implicit post-release shorthand: "-N"
            s.strip_prefix('-')
                .filter(|t| t.bytes().next().is_some_and(|b| b.is_ascii_digit()))
        });
    let tail = stripped?.trim_start_matches(['.', '-', '_']);
    let digits_end = tail.bytes().take_while(u8::is_ascii_digit).count();
    let num: u64 = tail[..digits_end].parse().unwrap_or(0);
    *rest = &tail[digits_end..];
    Some(num)
}

fn parse_dev(rest: &mut &str) -> Option<u64> {
    let s = *rest;
    let stripped = s
        .strip_prefix(".dev")
        .or_else(|| s.strip_prefix("-dev"))
        .or_else(|| s.strip_prefix("_dev"))
        .or_else(|| s.strip_prefix("dev"))?;
    let tail = stripped.trim_start_matches(['.', '-', '_']);
    let digits_end = tail.bytes().take_while(u8::is_ascii_digit).count();
    let num: u64 = tail[..digits_end].parse().unwrap_or(0);
    *rest = &tail[digits_end..];
    Some(num)
}

fn parse_local(rest: &mut &str) -> SmallVec<[LocalSegment; 2]> {
    let s = *rest;
    let Some(tail) = s.strip_prefix('+') else {
        return SmallVec::new();
    };
    *rest = "";
    tail.split(['.', '-', '_'])
        .map(|seg| {
            seg.parse::<u64>()
                .map_or_else(|_| LocalSegment::Alpha(seg.to_ascii_lowercase()), LocalSegment::Numeric)
        })
        .collect()
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_key() == other.cmp_key()
    }
}
impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_key().cmp(&other.cmp_key())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl FromStr for Version {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Clause operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Compatible,
    ArbitraryEq,
}

impl Operator {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Compatible => "~=",
            Self::ArbitraryEq => "===",
        }
    }
}

/// A single `(operator, version)` clause, with an optional `.*` wildcard
/// suffix on the version (only meaningful for `==`/`!=`).
#[derive(Debug, Clone)]
pub struct Specifier {
    operator: Operator,
    version: Version,
    wildcard: bool,
    raw: String,
}

impl Specifier {
    /// Parse a single specifier clause such as `>=1.0.0` or `==1.2.*`.
    ///
    /// # Errors
    /// Returns [`ParseError`] if the operator is missing/unknown or the
    /// version segment fails to parse.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let raw = input.trim().to_string();
        let s = raw.as_str();

        const OPERATORS: &[(&str, Operator)] = &[
            ("===", Operator::ArbitraryEq),
            ("~=", Operator::Compatible),
            ("==", Operator::Eq),
            ("!=", Operator::Ne),
            ("<=", Operator::Le),
            (">=", Operator::Ge),
            ("<", Operator::Lt),
            (">", Operator::Gt),
        ];

        let (operator, version_str) = OPERATORS
            .iter()
            .find(|(op, _)| s.starts_with(op))
            .map(|(op, kind)| (*kind, s[op.len()..].trim()))
            .ok_or_else(|| ParseError::InvalidSpecifier(raw.clone()))?;

        let (version_str, wildcard) = if let Some(stripped) = version_str.strip_suffix(".*") {
            (stripped, true)
        } else {
            (version_str, false)
        };

        if wildcard && !matches!(operator, Operator::Eq | Operator::Ne) {
            return Err(ParseError::InvalidSpecifier(raw));
        }
        if operator == Operator::ArbitraryEq {
            // Arbitrary equality compares the raw string, but we still need
            // *a* Version for storage; best-effort parse, falling back to a
            // zero release so `contains` can use the string comparison path.
            let version = Version::parse(version_str).unwrap_or_else(|_| Version {
                epoch: 0,
                release: SmallVec::from_slice(&[0]),
                pre: None,
                post: None,
                dev: None,
                local: SmallVec::new(),
                original: version_str.to_string(),
            });
            return Ok(Self {
                operator,
                version,
                wildcard: false,
                raw,
            });
        }

        let version = Version::parse(version_str)?;
        Ok(Self {
            operator,
            version,
            wildcard,
            raw,
        })
    }

    /// The clause's operator.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// The clause's version operand.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.version
    }

    /// `true` if the version operand is itself a pre-release/dev version.
    #[must_use]
    pub fn mentions_prerelease(&self) -> bool {
        self.version.is_prerelease()
    }

    /// Test membership of `version` in this single clause.
    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        match self.operator {
            Operator::ArbitraryEq => version.original == self.version.original,
            Operator::Eq if self.wildcard => {
                version.release_str().starts_with(&self.version.release_str())
            }
            Operator::Ne if self.wildcard => {
                !version.release_str().starts_with(&self.version.release_str())
            }
            Operator::Eq => version == &self.version,
            Operator::Ne => version != &self.version,
            Operator::Lt => version < &self.version,
            Operator::Le => version <= &self.version,
            Operator::Gt => version > &self.version,
            Operator::Ge => version >= &self.version,
            Operator::Compatible => {
                // `~= X.Y.Z` == `>= X.Y.Z, == X.Y.*` (drop the last release
                // segment for the prefix match).
                let mut prefix = self.version.release.clone();
                prefix.pop();
                let prefix_str = prefix
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(".");
                version >= &self.version && version.release_str().starts_with(&prefix_str)
            }
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for Specifier {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator && self.version == other.version && self.wildcard == other.wildcard
    }
}
impl Eq for Specifier {}

/// A conjunctive set of [`Specifier`]s: `v ∈ R ⟺ ∀ s ∈ R: v ∈ s`.
#[derive(Debug, Clone, Default)]
pub struct RangeSpecifier {
    specifiers: Vec<Specifier>,
}

impl RangeSpecifier {
    /// The empty range (matches everything).
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list of clauses, e.g. `>=1.0,<2.0`.
    ///
    /// # Errors
    /// Returns [`ParseError`] if any clause fails to parse.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        if input.is_empty() || input == "*" {
            return Ok(Self::any());
        }
        let mut specifiers: Vec<Specifier> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Specifier::parse)
            .collect::<Result<_, _>>()?;
        specifiers.sort_by(|a, b| {
            a.operator
                .as_str()
                .cmp(b.operator.as_str())
                .then_with(|| a.version.cmp(&b.version))
        });
        Ok(Self { specifiers })
    }

    /// All clauses, canonically ordered (sorted by operator then version so
    /// equivalent sets compare equal).
    #[must_use]
    pub fn specifiers(&self) -> &[Specifier] {
        &self.specifiers
    }

    /// `true` if this range has no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// Whether this range should admit pre-release versions: `true` if any
    /// clause's own version operand is a pre-release. The "no stable match"
    /// widening is decided by the caller (the `Group` that owns this range),
    /// since it requires knowledge of the candidate set.
    #[must_use]
    pub fn mentions_prerelease(&self) -> bool {
        self.specifiers.iter().any(Specifier::mentions_prerelease)
    }

    /// Membership test, honoring pre-release exclusion unless `allow_pre` or
    /// the range itself mentions a pre-release.
    #[must_use]
    pub fn contains(&self, version: &Version, allow_pre: bool) -> bool {
        if version.is_prerelease() && !allow_pre && !self.mentions_prerelease() {
            return false;
        }
        self.specifiers.iter().all(|s| s.contains(version))
    }

    /// Intersect two ranges: the union of their clauses (conjunction already
    /// means "AND", so this is just concatenation followed by
    /// canonicalization).
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let mut specifiers = self.specifiers.clone();
        specifiers.extend(other.specifiers.iter().cloned());
        specifiers.sort_by(|a, b| {
            a.operator
                .as_str()
                .cmp(b.operator.as_str())
                .then_with(|| a.version.cmp(&b.version))
        });
        specifiers.dedup_by(|a, b| a == b);
        Self { specifiers }
    }
}

impl fmt::Display for RangeSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.specifiers.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl PartialEq for RangeSpecifier {
    fn eq(&self, other: &Self) -> bool {
        self.specifiers == other.specifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("1.0.0", "1.0.0", Ordering::Equal)]
    #[test_case("1.0.0", "1.0.1", Ordering::Less)]
    #[test_case("1.0.0a1", "1.0.0", Ordering::Less; "prerelease below release")]
    #[test_case("1.0.0.dev1", "1.0.0a1", Ordering::Less; "dev below alpha")]
    #[test_case("1.0.0.post1", "1.0.0", Ordering::Greater; "post above release")]
    #[test_case("1.0+local.1", "1.0", Ordering::Greater; "local above bare")]
    #[test_case("1.0", "1.0.0", Ordering::Equal; "trailing zero insignificant")]
    #[test_case("2!1.0", "1.0", Ordering::Greater; "epoch dominates")]
    fn version_ordering(a: &str, b: &str, expected: Ordering) {
        let va = Version::parse(a).unwrap();
        let vb = Version::parse(b).unwrap();
        assert_eq!(va.cmp(&vb), expected, "{a} vs {b}");
    }

    #[test]
    fn prerelease_detection() {
        assert!(Version::parse("1.0.0a1").unwrap().is_prerelease());
        assert!(Version::parse("1.0.0.dev0").unwrap().is_prerelease());
        assert!(!Version::parse("1.0.0").unwrap().is_prerelease());
        assert!(!Version::parse("1.0.0.post1").unwrap().is_prerelease());
    }

    #[test]
    fn specifier_eq_wildcard_is_prefix() {
        let s = Specifier::parse("==1.2.*").unwrap();
        assert!(s.contains(&Version::parse("1.2.5").unwrap()));
        assert!(!s.contains(&Version::parse("1.3.0").unwrap()));
    }

    #[test]
    fn specifier_ne_wildcard_excludes_prefix() {
        let s = Specifier::parse("!=1.2.*").unwrap();
        assert!(!s.contains(&Version::parse("1.2.5").unwrap()));
        assert!(s.contains(&Version::parse("1.3.0").unwrap()));
    }

    #[test]
    fn compatible_release_unfolds() {
        // ~= 2.2.1  is  >=2.2.1, ==2.2.*
        let s = Specifier::parse("~=2.2.1").unwrap();
        assert!(s.contains(&Version::parse("2.2.1").unwrap()));
        assert!(s.contains(&Version::parse("2.2.9").unwrap()));
        assert!(!s.contains(&Version::parse("2.3.0").unwrap()));
        assert!(!s.contains(&Version::parse("2.2.0").unwrap()));
    }

    #[test]
    fn prerelease_excluded_by_default() {
        let r = RangeSpecifier::parse(">=1.0").unwrap();
        assert!(!r.contains(&Version::parse("1.0a1").unwrap(), false));
        assert!(r.contains(&Version::parse("0.9").unwrap(), false));
    }

    #[test]
    fn prerelease_included_when_mentioned() {
        let r = RangeSpecifier::parse(">=1.0a0").unwrap();
        assert!(r.contains(&Version::parse("1.0a1").unwrap(), false));
    }

    #[test]
    fn range_intersection_is_conjunctive() {
        let a = RangeSpecifier::parse(">=1.0").unwrap();
        let b = RangeSpecifier::parse("<2.0").unwrap();
        let r = a.intersect(&b);
        assert!(r.contains(&Version::parse("1.5").unwrap(), false));
        assert!(!r.contains(&Version::parse("2.0").unwrap(), false));
        assert!(!r.contains(&Version::parse("0.5").unwrap(), false));
    }

    #[test]
    fn canonicalized_ranges_compare_equal() {
        let a = RangeSpecifier::parse(">=1.0,<2.0").unwrap();
        let b = RangeSpecifier::parse("<2.0,>=1.0").unwrap();
        assert_eq!(a.to_string(), b.to_string());
    }

    proptest! {
        #[test]
        fn prop_intersection_consistent(
            major1 in 0u64..10, minor1 in 0u64..10,
            major2 in 0u64..10, minor2 in 0u64..10,
            vmajor in 0u64..10, vminor in 0u64..10,
        ) {
            let a = RangeSpecifier::parse(&format!(">={major1}.{minor1}")).unwrap();
            let b = RangeSpecifier::parse(&format!("<{major2}.{minor2}")).unwrap();
            let v = Version::parse(&format!("{vmajor}.{vminor}")).unwrap();
            let combined = a.intersect(&b);
            prop_assert_eq!(
                combined.contains(&v, true),
                a.contains(&v, true) && b.contains(&v, true)
            );
        }

        #[test]
        fn prop_ordering_total(
            a_major in 0u64..5, a_minor in 0u64..5, a_patch in 0u64..5,
            b_major in 0u64..5, b_minor in 0u64..5, b_patch in 0u64..5,
        ) {
            let a = Version::parse(&format!("{a_major}.{a_minor}.{a_patch}")).unwrap();
            let b = Version::parse(&format!("{b_major}.{b_minor}.{b_patch}")).unwrap();
            let ab = a.cmp(&b);
            let ba = b.cmp(&a);
            prop_assert_eq!(ab.reverse(), ba, "antisymmetry");
            if ab == Ordering::Equal {
                prop_assert_eq!(a, b);
            }
        }
    }
}
