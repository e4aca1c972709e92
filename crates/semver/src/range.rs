use crate::{Identifier, ParseVersionError, Version};
use derive_more::{Display, Error};
use miette::Diagnostic;
use std::str::FromStr;

/// A version constraint expression from a manifest.
///
/// The grammar follows npm: `||`-separated disjuncts, each a
/// whitespace-separated list of comparator atoms that must all match.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRange {
    disjuncts: Vec<Vec<Comparator>>,
}

/// One comparator atom of a range expression.
#[derive(Debug, Clone, PartialEq)]
enum Comparator {
    GreaterThan(Version),
    GreaterThanOrEqualTo(Version),
    LessThan(Version),
    LessThanOrEqualTo(Version),
    /// `~`: same major and minor, at least the given patch.
    Tilde(Version),
    /// `^`: compatible with the left-most nonzero component.
    Caret(Version),
    /// Inclusive hyphen range `a - b`.
    Between(Version, Version),
    /// An exact version, possibly with wildcard components (`1.x`, `*`).
    Exact(Pattern),
}

/// A version pattern whose components may be wildcards or missing:
/// `1`, `1.2`, `1.x`, `1.2.x`, `*`.
#[derive(Debug, Clone, PartialEq)]
struct Pattern {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre_release: Vec<Identifier>,
}

impl Pattern {
    fn matches(&self, version: &Version) -> bool {
        fn component(pattern: Option<u64>, actual: u64) -> bool {
            pattern.is_none() || pattern == Some(actual)
        }
        component(self.major, version.major)
            && component(self.minor, version.minor)
            && component(self.patch, version.patch)
            && self.pre_release == version.pre_release
    }

    /// Interpret the pattern as a concrete version, missing components
    /// becoming zero. This is how comparator operands are read: `>=1.2`
    /// means `>=1.2.0`.
    fn at_least(self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre_release: self.pre_release,
            build: Vec::new(),
        }
    }
}

impl Comparator {
    fn matches(&self, version: &Version) -> bool {
        match self {
            Comparator::GreaterThan(bound) => version > bound,
            Comparator::GreaterThanOrEqualTo(bound) => version >= bound,
            Comparator::LessThan(bound) => version < bound,
            Comparator::LessThanOrEqualTo(bound) => version <= bound,
            Comparator::Tilde(base) => {
                version.major == base.major && version.minor == base.minor && version >= base
            }
            Comparator::Caret(base) => {
                if base.major > 0 {
                    version.major == base.major && version >= base
                } else if base.minor > 0 {
                    version.major == 0 && version.minor == base.minor && version >= base
                } else {
                    version.major == 0
                        && version.minor == 0
                        && version.patch == base.patch
                        && version >= base
                }
            }
            Comparator::Between(low, high) => low <= version && version <= high,
            Comparator::Exact(pattern) => pattern.matches(version),
        }
    }

    /// Whether this comparator names a prerelease of the same
    /// `major.minor.patch` triple as `version`. Such a comparator opts the
    /// triple into prerelease selection.
    fn has_pre_release_pivot(&self, version: &Version) -> bool {
        fn pivot(operand: &Version, version: &Version) -> bool {
            !operand.pre_release.is_empty()
                && operand.major == version.major
                && operand.minor == version.minor
                && operand.patch == version.patch
        }
        match self {
            Comparator::GreaterThan(operand)
            | Comparator::GreaterThanOrEqualTo(operand)
            | Comparator::LessThan(operand)
            | Comparator::LessThanOrEqualTo(operand)
            | Comparator::Tilde(operand)
            | Comparator::Caret(operand) => pivot(operand, version),
            Comparator::Between(low, high) => pivot(low, version) || pivot(high, version),
            Comparator::Exact(pattern) => {
                !pattern.pre_release.is_empty()
                    && pattern.major == Some(version.major)
                    && pattern.minor == Some(version.minor)
                    && pattern.patch == Some(version.patch)
            }
        }
    }
}

/// Error when parsing [`VersionRange`] from a string input.
#[derive(Debug, Display, Error, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseRangeError {
    #[display("invalid version operand in range: {_0}")]
    #[diagnostic(code(yap_semver::invalid_range_operand))]
    InvalidOperand(#[error(source)] ParseVersionError),

    #[display("dangling `-` in range expression {text:?}")]
    #[diagnostic(code(yap_semver::dangling_hyphen))]
    DanglingHyphen { text: String },
}

impl FromStr for VersionRange {
    type Err = ParseRangeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let disjuncts = text
            .split("||")
            .map(parse_conjunction)
            .collect::<Result<Vec<_>, ParseRangeError>>()?;
        Ok(VersionRange { disjuncts })
    }
}

fn parse_conjunction(text: &str) -> Result<Vec<Comparator>, ParseRangeError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut comparators = Vec::new();
    let mut index = 0;
    while index < tokens.len() {
        // A bare `-` between two version tokens is the inclusive range form.
        if tokens.get(index + 1) == Some(&"-") {
            let high = tokens
                .get(index + 2)
                .ok_or_else(|| ParseRangeError::DanglingHyphen { text: text.trim().to_string() })?;
            let low = parse_pattern(tokens[index])?.at_least();
            let high = parse_pattern(high)?.at_least();
            comparators.push(Comparator::Between(low, high));
            index += 3;
        } else {
            comparators.push(parse_atom(tokens[index])?);
            index += 1;
        }
    }
    Ok(comparators)
}

/// Recognize an atom by its operator prefix, longest first: `>=` must not be
/// read as `>` followed by a version starting with `=`.
fn parse_atom(token: &str) -> Result<Comparator, ParseRangeError> {
    if let Some(operand) = token.strip_prefix(">=") {
        return Ok(Comparator::GreaterThanOrEqualTo(parse_pattern(operand)?.at_least()));
    }
    if let Some(operand) = token.strip_prefix("<=") {
        return Ok(Comparator::LessThanOrEqualTo(parse_pattern(operand)?.at_least()));
    }
    if let Some(operand) = token.strip_prefix('>') {
        return Ok(Comparator::GreaterThan(parse_pattern(operand)?.at_least()));
    }
    if let Some(operand) = token.strip_prefix('<') {
        return Ok(Comparator::LessThan(parse_pattern(operand)?.at_least()));
    }
    if let Some(operand) = token.strip_prefix('~') {
        let pattern = parse_pattern(operand)?;
        // `~1` has no minor to pin; it degenerates to the pattern `1.x.x`.
        return Ok(match pattern.minor {
            Some(_) => Comparator::Tilde(pattern.at_least()),
            None => Comparator::Exact(pattern),
        });
    }
    if let Some(operand) = token.strip_prefix('^') {
        let pattern = parse_pattern(operand)?;
        // `^1` pins nothing below the major; it degenerates to `1.x.x`.
        return Ok(match pattern.minor {
            Some(_) => Comparator::Caret(pattern.at_least()),
            None => Comparator::Exact(pattern),
        });
    }
    if let Some(operand) = token.strip_prefix('=') {
        return Ok(Comparator::Exact(parse_pattern(operand)?));
    }
    Ok(Comparator::Exact(parse_pattern(token)?))
}

fn parse_pattern(token: &str) -> Result<Pattern, ParseRangeError> {
    let invalid = || {
        ParseRangeError::InvalidOperand(ParseVersionError { text: token.to_string() })
    };

    // Build metadata carries no precedence; drop it from the pattern.
    let rest = token.split_once('+').map_or(token, |(rest, _)| rest);
    let (triple, pre_release) = match rest.split_once('-') {
        Some((triple, pre_release)) => (
            triple,
            crate::version::parse_pre_release_identifiers(pre_release).ok_or_else(invalid)?,
        ),
        None => (rest, Vec::new()),
    };

    let mut components = [None, None, None];
    if !triple.is_empty() && triple != "*" {
        let mut texts = triple.split('.');
        for slot in &mut components {
            let Some(text) = texts.next() else { break };
            *slot = match text {
                "x" | "X" | "*" => None,
                text => Some(crate::version::parse_numeric_component(text).ok_or_else(invalid)?),
            };
        }
        if texts.next().is_some() {
            return Err(invalid());
        }
    }
    let [major, minor, patch] = components;

    // A prerelease tag is only meaningful on a fully specified version.
    if !pre_release.is_empty() && (major.is_none() || minor.is_none() || patch.is_none()) {
        return Err(invalid());
    }

    Ok(Pattern { major, minor, patch, pre_release })
}

impl VersionRange {
    /// Whether `version` satisfies this range, by pure semver precedence.
    ///
    /// The npm prerelease opt-in rule is applied by [`select`](Self::select),
    /// not here.
    pub fn matches(&self, version: &Version) -> bool {
        self.disjuncts
            .iter()
            .any(|comparators| comparators.iter().all(|comparator| comparator.matches(version)))
    }

    /// npm rule: a prerelease may only be picked when some comparator
    /// mentions a prerelease of the same `major.minor.patch`.
    fn allows_pre_release_of(&self, version: &Version) -> bool {
        self.disjuncts
            .iter()
            .flatten()
            .any(|comparator| comparator.has_pre_release_pivot(version))
    }

    /// Pick the highest version satisfying this range, or `None`.
    pub fn select<'a>(&self, versions: impl IntoIterator<Item = &'a Version>) -> Option<&'a Version> {
        versions
            .into_iter()
            .filter(|version| version.pre_release.is_empty() || self.allows_pre_release_of(version))
            .filter(|version| self.matches(version))
            .max()
    }
}
