use derive_more::{Display, Error};
use miette::Diagnostic;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

/// One dot-separated identifier of a prerelease tag.
///
/// Numeric identifiers compare numerically and are always lower than
/// alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Numeric(u64),
    AlphaNumeric(String),
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(left), Identifier::Numeric(right)) => left.cmp(right),
            (Identifier::Numeric(_), Identifier::AlphaNumeric(_)) => Ordering::Less,
            (Identifier::AlphaNumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::AlphaNumeric(left), Identifier::AlphaNumeric(right)) => left.cmp(right),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(number) => write!(f, "{number}"),
            Identifier::AlphaNumeric(text) => write!(f, "{text}"),
        }
    }
}

/// A semver version: `major.minor.patch` with optional prerelease tag and
/// build metadata.
///
/// Ordering follows semver precedence: the numeric triple, then prerelease
/// identifiers (a release is greater than any of its prereleases). Build
/// metadata never participates in comparisons.
#[derive(Debug, Clone)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Vec<Identifier>,
    pub build: Vec<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version { major, minor, patch, pre_release: Vec::new(), build: Vec::new() }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major
            && self.minor == other.minor
            && self.patch == other.patch
            && self.pre_release == other.pre_release
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.pre_release.hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_triple = (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch));
        if by_triple != Ordering::Equal {
            return by_triple;
        }
        match (self.pre_release.is_empty(), other.pre_release.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.pre_release.cmp(&other.pre_release),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Version { major, minor, patch, pre_release, build } = self;
        write!(f, "{major}.{minor}.{patch}")?;
        for (index, identifier) in pre_release.iter().enumerate() {
            write!(f, "{0}{identifier}", if index == 0 { '-' } else { '.' })?;
        }
        for (index, identifier) in build.iter().enumerate() {
            write!(f, "{0}{identifier}", if index == 0 { '+' } else { '.' })?;
        }
        Ok(())
    }
}

/// Error when parsing [`Version`] from a string input.
#[derive(Debug, Display, Error, Diagnostic, Clone, PartialEq, Eq)]
#[display("{text:?} is not a valid semver version")]
#[diagnostic(code(yap_semver::invalid_version))]
pub struct ParseVersionError {
    pub text: String,
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseVersionError { text: text.to_string() };

        let (rest, build) = match text.split_once('+') {
            Some((rest, build)) => (rest, parse_build_identifiers(build).ok_or_else(invalid)?),
            None => (text, Vec::new()),
        };
        let (triple, pre_release) = match rest.split_once('-') {
            Some((triple, pre_release)) => {
                (triple, parse_pre_release_identifiers(pre_release).ok_or_else(invalid)?)
            }
            None => (rest, Vec::new()),
        };

        let mut components = triple.split('.');
        let mut next_component =
            || components.next().and_then(parse_numeric_component).ok_or_else(invalid);
        let major = next_component()?;
        let minor = next_component()?;
        let patch = next_component()?;
        if components.next().is_some() {
            return Err(invalid());
        }

        Ok(Version { major, minor, patch, pre_release, build })
    }
}

pub(crate) fn parse_numeric_component(text: &str) -> Option<u64> {
    let valid = !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit());
    valid.then(|| text.parse().ok()).flatten()
}

fn valid_identifier(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
}

pub(crate) fn parse_pre_release_identifiers(text: &str) -> Option<Vec<Identifier>> {
    text.split('.')
        .map(|identifier| {
            if !valid_identifier(identifier) {
                return None;
            }
            match parse_numeric_component(identifier) {
                Some(number) => Some(Identifier::Numeric(number)),
                None => Some(Identifier::AlphaNumeric(identifier.to_string())),
            }
        })
        .collect()
}

fn parse_build_identifiers(text: &str) -> Option<Vec<String>> {
    text.split('.')
        .map(|identifier| valid_identifier(identifier).then(|| identifier.to_string()))
        .collect()
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Version {
        text.parse().expect("parse version")
    }

    #[test]
    fn parse_plain_version() {
        assert_eq!(parse("1.2.3"), Version::new(1, 2, 3));
        assert_eq!(parse("0.0.0"), Version::new(0, 0, 0));
        assert_eq!(parse("10.20.30"), Version::new(10, 20, 30));
    }

    #[test]
    fn parse_pre_release_and_build() {
        let version = parse("1.0.0-alpha.1+build.5");
        assert_eq!(version.major, 1);
        assert_eq!(
            version.pre_release,
            [Identifier::AlphaNumeric("alpha".to_string()), Identifier::Numeric(1)],
        );
        assert_eq!(version.build, ["build".to_string(), "5".to_string()]);
    }

    #[test]
    fn reject_malformed_versions() {
        for text in ["", "1", "1.2", "1.2.3.4", "1.2.x", "a.b.c", "1.2.3-", "1.2.3-α", " 1.2.3"] {
            assert_eq!(
                text.parse::<Version>(),
                Err(ParseVersionError { text: text.to_string() }),
                "{text:?} should not parse",
            );
        }
    }

    #[test]
    fn display_round_trips() {
        for text in ["1.2.3", "0.1.0-beta.2", "2.0.0-rc.1+sha.f00", "3.0.0+20130313144700"] {
            assert_eq!(parse(text).to_string(), text);
        }
    }

    #[test]
    fn order_by_precedence() {
        let ordered = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
            "1.0.1",
            "1.1.0",
            "2.0.0",
        ];
        for pair in ordered.windows(2) {
            assert!(parse(pair[0]) < parse(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn build_metadata_is_ignored_in_comparisons() {
        assert_eq!(parse("1.2.3+build.1"), parse("1.2.3+build.2"));
        assert_eq!(parse("1.2.3+build.1").cmp(&parse("1.2.3")), Ordering::Equal);
    }

    #[test]
    fn serde_uses_string_form() {
        let version = parse("1.2.3-beta.1");
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"1.2.3-beta.1\"");
        assert_eq!(serde_json::from_str::<Version>(&json).unwrap(), version);
    }
}
