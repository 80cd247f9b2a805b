//! Dotted-integer version ordering
//!
//! Versions are compared component by component as integers. This is not
//! semver precedence: pre-release tags carry no ordering and are excluded
//! upstream with [`is_stable`].

use std::cmp::Ordering;

fn component(part: Option<&str>) -> u64 {
    part.and_then(|p| p.parse().ok()).unwrap_or(0)
}

/// Component-wise comparison; non-numeric or missing components count as 0
pub fn compare(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();

    for i in 0..left.len().max(right.len()) {
        let l = component(left.get(i).copied());
        let r = component(right.get(i).copied());
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// `a` sorts strictly before `b`
pub fn less(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Less
}

/// A version without a pre-release marker
pub fn is_stable(version: &str) -> bool {
    !version.contains('-')
}

fn highest<'a>(versions: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut best: Option<&str> = None;
    for version in versions {
        if best.is_none_or(|b| less(b, version)) {
            best = Some(version);
        }
    }
    best
}

/// Highest version in `versions`; the first of equal maxima wins
pub fn latest<S: AsRef<str>>(versions: &[S]) -> Option<&str> {
    highest(versions.iter().map(AsRef::as_ref))
}

/// Highest stable version in `versions`
pub fn latest_stable<S: AsRef<str>>(versions: &[S]) -> Option<&str> {
    highest(versions.iter().map(AsRef::as_ref).filter(|v| is_stable(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_less() {
        assert!(less("1.0.0", "2.0.0"));
        assert!(less("1.2.0", "1.10.0"));
        assert!(less("1.0", "1.0.1"));
        assert!(!less("2.0.0", "1.9.9"));
        assert!(!less("1.0.0", "1.0"));
    }

    #[test]
    fn test_less_is_irreflexive() {
        for v in ["0", "1.0.0", "1.0.0-rc1", "", "abc", "1..2"] {
            assert!(!less(v, v), "less({v:?}, {v:?})");
        }
    }

    #[test]
    fn test_less_is_transitive() {
        let versions = ["0.9", "1.0.0", "1.0.1", "1.2", "1.10.0", "2", "v3", "10.0.0"];
        for a in versions {
            for b in versions {
                for c in versions {
                    if less(a, b) && less(b, c) {
                        assert!(less(a, c), "{a} < {b} < {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_non_numeric_components_are_zero() {
        assert_eq!(compare("1.x.0", "1.0.0"), Ordering::Equal);
        assert!(less("v1.0.0", "0.0.1"));
    }

    #[test]
    fn test_is_stable() {
        assert!(is_stable("1.2.3"));
        assert!(!is_stable("1.2.3-rc.1"));
        assert!(!is_stable("2.0.0-beta"));
    }

    #[test]
    fn test_latest() {
        assert_eq!(latest(&["1.0.0", "2.0.0", "1.5.0"]), Some("2.0.0"));
        assert_eq!(latest::<&str>(&[]), None);
        assert_eq!(latest(&["1.0", "1.0.0"]), Some("1.0"));
    }

    #[test]
    fn test_latest_dominates_every_element() {
        let versions = vec!["3.1.0".to_string(), "3.10.2".to_string(), "3.2.9".to_string()];
        let best = latest(&versions).unwrap();
        assert!(versions.iter().all(|v| !less(best, v)));
        assert!(is_stable(best));
    }

    #[test]
    fn test_latest_stable() {
        assert_eq!(latest_stable(&["1.0.0", "3.0.0-rc1", "2.1.0"]), Some("2.1.0"));
        assert_eq!(latest_stable(&["1.0.0-alpha", "2.0.0-beta"]), None);
    }
}
