use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;

/// Compiled exclusion globs of one rule.
#[derive(Debug)]
pub(super) struct Exclusions(Option<GlobSet>);

impl Exclusions {
    /// Compiles `patterns`, skipping those that are not valid globs.
    pub(super) fn new(patterns: &[String]) -> Self {
        if patterns.is_empty() {
            return Self(None);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => warn!(%pattern, error = %err, "skipping invalid exclusion glob"),
            }
        }
        match builder.build() {
            Ok(set) => Self(Some(set)),
            Err(err) => {
                warn!(error = %err, "ignoring exclusion globs");
                Self(None)
            }
        }
    }

    pub(super) fn is_excluded(&self, name: &str) -> bool {
        self.0.as_ref().is_some_and(|set| set.is_match(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globs_match_dotted_names() {
        let exclusions = Exclusions::new(&["quarkus.http.*".into(), "*.secret".into(), "a[".into()]);
        assert!(exclusions.is_excluded("quarkus.http.port"));
        assert!(exclusions.is_excluded("quarkus.http.cors.origins"));
        assert!(exclusions.is_excluded("db.secret"));
        assert!(!exclusions.is_excluded("quarkus.log.level"));
        assert!(!exclusions.is_excluded("a["));
    }

    #[test]
    fn no_patterns_excludes_nothing() {
        assert!(!Exclusions::new(&[]).is_excluded("anything"));
    }
}
