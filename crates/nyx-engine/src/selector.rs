use regex::Regex;
use tracing::debug;

use nyx_config::{ConfigError, ReleaseType};

use crate::{NyxError, Result};

/// Selects the release type governing the current branch: enabled release
/// types are tested in declared order and the first whose branch filter and
/// environment predicates all hold wins.
///
/// # Errors
///
/// Returns [`NyxError::NoMatchingReleaseType`] when no release type matches
/// and [`ConfigError::IllegalProperty`] when a filter carries an invalid
/// regular expression.
pub fn select_release_type(
    branch: &str,
    release_types: &[(String, ReleaseType)],
) -> Result<(String, ReleaseType)> {
    for (name, release_type) in release_types {
        let filter = compile(
            &format!("releaseTypes.{name}.branchFilter"),
            &release_type.branch_filter,
        )?;
        if !filter.is_match(branch) {
            continue;
        }

        if environment_predicates_hold(name, release_type)? {
            debug!(release_type = %name, %branch, "release type selected");
            return Ok((name.clone(), release_type.clone()));
        }
    }

    Err(NyxError::NoMatchingReleaseType {
        branch: branch.to_string(),
    })
}

fn environment_predicates_hold(name: &str, release_type: &ReleaseType) -> Result<bool> {
    for (variable, pattern) in &release_type.environment_predicates {
        let expression = compile(
            &format!("releaseTypes.{name}.environmentPredicates.{variable}"),
            pattern,
        )?;
        let holds = std::env::var(variable)
            .map(|value| expression.is_match(&value))
            .unwrap_or(false);
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

fn compile(option: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        ConfigError::IllegalProperty {
            name: option.to_string(),
            reason: format!("invalid regular expression: {e}"),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn named(name: &str, release_type: ReleaseType) -> (String, ReleaseType) {
        (name.to_string(), release_type)
    }

    #[test]
    fn first_matching_release_type_wins() {
        let release_types = vec![
            named("mainline", ReleaseType::mainline()),
            named("internal", ReleaseType::internal()),
        ];

        let (name, _) = select_release_type("master", &release_types).unwrap();
        assert_eq!(name, "mainline");

        let (name, _) = select_release_type("feature/x", &release_types).unwrap();
        assert_eq!(name, "internal");
    }

    #[test]
    fn declaration_order_breaks_overlaps() {
        let catch_all = ReleaseType::default();
        let release_types = vec![
            named("first", catch_all.clone()),
            named("second", catch_all),
        ];

        let (name, _) = select_release_type("anything", &release_types).unwrap();
        assert_eq!(name, "first");
    }

    #[test]
    fn no_match_is_a_release_error() {
        let release_types = vec![named("mainline", ReleaseType::mainline())];

        let result = select_release_type("feature/x", &release_types);
        assert!(matches!(
            result,
            Err(NyxError::NoMatchingReleaseType { .. })
        ));
    }

    #[test]
    fn environment_predicate_must_hold() {
        std::env::set_var("NYX_SELECTOR_TEST_CI", "true");

        let gated = ReleaseType {
            environment_predicates: IndexMap::from([(
                "NYX_SELECTOR_TEST_CI".to_string(),
                "^true$".to_string(),
            )]),
            ..ReleaseType::default()
        };
        let release_types = vec![named("gated", gated)];

        assert!(select_release_type("any", &release_types).is_ok());

        std::env::set_var("NYX_SELECTOR_TEST_CI", "false");
        assert!(matches!(
            select_release_type("any", &release_types),
            Err(NyxError::NoMatchingReleaseType { .. })
        ));
    }

    #[test]
    fn missing_environment_variable_fails_the_predicate() {
        let gated = ReleaseType {
            environment_predicates: IndexMap::from([(
                "NYX_SELECTOR_TEST_UNSET".to_string(),
                ".*".to_string(),
            )]),
            ..ReleaseType::default()
        };
        let release_types = vec![
            named("gated", gated),
            named("fallback", ReleaseType::default()),
        ];

        let (name, _) = select_release_type("any", &release_types).unwrap();
        assert_eq!(name, "fallback");
    }

    #[test]
    fn invalid_branch_filter_is_an_illegal_property() {
        let broken = ReleaseType {
            branch_filter: "(".to_string(),
            ..ReleaseType::default()
        };
        let result = select_release_type("any", &[named("broken", broken)]);
        assert!(matches!(
            result,
            Err(NyxError::Config(ConfigError::IllegalProperty { .. }))
        ));
    }
}
