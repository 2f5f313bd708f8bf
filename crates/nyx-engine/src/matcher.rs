use regex::Regex;
use tracing::trace;

use nyx_config::{CommitMessageConvention, ConfigError};
use nyx_version::Bump;

use crate::Result;

/// Classifies a commit message under the enabled conventions, in order, and
/// derives the bump identifier the commit asks for.
///
/// The first convention whose primary expression matches decides: a
/// non-empty `breaking` capture overrides to the highest bump; otherwise the
/// bump expressions are evaluated, in declared order, against the
/// `name=value` rendition of the captured groups, and the first match wins.
/// A message matching no convention (or no bump expression) is not
/// significant.
///
/// # Errors
///
/// Returns [`ConfigError::IllegalProperty`] when a convention carries an
/// invalid regular expression.
pub fn bump_for_message(
    message: &str,
    conventions: &[(String, CommitMessageConvention)],
) -> Result<Option<Bump>> {
    for (name, convention) in conventions {
        let expression = compile(
            &format!("commitMessageConventions.{name}.expression"),
            &convention.expression,
        )?;

        let Some(captures) = expression.captures(message) else {
            continue;
        };
        trace!(convention = %name, "commit message matches convention");

        if captures.name("breaking").is_some_and(|m| !m.as_str().is_empty()) {
            return Ok(Some(Bump::highest()));
        }

        let rendition = capture_rendition(&expression, &captures);
        for (bump_id, bump_expression) in &convention.bump_expressions {
            let expression = compile(
                &format!("commitMessageConventions.{name}.bumpExpressions.{bump_id}"),
                bump_expression,
            )?;
            if expression.is_match(&rendition) {
                return Ok(Some(bump_id.parse::<Bump>().map_err(|_| {
                    ConfigError::IllegalProperty {
                        name: format!("commitMessageConventions.{name}.bumpExpressions"),
                        reason: format!("'{bump_id}' is not a bump identifier"),
                    }
                })?));
            }
        }

        // the first matching convention decides, even when it yields no bump
        return Ok(None);
    }

    Ok(None)
}

/// One `name=value` line per captured group, in declaration order.
fn capture_rendition(expression: &Regex, captures: &regex::Captures<'_>) -> String {
    expression
        .capture_names()
        .flatten()
        .filter_map(|name| {
            captures
                .name(name)
                .map(|m| format!("{name}={}", m.as_str()))
        })
        .collect::<Vec<_>>()
        .join("\n")
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
