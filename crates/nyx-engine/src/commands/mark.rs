use tracing::{debug, info};

use nyx_git::Repository;

use crate::services::ServiceRegistry;
use crate::state::State;
use crate::{NyxError, Result};

use super::Command;

const INTERNAL_LAST_COMMIT: &str = "Mark.last.commit";
const STATE_INITIAL_COMMIT: &str = "Mark.state.initialCommit";
const STATE_NEW_VERSION: &str = "Mark.state.newVersion";
const STATE_VERSION: &str = "Mark.state.version";

const DEFAULT_COMMIT_MESSAGE: &str = "Release version {{version}}";

/// Commits pending changes, applies the release tag and pushes to the
/// remotes, each step gated by its release-type flag and by dry-run.
pub(crate) struct Mark;

impl Command for Mark {
    fn name(&self) -> &'static str {
        "Mark"
    }

    fn is_up_to_date(&self, state: &State, repository: &Repository) -> Result<bool> {
        // never up to date while the working tree has pending changes
        if !repository.is_clean()? {
            return Ok(false);
        }
        let Some(version) = state.version.as_deref() else {
            return Ok(false);
        };
        let Ok(latest) = repository.latest_commit() else {
            return Ok(false);
        };

        Ok(state.internal_matches(INTERNAL_LAST_COMMIT, &latest)
            && state.internal_matches(STATE_VERSION, version)
            && state.internal_matches(
                STATE_INITIAL_COMMIT,
                &state.release_scope.initial_commit.clone().unwrap_or_default(),
            )
            && state.internal_matches(STATE_NEW_VERSION, &state.new_version.to_string()))
    }

    fn run(
        &self,
        state: &mut State,
        repository: &Repository,
        _services: &ServiceRegistry,
    ) -> Result<()> {
        debug!("running the Mark command");

        let configuration = state.configuration();
        let dry_run = configuration.get_dry_run();
        let prefix = configuration.get_release_prefix();

        if state.new_version {
            let release_type = super::resolve_release_type(state)?;

            // COMMIT
            if release_type.git_commit {
                if repository.is_clean()? {
                    debug!("repository is clean, no commit needs to be made");
                } else if dry_run {
                    info!("git commit skipped due to dry run");
                } else {
                    let template = release_type
                        .git_commit_message
                        .as_deref()
                        .unwrap_or(DEFAULT_COMMIT_MESSAGE);
                    let message = nyx_template::render(template, &state.to_context())?;

                    repository.add(&["."])?;
                    let commit = repository.commit(&message, None, None)?;
                    debug!(sha = %commit.sha, "local changes committed");

                    state.release_scope.final_commit = Some(commit.sha.clone());
                    state.release_scope.commits.insert(0, commit);
                }
            }

            // TAG
            if release_type.git_tag {
                // the tag captures what the tree holds; without a release
                // commit sweeping pending changes in, the tree must be clean
                if !release_type.git_commit {
                    repository.require_clean()?;
                }
                if dry_run {
                    info!("git tag skipped due to dry run");
                } else if let Some(version) = state.version.clone() {
                    let tag_name = format!("{prefix}{version}");
                    let message = match &release_type.git_tag_message {
                        Some(template) => {
                            Some(nyx_template::render(template, &state.to_context())?)
                        }
                        None => None,
                    };
                    let target = state.release_scope.final_commit.clone();
                    repository.tag(target.as_deref(), &tag_name, message.as_deref(), None)?;
                    debug!(tag = %tag_name, "release tag applied");
                }
            }

            // PUSH
            if release_type.git_push {
                if dry_run {
                    info!("git push skipped due to dry run");
                } else {
                    let auth = push_credentials(state)?;
                    let remotes = repository.remote_names()?;
                    if remotes.is_empty() {
                        debug!("no remotes configured, nothing to push");
                    }
                    for remote in remotes {
                        let pushed = repository.push(
                            Some(&remote),
                            auth.as_ref().map(|(user, token)| (user.as_str(), token.as_str())),
                        )?;
                        debug!(remote = %pushed, "local changes pushed");
                    }
                }
            }
        } else {
            info!("no version change detected, nothing to release");
        }

        if !dry_run {
            let latest = repository.latest_commit()?;
            let version = state.version.clone().unwrap_or_default();
            let initial_commit = state.release_scope.initial_commit.clone().unwrap_or_default();
            let new_version = state.new_version.to_string();
            state.put_internal(INTERNAL_LAST_COMMIT, &latest);
            state.put_internal(STATE_VERSION, &version);
            state.put_internal(STATE_INITIAL_COMMIT, &initial_commit);
            state.put_internal(STATE_NEW_VERSION, &new_version);
        }

        Ok(())
    }
}

/// Credentials for the push, taken from the first configured service that
/// carries both a user and a token. Both values are rendered as templates so
/// they can be pulled from the environment.
fn push_credentials(state: &State) -> Result<Option<(String, String)>> {
    let context = state.to_context();
    for (name, service) in state.configuration().get_services() {
        let (Some(user_template), Some(token_template)) = (&service.user, &service.token) else {
            continue;
        };
        let user = nyx_template::render(user_template, &context)?;
        let token = nyx_template::render(token_template, &context)?;
        if token.trim().is_empty() {
            return Err(NyxError::Security {
                name,
                reason: "the configured token rendered to an empty string".to_string(),
            });
        }
        return Ok(Some((user, token)));
    }
    Ok(None)
}
