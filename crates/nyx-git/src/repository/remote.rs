use crate::{GitError, Result};

use super::Repository;

impl Repository {
    /// The names of the configured remotes.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote list cannot be read.
    pub fn remote_names(&self) -> Result<Vec<String>> {
        let remotes = self.inner.remotes()?;
        Ok(remotes.iter().flatten().map(String::from).collect())
    }

    /// Pushes the current branch and all tags to `remote` (`origin` when
    /// `None`) and returns the remote name that was pushed to.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::Detached`] when HEAD is not on a branch,
    /// [`GitError::Auth`] when the remote rejects the credentials and
    /// [`GitError::Protocol`] on transport failures.
    pub fn push(&self, remote: Option<&str>, auth: Option<(&str, &str)>) -> Result<String> {
        let remote_name = remote.unwrap_or("origin").to_string();
        let branch = self.current_branch();
        if branch.is_empty() {
            return Err(GitError::Detached);
        }

        let mut git_remote = self
            .inner
            .find_remote(&remote_name)
            .map_err(|_| GitError::NotFound {
                name: remote_name.clone(),
            })?;

        let mut refspecs = vec![format!("refs/heads/{branch}:refs/heads/{branch}")];
        for reference in self.inner.references_glob("refs/tags/*")? {
            if let Some(name) = reference?.name() {
                refspecs.push(format!("{name}:{name}"));
            }
        }

        let mut push_options = git2::PushOptions::new();
        if let Some((user, password)) = auth {
            let user = user.to_string();
            let password = password.to_string();
            let mut callbacks = git2::RemoteCallbacks::new();
            callbacks.credentials(move |_url, _username, _allowed| {
                git2::Cred::userpass_plaintext(&user, &password)
            });
            push_options.remote_callbacks(callbacks);
        }

        git_remote
            .push(&refspecs, Some(&mut push_options))
            .map_err(|source| GitError::from_remote(&remote_name, source))?;

        Ok(remote_name)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup_test_repo;
    use crate::{GitError, Repository};

    #[test]
    fn remote_names_is_empty_without_remotes() -> anyhow::Result<()> {
        let (_dir, repo) = setup_test_repo()?;

        assert!(repo.remote_names()?.is_empty());

        Ok(())
    }

    #[test]
    fn remote_names_lists_configured_remotes() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        repo.inner
            .remote("origin", "https://example.com/owner/repo")?;

        let repository = Repository::open(dir.path())?;
        assert_eq!(repository.remote_names()?, vec!["origin".to_string()]);

        Ok(())
    }

    #[test]
    fn push_to_unknown_remote_fails() -> anyhow::Result<()> {
        let (_dir, repo) = setup_test_repo()?;

        let result = repo.push(None, None);
        assert!(matches!(result, Err(GitError::NotFound { .. })));

        Ok(())
    }

    #[test]
    fn push_from_detached_head_fails() -> anyhow::Result<()> {
        let (_dir, repo) = setup_test_repo()?;

        let head = repo.inner.head()?.peel_to_commit()?;
        repo.inner.set_head_detached(head.id())?;

        let result = repo.push(None, None);
        assert!(matches!(result, Err(GitError::Detached)));

        Ok(())
    }

    #[test]
    fn push_to_local_bare_remote() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        let bare_dir = tempfile::TempDir::new()?;
        git2::Repository::init_bare(bare_dir.path())?;
        repo.inner
            .remote("origin", bare_dir.path().to_str().expect("utf-8 path"))?;
        repo.tag(None, "0.1.0", None, None)?;

        let repository = Repository::open(dir.path())?;
        let pushed = repository.push(None, None)?;

        assert_eq!(pushed, "origin");
        let bare = git2::Repository::open_bare(bare_dir.path())?;
        assert!(bare.find_reference("refs/tags/0.1.0").is_ok());

        Ok(())
    }
}
