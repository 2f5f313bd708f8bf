use crate::{GitError, Result};

use super::Repository;

impl Repository {
    /// The name of the branch HEAD is on.
    ///
    /// A detached HEAD yields the empty string; callers decide what that
    /// means for them. On an unborn branch the name comes from the symbolic
    /// HEAD reference.
    #[must_use]
    pub fn current_branch(&self) -> String {
        match self.inner.head() {
            Ok(head) if head.is_branch() => head.shorthand().unwrap_or("").to_string(),
            Ok(_) => String::new(),
            Err(_) => self
                .inner
                .find_reference("HEAD")
                .ok()
                .and_then(|head| head.symbolic_target().map(String::from))
                .and_then(|target| {
                    target
                        .strip_prefix("refs/heads/")
                        .map(String::from)
                })
                .unwrap_or_default(),
        }
    }

    /// Whether the working tree and index carry no pending changes,
    /// untracked files included.
    ///
    /// # Errors
    ///
    /// Returns an error if the git status operation fails.
    pub fn is_clean(&self) -> Result<bool> {
        let statuses = self.inner.statuses(Some(
            git2::StatusOptions::new()
                .include_untracked(true)
                .recurse_untracked_dirs(true),
        ))?;

        Ok(statuses.is_empty())
    }

    /// # Errors
    ///
    /// Returns [`GitError::Dirty`] when the working tree has uncommitted
    /// changes.
    pub fn require_clean(&self) -> Result<()> {
        if self.is_clean()? {
            Ok(())
        } else {
            Err(GitError::Dirty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup_test_repo;
    use crate::GitError;
    use std::fs;

    #[test]
    fn current_branch_on_default_branch() -> anyhow::Result<()> {
        let (_dir, repo) = setup_test_repo()?;
        let branch = repo.current_branch();
        assert!(branch == "main" || branch == "master");
        Ok(())
    }

    #[test]
    fn detached_head_yields_the_empty_string() -> anyhow::Result<()> {
        let (_dir, repo) = setup_test_repo()?;

        let head = repo.inner.head()?.peel_to_commit()?;
        repo.inner.set_head_detached(head.id())?;

        assert_eq!(repo.current_branch(), "");
        Ok(())
    }

    #[test]
    fn unborn_branch_still_has_a_name() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        git2::Repository::init(dir.path())?;
        let repo = crate::Repository::open(dir.path())?;

        let branch = repo.current_branch();
        assert!(branch == "main" || branch == "master");
        Ok(())
    }

    #[test]
    fn clean_working_tree() -> anyhow::Result<()> {
        let (_dir, repo) = setup_test_repo()?;
        assert!(repo.is_clean()?);
        assert!(repo.require_clean().is_ok());
        Ok(())
    }

    #[test]
    fn untracked_file_makes_the_tree_dirty() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        fs::write(dir.path().join("new_file.txt"), "content")?;
        assert!(!repo.is_clean()?);
        Ok(())
    }

    #[test]
    fn require_clean_fails_on_a_dirty_tree() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        fs::write(dir.path().join("new_file.txt"), "content")?;

        let result = repo.require_clean();
        assert!(matches!(result, Err(GitError::Dirty)));
        Ok(())
    }
}
