use crate::{Action, Commit, GitError, Identity, Result, TimeStamp};

use super::Repository;

impl Repository {
    /// The SHA of the commit `HEAD` points to.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotFound`] when the repository has no commits yet.
    pub fn latest_commit(&self) -> Result<String> {
        let head = self.inner.head().map_err(|_| GitError::NotFound {
            name: "HEAD".to_string(),
        })?;
        let commit = head.peel_to_commit().map_err(|_| GitError::NotFound {
            name: "HEAD".to_string(),
        })?;
        Ok(commit.id().to_string())
    }

    /// The SHA of the first commit on the first-parent chain from `HEAD`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotFound`] when the repository has no commits yet.
    pub fn root_commit(&self) -> Result<String> {
        let head = self.latest_commit()?;
        let oid = git2::Oid::from_str(&head)?;
        let mut commit = self.inner.find_commit(oid)?;
        while commit.parent_count() > 0 {
            commit = commit.parent(0)?;
        }
        Ok(commit.id().to_string())
    }

    /// Creates a commit from the current index.
    ///
    /// `author` and `committer` default to the repository signature.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit cannot be created.
    pub fn commit(
        &self,
        message: &str,
        author: Option<&Identity>,
        committer: Option<&Identity>,
    ) -> Result<Commit> {
        let author_sig = self.signature_from(author)?;
        let committer_sig = self.signature_from(committer)?;

        let mut index = self.inner.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.inner.find_tree(tree_id)?;

        let parent = self.inner.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let commit_oid = self.inner.commit(
            Some("HEAD"),
            &author_sig,
            &committer_sig,
            message,
            &tree,
            &parents,
        )?;

        let commit = self.inner.find_commit(commit_oid)?;
        self.commit_from(&commit)
    }

    /// Materializes a value commit, resolving the tags pointing at it.
    pub(crate) fn commit_from(&self, commit: &git2::Commit<'_>) -> Result<Commit> {
        let sha = commit.id().to_string();
        let tags = self.commit_tags(&sha)?;

        Ok(Commit {
            sha,
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
            author_action: action_from(&commit.author()),
            commit_action: Action {
                identity: identity_from(&commit.committer()),
                timestamp: TimeStamp {
                    millis: commit.time().seconds() * 1000,
                    offset_minutes: commit.time().offset_minutes(),
                },
            },
            message: commit.message().unwrap_or("").to_string(),
            tags,
        })
    }
}

fn identity_from(signature: &git2::Signature<'_>) -> Identity {
    Identity {
        name: signature.name().unwrap_or("").to_string(),
        email: signature.email().unwrap_or("").to_string(),
    }
}

fn action_from(signature: &git2::Signature<'_>) -> Action {
    Action {
        identity: identity_from(signature),
        timestamp: TimeStamp {
            millis: signature.when().seconds() * 1000,
            offset_minutes: signature.when().offset_minutes(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{commit_file, setup_test_repo};
    use crate::GitError;
    use std::fs;

    #[test]
    fn create_commit() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        fs::write(dir.path().join("file.txt"), "content")?;
        repo.add(&["file.txt"])?;

        let commit = repo.commit("Test commit message", None, None)?;

        assert!(!commit.sha.is_empty());
        assert_eq!(commit.message, "Test commit message");
        assert_eq!(commit.parents.len(), 1);
        assert_eq!(repo.latest_commit()?, commit.sha);

        Ok(())
    }

    #[test]
    fn commit_with_explicit_identities() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        fs::write(dir.path().join("file.txt"), "content")?;
        repo.add(&["file.txt"])?;

        let author = crate::Identity::new("Author", "author@example.com");
        let committer = crate::Identity::new("Committer", "committer@example.com");
        let commit = repo.commit("message", Some(&author), Some(&committer))?;

        assert_eq!(commit.author_action.identity.name, "Author");
        assert_eq!(commit.commit_action.identity.email, "committer@example.com");

        Ok(())
    }

    #[test]
    fn latest_commit_fails_on_empty_repository() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        git2::Repository::init(dir.path())?;
        let repo = crate::Repository::open(dir.path())?;

        let result = repo.latest_commit();
        assert!(matches!(result, Err(GitError::NotFound { .. })));

        Ok(())
    }

    #[test]
    fn root_commit_is_the_first_commit() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        let root = repo.latest_commit()?;

        commit_file(&dir, &repo, "a.txt", "second")?;
        commit_file(&dir, &repo, "b.txt", "third")?;

        assert_eq!(repo.root_commit()?, root);
        Ok(())
    }
}
