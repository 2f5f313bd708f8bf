mod commit;
mod remote;
mod staging;
mod status;
mod tag;
mod walk;

use std::path::{Path, PathBuf};

use crate::{GitError, Identity, Result};

pub struct Repository {
    pub(crate) inner: git2::Repository,
    root: PathBuf,
}

impl Repository {
    /// # Errors
    ///
    /// Returns [`GitError::NotARepository`] if the path is not inside a git repository.
    pub fn open(path: &Path) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|_| GitError::NotARepository {
            path: path.to_path_buf(),
        })?;

        Self::from_git2(inner, path)
    }

    /// Clones `uri` into `path` and opens the resulting repository.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::Auth`] when the remote rejects the credentials and
    /// [`GitError::Protocol`] on transport failures.
    pub fn clone(path: &Path, uri: &str, auth: Option<(&str, &str)>) -> Result<Self> {
        let mut fetch_options = git2::FetchOptions::new();
        if let Some((user, password)) = auth {
            let user = user.to_string();
            let password = password.to_string();
            let mut callbacks = git2::RemoteCallbacks::new();
            callbacks.credentials(move |_url, _username, _allowed| {
                git2::Cred::userpass_plaintext(&user, &password)
            });
            fetch_options.remote_callbacks(callbacks);
        }

        let inner = git2::build::RepoBuilder::new()
            .fetch_options(fetch_options)
            .clone(uri, path)
            .map_err(|source| GitError::from_remote(uri, source))?;

        Self::from_git2(inner, path)
    }

    fn from_git2(inner: git2::Repository, path: &Path) -> Result<Self> {
        let root = inner.workdir().ok_or_else(|| GitError::NotARepository {
            path: path.to_path_buf(),
        })?;

        // Use dunce to get a path without the \\?\ prefix on Windows
        let root = dunce::simplified(root).to_path_buf();

        Ok(Self { inner, root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn signature_from(&self, identity: Option<&Identity>) -> Result<git2::Signature<'static>> {
        match identity {
            Some(identity) => Ok(git2::Signature::now(&identity.name, &identity.email)?),
            None => Ok(self.inner.signature()?),
        }
    }
}
