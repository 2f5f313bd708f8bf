use std::cell::Cell;
use std::fs;

use tempfile::TempDir;

use nyx_config::{standard_defaults, ConfigurationLayer};

/// A real repository in a temporary directory, driven through git2 the way
/// the pipeline will see it.
pub struct ScenarioRepo {
    pub dir: TempDir,
    counter: Cell<usize>,
}

impl ScenarioRepo {
    pub fn init() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let repo = git2::Repository::init(dir.path())?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test")?;
        config.set_str("user.email", "test@example.com")?;

        Ok(Self {
            dir,
            counter: Cell::new(0),
        })
    }

    fn repo(&self) -> anyhow::Result<git2::Repository> {
        Ok(git2::Repository::open(self.dir.path())?)
    }

    /// Commits a new file with the given message and returns the SHA.
    pub fn commit(&self, message: &str) -> anyhow::Result<String> {
        let repo = self.repo()?;
        let n = self.counter.get() + 1;
        self.counter.set(n);
        fs::write(self.dir.path().join(format!("file-{n}.txt")), message)?;

        let mut index = repo.index()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let sig = git2::Signature::now("Test", "test@example.com")?;
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        Ok(oid.to_string())
    }

    /// Writes a `.gitignore`; picked up by the next commit.
    pub fn gitignore(&self, patterns: &str) -> anyhow::Result<()> {
        fs::write(self.dir.path().join(".gitignore"), patterns)?;
        Ok(())
    }

    /// Creates a lightweight tag on HEAD.
    pub fn tag(&self, name: &str) -> anyhow::Result<()> {
        let repo = self.repo()?;
        let head = repo.head()?.peel_to_commit()?;
        repo.tag_lightweight(name, head.as_object(), false)?;
        Ok(())
    }

    /// Creates `name` at HEAD and checks it out.
    pub fn branch(&self, name: &str) -> anyhow::Result<()> {
        let repo = self.repo()?;
        let head = repo.head()?.peel_to_commit()?;
        repo.branch(name, &head, false)?;
        repo.set_head(&format!("refs/heads/{name}"))?;
        repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))?;
        Ok(())
    }

    /// Detaches HEAD onto the current commit.
    pub fn detach_head(&self) -> anyhow::Result<()> {
        let repo = self.repo()?;
        let head = repo.head()?.peel_to_commit()?;
        repo.set_head_detached(head.id())?;
        Ok(())
    }

    pub fn head(&self) -> anyhow::Result<String> {
        let repo = self.repo()?;
        let id = repo.head()?.peel_to_commit()?.id().to_string();
        Ok(id)
    }

    pub fn has_tag(&self, name: &str) -> anyhow::Result<bool> {
        let repo = self.repo()?;
        let found = repo
            .find_reference(&format!("refs/tags/{name}"))
            .is_ok();
        Ok(found)
    }

    pub fn tag_target(&self, name: &str) -> anyhow::Result<String> {
        let repo = self.repo()?;
        let reference = repo.find_reference(&format!("refs/tags/{name}"))?;
        let id = reference.peel_to_commit()?.id().to_string();
        Ok(id)
    }

    pub fn tag_count(&self) -> anyhow::Result<usize> {
        let repo = self.repo()?;
        Ok(repo.tag_names(None)?.len())
    }

    /// Registers a bare repository as `origin` and returns its directory.
    pub fn add_bare_remote(&self) -> anyhow::Result<TempDir> {
        let bare_dir = TempDir::new()?;
        git2::Repository::init_bare(bare_dir.path())?;
        let repo = self.repo()?;
        repo.remote(
            "origin",
            bare_dir.path().to_str().expect("utf-8 path"),
        )?;
        Ok(bare_dir)
    }

    /// The standard defaults rooted at this repository.
    pub fn defaults(&self) -> ConfigurationLayer {
        ConfigurationLayer {
            directory: Some(self.dir.path().to_path_buf()),
            ..standard_defaults()
        }
    }
}
