use crate::Result;

use super::Repository;

impl Repository {
    /// Stages the given pathspecs, picking up additions, modifications and
    /// deletions. `["."]` stages every pending change.
    ///
    /// # Errors
    ///
    /// Returns an error if updating the index fails.
    pub fn add(&self, pathspecs: &[&str]) -> Result<()> {
        let mut index = self.inner.index()?;

        index.add_all(pathspecs.iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(pathspecs.iter(), None)?;
        index.write()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup_test_repo;
    use std::fs;
    use std::path::Path;

    #[test]
    fn stage_single_file() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        fs::write(dir.path().join("file.txt"), "content")?;

        repo.add(&["file.txt"])?;

        let index = repo.inner.index()?;
        assert!(index.get_path(Path::new("file.txt"), 0).is_some());

        Ok(())
    }

    #[test]
    fn stage_everything_with_dot() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        fs::write(dir.path().join("file1.txt"), "content1")?;
        fs::write(dir.path().join("file2.txt"), "content2")?;

        repo.add(&["."])?;

        let index = repo.inner.index()?;
        assert!(index.get_path(Path::new("file1.txt"), 0).is_some());
        assert!(index.get_path(Path::new("file2.txt"), 0).is_some());

        Ok(())
    }

    #[test]
    fn stage_deleted_file() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        fs::write(dir.path().join("file.txt"), "content")?;
        repo.add(&["file.txt"])?;
        repo.commit("Add file", None, None)?;

        fs::remove_file(dir.path().join("file.txt"))?;
        repo.add(&["."])?;

        let index = repo.inner.index()?;
        assert!(index.get_path(Path::new("file.txt"), 0).is_none());

        Ok(())
    }
}
