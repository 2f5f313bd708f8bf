use crate::{Commit, Result};

use super::Repository;

impl Repository {
    /// Walks the commit history newest-first along the first-parent chain.
    ///
    /// The walk starts at `start` (`HEAD` when `None`) and stops, exclusive,
    /// at `end` or at the root commit. Commits merged in from side branches
    /// are not visited. The visitor returns `true` to continue and `false`
    /// to stop the walk early.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` cannot be resolved or the traversal fails.
    pub fn walk_history<F>(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        mut visitor: F,
    ) -> Result<()>
    where
        F: FnMut(&Commit) -> bool,
    {
        let start_oid = match start {
            Some(refspec) => self.inner.revparse_single(refspec)?.peel_to_commit()?.id(),
            None => git2::Oid::from_str(&self.latest_commit()?)?,
        };

        let mut revwalk = self.inner.revwalk()?;
        revwalk.push(start_oid)?;
        revwalk.simplify_first_parent()?;
        revwalk.set_sorting(git2::Sort::NONE)?;

        for oid in revwalk {
            let oid = oid?;

            if end.is_some_and(|end| end == oid.to_string()) {
                break;
            }

            let commit = self.inner.find_commit(oid)?;
            if !visitor(&self.commit_from(&commit)?) {
                break;
            }
        }

        Ok(())
    }
}
