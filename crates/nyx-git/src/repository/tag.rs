use crate::{Identity, Result, Tag};

use super::Repository;

impl Repository {
    /// Creates a tag named `name` on `target` (the latest commit when
    /// `None`). The tag is annotated iff a message is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be resolved or the tag already
    /// exists.
    pub fn tag(
        &self,
        target: Option<&str>,
        name: &str,
        message: Option<&str>,
        tagger: Option<&Identity>,
    ) -> Result<Tag> {
        let target_sha = match target {
            Some(sha) => sha.to_string(),
            None => self.latest_commit()?,
        };
        let oid = git2::Oid::from_str(&target_sha)?;
        let object = self.inner.find_object(oid, Some(git2::ObjectType::Commit))?;

        match message {
            Some(message) => {
                let tagger_sig = self.signature_from(tagger)?;
                self.inner.tag(name, &object, &tagger_sig, message, false)?;
            }
            None => {
                self.inner.tag_lightweight(name, &object, false)?;
            }
        }

        Ok(Tag {
            name: name.to_string(),
            target: target_sha,
            annotated: message.is_some(),
        })
    }

    /// All tags (lightweight and annotated) whose resolved target is `sha`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag references cannot be enumerated.
    pub fn commit_tags(&self, sha: &str) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();

        for reference in self.inner.references_glob("refs/tags/*")? {
            let reference = reference?;
            let Some(name) = reference.shorthand().map(String::from) else {
                continue;
            };

            let annotated = reference
                .target()
                .is_some_and(|oid| self.inner.find_tag(oid).is_ok());

            let Ok(target) = reference.peel_to_commit() else {
                continue;
            };

            if target.id().to_string() == sha {
                tags.push(Tag {
                    name,
                    target: sha.to_string(),
                    annotated,
                });
            }
        }

        Ok(tags)
    }
}
