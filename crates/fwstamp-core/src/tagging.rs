//! Release tagging.
//!
//! Creating and pushing the tag happens after the header is written and is
//! strictly best-effort: every failure is logged and reported through
//! [`TagOutcome`], never returned as an error.

use tracing::{info, warn};

use crate::scm::SourceControl;

/// What [`tag_and_push`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    /// A tag with that name already existed; nothing was created or pushed.
    AlreadyExists,
    /// The tag was created. `pushed` is false when the push failed.
    Created { pushed: bool },
    /// The tag could not be created.
    Failed,
}

/// Create tag `name` and push it to `remote`, unless it already exists.
pub async fn tag_and_push(scm: &dyn SourceControl, name: &str, remote: &str) -> TagOutcome {
    match scm.tag_exists(name).await {
        Ok(true) => {
            info!(tag = name, "Tag already exists, skipping tag and push");
            return TagOutcome::AlreadyExists;
        }
        Ok(false) => {}
        // Creation below fails on its own if the tag is there after all.
        Err(e) => warn!(tag = name, error = %e, "Could not check for existing tag"),
    }

    info!(tag = name, %remote, "Tagging and pushing");
    if let Err(e) = scm.create_tag(name).await {
        warn!(tag = name, error = %e, "Failed to create tag");
        return TagOutcome::Failed;
    }

    match scm.push_tag(remote, name).await {
        Ok(()) => TagOutcome::Created { pushed: true },
        Err(e) => {
            warn!(tag = name, %remote, error = %e, "Failed to push tag");
            TagOutcome::Created { pushed: false }
        }
    }
}
