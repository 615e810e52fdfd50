use crate::git::Vcs;
use log;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Tracked,
    Additional,
}

/// A file that may end up in the merged document.
///
/// `path` is what gets printed: the listing's relative path for tracked files,
/// the caller's spelling for additional ones. `absolute` is what gets read.
/// `relative` is the path under the working directory that exclude globs see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidatePath {
    pub path: PathBuf,
    pub absolute: PathBuf,
    pub relative: PathBuf,
    pub origin: Origin,
}

impl CandidatePath {
    pub fn tracked(base: &Path, relative: PathBuf) -> Self {
        Self {
            absolute: base.join(&relative),
            path: relative.clone(),
            relative,
            origin: Origin::Tracked,
        }
    }

    pub fn additional(base: &Path, supplied: PathBuf) -> Self {
        let absolute = if supplied.is_absolute() {
            supplied.clone()
        } else {
            base.join(&supplied)
        };
        Self {
            relative: relative_to_base(base, &supplied),
            path: supplied,
            absolute,
            origin: Origin::Additional,
        }
    }

    pub fn display(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Identity used for de-duplication. Falls back to the joined path for
    /// files that cannot be canonicalized (missing, permission denied).
    pub fn resolved(&self) -> PathBuf {
        self.absolute
            .canonicalize()
            .unwrap_or_else(|_| self.absolute.clone())
    }
}

/// An absolute path under `base` becomes relative to it; anything outside stays
/// as given. `./` segments are dropped so globs see the same shape as tracked paths.
fn relative_to_base(base: &Path, supplied: &Path) -> PathBuf {
    if !supplied.is_absolute() {
        return supplied
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
    }
    if let Ok(rest) = supplied.strip_prefix(base) {
        return rest.to_path_buf();
    }
    match (base.canonicalize(), supplied.canonicalize()) {
        (Ok(base), Ok(full)) => full
            .strip_prefix(&base)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| supplied.to_path_buf()),
        _ => supplied.to_path_buf(),
    }
}

/// Tracked files under `base`, in the order the listing returns them.
/// A failing listing (not a repository, git missing) yields no files.
pub fn list_tracked(vcs: &dyn Vcs, base: &Path) -> Vec<CandidatePath> {
    match vcs.tracked_files() {
        Ok(files) => {
            log::debug!("Listing returned {} tracked files.", files.len());
            files
                .into_iter()
                .map(|rel| CandidatePath::tracked(base, rel))
                .collect()
        }
        Err(e) => {
            log::warn!(
                "Could not list tracked files in {}, continuing without them: {}",
                base.display(),
                e
            );
            Vec::new()
        }
    }
}

pub fn resolve_additional(base: &Path, files: &[PathBuf]) -> Vec<CandidatePath> {
    files
        .iter()
        .map(|f| CandidatePath::additional(base, f.clone()))
        .collect()
}

/// Tracked candidates followed by additional ones, each group in discovery
/// order, with later duplicates of an already-seen file dropped.
pub fn collect_candidates(
    vcs: &dyn Vcs,
    base: &Path,
    additional_files: &[PathBuf],
) -> (Vec<CandidatePath>, Vec<CandidatePath>) {
    let mut seen = HashSet::new();
    let tracked = dedup_into(&mut seen, list_tracked(vcs, base));
    let additional = dedup_into(&mut seen, resolve_additional(base, additional_files));
    (tracked, additional)
}

fn dedup_into(seen: &mut HashSet<PathBuf>, candidates: Vec<CandidatePath>) -> Vec<CandidatePath> {
    candidates
        .into_iter()
        .filter(|candidate| {
            let fresh = seen.insert(candidate.resolved());
            if !fresh {
                log::debug!("Skipping duplicate path: {}", candidate.path.display());
            }
            fresh
        })
        .collect()
}
