use crate::classify::{Classification, ClassifyPolicy};
use crate::error::Result;
use crate::gather::{self, CandidatePath};
use crate::git::Vcs;
use crate::reader::{self, FileRecord};
use crate::structure;
use log;
use serde::Serialize;
use std::path::PathBuf;

pub const FILE_HEADER_PREFIX: &str = "## File: ";

#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    pub directory: PathBuf,
    pub exclude_patterns: Vec<String>,
    pub additional_files: Vec<PathBuf>,
    pub include_docs: bool,
    pub with_char_counts: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub candidate: CandidatePath,
    pub classification: Classification,
}

/// Every candidate with its classification, tracked files first.
pub fn plan(vcs: &dyn Vcs, request: &MergeRequest) -> Result<Vec<PlanEntry>> {
    let policy = ClassifyPolicy::new(&request.exclude_patterns, request.include_docs)?;
    let (tracked, additional) =
        gather::collect_candidates(vcs, &request.directory, &request.additional_files);
    Ok(tracked
        .into_iter()
        .chain(additional)
        .map(|candidate| PlanEntry {
            classification: policy.classify(&candidate),
            candidate,
        })
        .collect())
}

/// Builds the merged document: structure section for the tracked files that
/// survive classification, then one section per readable included file.
///
/// Per-file problems are logged and skipped. Only an invalid exclude pattern
/// fails the call.
pub fn aggregate(vcs: &dyn Vcs, request: &MergeRequest) -> Result<String> {
    log::debug!("Aggregating files under {}", request.directory.display());
    let policy = ClassifyPolicy::new(&request.exclude_patterns, request.include_docs)?;
    let (tracked, additional) =
        gather::collect_candidates(vcs, &request.directory, &request.additional_files);

    let filtered_tracked = retain_included(&policy, tracked);
    let filtered_additional = retain_included(&policy, additional);
    log::info!(
        "Merging {} tracked and {} additional files.",
        filtered_tracked.len(),
        filtered_additional.len()
    );

    let mut document = structure::render_structure(&filtered_tracked, request.with_char_counts);
    for candidate in filtered_tracked.iter().chain(&filtered_additional) {
        match reader::read_record(candidate) {
            Ok(record) => document.push_str(&render_section(&record, request.with_char_counts)),
            Err(e) => log::warn!("Skipping {}: {}", candidate.path.display(), e),
        }
    }
    Ok(document)
}

fn retain_included(policy: &ClassifyPolicy, candidates: Vec<CandidatePath>) -> Vec<CandidatePath> {
    candidates
        .into_iter()
        .filter(|candidate| {
            let classification = policy.classify(candidate);
            if !classification.is_included() {
                log::info!(
                    "Ignoring file: {} ({})",
                    candidate.path.display(),
                    classification.as_str()
                );
            }
            classification.is_included()
        })
        .collect()
}

pub fn render_section(record: &FileRecord, with_char_counts: bool) -> String {
    let prefix = if with_char_counts {
        structure::count_prefix(record.char_count)
    } else {
        String::new()
    };
    format!(
        "{}{}{}\n{}\n",
        FILE_HEADER_PREFIX,
        prefix,
        record.display(),
        record.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::FakeVcs;
    use std::fs;
    use tempfile::TempDir;

    fn repo(files: &[(&str, &str)]) -> (TempDir, FakeVcs) {
        let dir = TempDir::new().unwrap();
        for (name, contents) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }
        let names: Vec<&str> = files.iter().map(|(n, _)| *n).collect();
        (dir, FakeVcs::with_tracked(&names))
    }

    fn request(dir: &TempDir) -> MergeRequest {
        MergeRequest {
            directory: dir.path().to_path_buf(),
            ..MergeRequest::default()
        }
    }

    #[test]
    fn docs_are_excluded_by_default() {
        let (dir, vcs) = repo(&[("a.txt", "hello"), ("b.md", "doc")]);
        let out = aggregate(&vcs, &request(&dir)).unwrap();
        assert_eq!(
            out,
            "## Directory Structure\na.txt\n\n## File: a.txt\nhello\n"
        );
    }

    #[test]
    fn include_docs_adds_markdown() {
        let (dir, vcs) = repo(&[("a.txt", "hello"), ("b.md", "doc")]);
        let req = MergeRequest {
            include_docs: true,
            ..request(&dir)
        };
        let out = aggregate(&vcs, &req).unwrap();
        assert_eq!(
            out,
            "## Directory Structure\na.txt\nb.md\n\n## File: a.txt\nhello\n## File: b.md\ndoc\n"
        );
    }

    #[test]
    fn binary_additional_file_is_dropped() {
        let (dir, vcs) = repo(&[("a.txt", "hello")]);
        fs::write(dir.path().join("blob.bin"), b"\x00\x01\x02").unwrap();
        let req = MergeRequest {
            additional_files: vec![PathBuf::from("blob.bin")],
            ..request(&dir)
        };
        let entries = plan(&vcs, &req).unwrap();
        assert_eq!(entries[1].classification, Classification::ExcludeBinary);
        let out = aggregate(&vcs, &req).unwrap();
        assert!(!out.contains("blob.bin"));
    }

    #[test]
    fn not_a_repository_keeps_additional_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("extra.txt"), "extra").unwrap();
        let req = MergeRequest {
            additional_files: vec![PathBuf::from("extra.txt")],
            ..request(&dir)
        };
        let out = aggregate(&FakeVcs::not_a_repository(), &req).unwrap();
        assert_eq!(
            out,
            "## Directory Structure\n\n## File: extra.txt\nextra\n"
        );
    }

    #[test]
    fn char_counts_annotate_structure_and_sections() {
        let (dir, vcs) = repo(&[("ü.txt", "grüß")]);
        let req = MergeRequest {
            with_char_counts: true,
            ..request(&dir)
        };
        let out = aggregate(&vcs, &req).unwrap();
        assert_eq!(
            out,
            "## Directory Structure\n[4 chars] ü.txt\n\n## File: [4 chars] ü.txt\ngrüß\n"
        );
    }

    #[test]
    fn tracked_precede_additional_in_supplied_order() {
        let (dir, vcs) = repo(&[("z.txt", "z"), ("a.txt", "a")]);
        fs::write(dir.path().join("y.txt"), "y").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        let req = MergeRequest {
            additional_files: vec![PathBuf::from("y.txt"), PathBuf::from("b.txt")],
            ..request(&dir)
        };
        let first = aggregate(&vcs, &req).unwrap();
        let headers: Vec<&str> = first
            .lines()
            .filter(|l| l.starts_with(FILE_HEADER_PREFIX))
            .collect();
        assert_eq!(
            headers,
            vec!["## File: z.txt", "## File: a.txt", "## File: y.txt", "## File: b.txt"]
        );
        assert_eq!(first, aggregate(&vcs, &req).unwrap());
    }

    #[test]
    fn vanished_tracked_file_is_omitted_not_blank() {
        let (dir, _) = repo(&[("keep.txt", "keep")]);
        let vcs = FakeVcs::with_tracked(&["keep.txt", "gone.txt"]);
        let out = aggregate(&vcs, &request(&dir)).unwrap();
        assert!(!out.contains("## File: gone.txt"));
        assert!(out.contains("## File: keep.txt\nkeep\n"));
    }

    #[test]
    fn ignored_names_and_globs_are_filtered() {
        let (dir, vcs) = repo(&[
            ("yarn.lock", "lock"),
            ("src/app.rs", "fn app() {}"),
            ("logs/run.log", "log"),
        ]);
        let req = MergeRequest {
            exclude_patterns: vec!["*.log".to_string()],
            ..request(&dir)
        };
        let tags: Vec<Classification> = plan(&vcs, &req)
            .unwrap()
            .into_iter()
            .map(|e| e.classification)
            .collect();
        assert_eq!(
            tags,
            vec![
                Classification::ExcludeIgnoredName,
                Classification::Include,
                Classification::ExcludeGlobPattern,
            ]
        );
    }
}
