use crate::error::{AppError, Result};
use crate::gather::{CandidatePath, Origin};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path};

/// Path segments that are never aggregated: lock files, VCS metadata, IaC locks.
pub const IGNORED_NAMES: &[&str] = &[
    "uv.lock",
    "package-lock.json",
    "package.lock",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    ".gitignore",
    ".yarn",
    ".git",
    ".hg",
    ".svn",
    ".terraform.lock.hcl",
];

pub const IGNORED_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp"];

pub const DOC_EXTENSIONS: &[&str] = &["md"];

pub const BINARY_SAMPLE_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Classification {
    Include,
    ExcludeIgnoredName,
    ExcludeIgnoredExtension,
    ExcludeGlobPattern,
    ExcludeDocPolicy,
    ExcludeBinary,
}

impl Classification {
    pub fn is_included(self) -> bool {
        self == Classification::Include
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Include => "include",
            Classification::ExcludeIgnoredName => "ignored-name",
            Classification::ExcludeIgnoredExtension => "ignored-extension",
            Classification::ExcludeGlobPattern => "glob-pattern",
            Classification::ExcludeDocPolicy => "doc-policy",
            Classification::ExcludeBinary => "binary",
        }
    }
}

type Check = fn(&ClassifyPolicy, &CandidatePath) -> Option<Classification>;

// Cheap string checks first, content sampling last.
const CHECKS: &[Check] = &[
    check_ignored_name,
    check_ignored_extension,
    check_doc_policy,
    check_glob,
    check_binary,
];

/// Exclusion rules for one aggregation run.
///
/// Caller-supplied exclude patterns play two roles, as they always have for
/// `merge -e`: each one is a whole-segment name token and a glob.
#[derive(Debug, Clone)]
pub struct ClassifyPolicy {
    exclude_tokens: Vec<String>,
    exclude_globs: GlobSet,
    include_docs: bool,
}

impl ClassifyPolicy {
    pub fn new(exclude_patterns: &[String], include_docs: bool) -> Result<Self> {
        Ok(Self {
            exclude_tokens: exclude_patterns
                .iter()
                .map(|p| p.trim().trim_end_matches('/').to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            exclude_globs: build_glob_set_from_vec(exclude_patterns)?,
            include_docs,
        })
    }

    /// Returns the first matching exclusion, or `Include` when nothing matches.
    pub fn classify(&self, candidate: &CandidatePath) -> Classification {
        let result = CHECKS
            .iter()
            .find_map(|check| check(self, candidate))
            .unwrap_or(Classification::Include);
        log::trace!(
            "Classified {} as {}",
            candidate.path.display(),
            result.as_str()
        );
        result
    }
}

fn check_ignored_name(policy: &ClassifyPolicy, candidate: &CandidatePath) -> Option<Classification> {
    // Files the caller named explicitly skip the deny-list.
    if candidate.origin == Origin::Additional {
        return None;
    }
    let hit = candidate.path.components().any(|component| match component {
        Component::Normal(segment) => segment.to_str().is_some_and(|s| {
            IGNORED_NAMES.contains(&s) || policy.exclude_tokens.iter().any(|t| t == s)
        }),
        _ => false,
    });
    hit.then_some(Classification::ExcludeIgnoredName)
}

fn check_ignored_extension(_: &ClassifyPolicy, candidate: &CandidatePath) -> Option<Classification> {
    has_extension(&candidate.path, IGNORED_EXTENSIONS)
        .then_some(Classification::ExcludeIgnoredExtension)
}

fn check_doc_policy(policy: &ClassifyPolicy, candidate: &CandidatePath) -> Option<Classification> {
    (!policy.include_docs && has_extension(&candidate.path, DOC_EXTENSIONS))
        .then_some(Classification::ExcludeDocPolicy)
}

fn check_glob(policy: &ClassifyPolicy, candidate: &CandidatePath) -> Option<Classification> {
    let path = &candidate.relative;
    let file_name_hit = path
        .file_name()
        .is_some_and(|name| policy.exclude_globs.is_match(Path::new(name)));
    (policy.exclude_globs.is_match(path) || file_name_hit)
        .then_some(Classification::ExcludeGlobPattern)
}

fn check_binary(_: &ClassifyPolicy, candidate: &CandidatePath) -> Option<Classification> {
    is_binary_file(&candidate.absolute).then_some(Classification::ExcludeBinary)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Samples the head of the file. Unreadable files count as binary.
pub fn is_binary_file(path: &Path) -> bool {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::warn!("Cannot open {} for sampling, treating as binary: {}", path.display(), e);
            return true;
        }
    };
    let mut sample = Vec::with_capacity(BINARY_SAMPLE_SIZE);
    if let Err(e) = file.take(BINARY_SAMPLE_SIZE as u64).read_to_end(&mut sample) {
        log::warn!("Cannot sample {}, treating as binary: {}", path.display(), e);
        return true;
    }
    is_binary_sample(&sample)
}

pub fn is_binary_sample(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return true;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => false,
        // A multi-byte sequence cut by the sample boundary is still text.
        Err(e) => e.error_len().is_some() || sample.len() < BINARY_SAMPLE_SIZE,
    }
}

pub(crate) fn build_glob_set_from_vec(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern_str in patterns {
        let mut processed_pattern = pattern_str.trim().to_string();
        if processed_pattern.is_empty() {
            continue;
        }
        if processed_pattern.ends_with('/') && processed_pattern.len() > 1 {
            processed_pattern.push_str("**");
        }
        match Glob::new(&processed_pattern) {
            Ok(glob) => {
                log::trace!(
                    "Adding glob pattern: {} (processed as {})",
                    pattern_str,
                    processed_pattern
                );
                builder.add(glob);
            }
            Err(e) => {
                log::error!("Invalid glob pattern \"{}\": {}", pattern_str, e);
                return Err(AppError::Glob(format!(
                    "Invalid glob pattern \"{}\" (processed as \"{}\"): {}",
                    pattern_str, processed_pattern, e
                )));
            }
        }
    }
    builder.build().map_err(|e| {
        log::error!("Error building glob set: {}", e);
        AppError::Glob(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn tracked(dir: &TempDir, rel: &str, bytes: &[u8]) -> CandidatePath {
        let abs = dir.path().join(rel);
        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&abs, bytes).unwrap();
        CandidatePath::tracked(dir.path(), PathBuf::from(rel))
    }

    fn policy(patterns: &[&str], docs: bool) -> ClassifyPolicy {
        let patterns: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        ClassifyPolicy::new(&patterns, docs).unwrap()
    }

    #[test]
    fn plain_text_is_included() {
        let dir = TempDir::new().unwrap();
        let c = tracked(&dir, "src/main.rs", b"fn main() {}\n");
        assert_eq!(policy(&[], false).classify(&c), Classification::Include);
    }

    #[test]
    fn ignored_names_match_whole_segments_only() {
        let dir = TempDir::new().unwrap();
        let lock = tracked(&dir, "uv.lock", b"lock");
        let nested = tracked(&dir, "uv/readme.txt", b"text");
        let p = policy(&[], false);
        assert_eq!(p.classify(&lock), Classification::ExcludeIgnoredName);
        assert_eq!(p.classify(&nested), Classification::Include);
    }

    #[test]
    fn exclude_token_matches_directory_segment() {
        let dir = TempDir::new().unwrap();
        let c = tracked(&dir, "vendor/lib.rs", b"x");
        assert_eq!(
            policy(&["vendor"], false).classify(&c),
            Classification::ExcludeIgnoredName
        );
    }

    #[test]
    fn additional_files_skip_name_policy() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("yarn.lock"), "lockfile").unwrap();
        let c = CandidatePath::additional(dir.path(), PathBuf::from("yarn.lock"));
        assert_eq!(policy(&[], false).classify(&c), Classification::Include);
    }

    #[test]
    fn image_extension_is_excluded_before_sampling() {
        let dir = TempDir::new().unwrap();
        let c = tracked(&dir, "logo.PNG", b"not really a png");
        assert_eq!(
            policy(&[], false).classify(&c),
            Classification::ExcludeIgnoredExtension
        );
    }

    #[test]
    fn docs_flag_flips_only_markdown() {
        let dir = TempDir::new().unwrap();
        let md = tracked(&dir, "README.md", b"# readme");
        let txt = tracked(&dir, "notes.txt", b"notes");
        assert_eq!(policy(&[], false).classify(&md), Classification::ExcludeDocPolicy);
        assert_eq!(policy(&[], true).classify(&md), Classification::Include);
        assert_eq!(policy(&[], false).classify(&txt), Classification::Include);
        assert_eq!(policy(&[], true).classify(&txt), Classification::Include);
    }

    #[test]
    fn glob_patterns_never_include() {
        let dir = TempDir::new().unwrap();
        let p = policy(&["*.log", "build/**"], true);
        for rel in ["app.log", "deep/nested/app.log", "build/out.txt"] {
            let c = tracked(&dir, rel, b"data");
            assert_eq!(p.classify(&c), Classification::ExcludeGlobPattern, "{rel}");
        }
    }

    #[test]
    fn absolute_additional_file_is_matched_relative_to_base() {
        let dir = TempDir::new().unwrap();
        tracked(&dir, "build/out.txt", b"data");
        let absolute = CandidatePath::additional(dir.path(), dir.path().join("build/out.txt"));
        let spelled = CandidatePath::additional(dir.path(), PathBuf::from("build/out.txt"));
        let p = policy(&["build/"], false);
        assert_eq!(p.classify(&absolute), Classification::ExcludeGlobPattern);
        assert_eq!(p.classify(&spelled), Classification::ExcludeGlobPattern);
    }

    #[test]
    fn null_byte_is_binary_regardless_of_flags() {
        let dir = TempDir::new().unwrap();
        let c = tracked(&dir, "blob.dat", b"abc\0def");
        assert_eq!(policy(&[], true).classify(&c), Classification::ExcludeBinary);
        assert_eq!(policy(&[], false).classify(&c), Classification::ExcludeBinary);
    }

    #[test]
    fn invalid_utf8_is_binary() {
        let dir = TempDir::new().unwrap();
        let c = tracked(&dir, "latin1.txt", &[0x63, 0x61, 0x66, 0xE9, 0x20, 0x21]);
        assert_eq!(policy(&[], false).classify(&c), Classification::ExcludeBinary);
    }

    #[test]
    fn missing_file_is_treated_as_binary() {
        let dir = TempDir::new().unwrap();
        let c = CandidatePath::additional(dir.path(), PathBuf::from("gone.txt"));
        assert_eq!(policy(&[], false).classify(&c), Classification::ExcludeBinary);
    }

    #[test]
    fn sample_cut_inside_multibyte_char_is_text() {
        let mut sample = vec![b'a'; BINARY_SAMPLE_SIZE - 1];
        sample.push(0xE2); // first byte of a three-byte sequence
        assert!(!is_binary_sample(&sample));
        assert!(is_binary_sample(&[b'a', 0xE2]));
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let err = ClassifyPolicy::new(&["[abc".to_string()], false).unwrap_err();
        assert!(matches!(err, AppError::Glob(_)));
    }
}
