//! Source file staging.
//!
//! A snippet is written to the work directory under a randomized name, then
//! relocated into the staging directory it is executed from. Relocation is
//! copy-then-delete because the two directories may be on different volumes.
//!
//! Generated names look like `index-k3v9q0zt.js` or `main-0a1b2c3d.go`.

use std::path::{Path, PathBuf};

use rand::Rng;
use snipbox_core::Language;

use crate::{ExecutorConfig, ExecutorError};

/// Length of the random part of a staged file name.
pub const SUFFIX_LEN: usize = 8;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random `[a-z0-9]` suffix of [`SUFFIX_LEN`] characters.
#[must_use]
pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())]))
        .collect()
}

/// File name for a `language` snippet with the given suffix.
#[must_use]
pub fn file_name(language: Language, suffix: &str) -> String {
    format!("{}-{suffix}.{}", language.file_stem(), language.extension())
}

/// `true` if `name` could have been produced by [`file_name`] with a
/// [`random_suffix`].
#[must_use]
pub fn is_generated_name(name: &str) -> bool {
    Language::ALL.into_iter().any(|lang| {
        name.strip_prefix(lang.file_stem())
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|rest| rest.strip_suffix(lang.extension()))
            .and_then(|rest| rest.strip_suffix('.'))
            .is_some_and(|suffix| {
                suffix.len() == SUFFIX_LEN && suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b))
            })
    })
}

/// Writes and relocates snippet files.
#[derive(Debug, Clone)]
pub struct Staging {
    work_dir: PathBuf,
    staging_dir: PathBuf,
}

impl Staging {
    /// Stage through `work_dir` into `staging_dir`.
    #[must_use]
    pub fn new(work_dir: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            staging_dir: staging_dir.into(),
        }
    }

    /// Staging for the directories named in `config`.
    #[must_use]
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(&config.work_dir, &config.staging_dir)
    }

    /// Create the staging directory and delete leftover generated files.
    ///
    /// Files whose names do not follow the generated scheme are left alone.
    /// Returns the number of files removed.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Staging`] if the directory cannot be created,
    /// listed, or cleaned.
    pub async fn prepare(&self) -> Result<usize, ExecutorError> {
        let dir = &self.staging_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ExecutorError::staging(dir, e))?;

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| ExecutorError::staging(dir, e))?;
        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ExecutorError::staging(dir, e))?
        {
            let path = entry.path();
            let generated = entry.file_name().to_str().is_some_and(is_generated_name);
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if generated && is_file {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| ExecutorError::staging(&path, e))?;
                removed += 1;
            }
        }

        tracing::info!(dir = %dir.display(), removed, "staging directory prepared");
        Ok(removed)
    }

    /// Write `source` to a fresh file and move it into the staging directory.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Staging`] if writing or relocating fails. The
    /// draft in the work directory is removed on a failed relocation.
    pub async fn stage(
        &self,
        language: Language,
        source: &str,
    ) -> Result<StagedFile, ExecutorError> {
        let name = file_name(language, &random_suffix());
        let draft = self.work_dir.join(&name);
        let staged = self.staging_dir.join(&name);

        tokio::fs::write(&draft, source)
            .await
            .map_err(|e| ExecutorError::staging(&draft, e))?;

        if let Err(e) = relocate(&draft, &staged).await {
            let _ = tokio::fs::remove_file(&draft).await;
            return Err(e);
        }

        Ok(StagedFile { path: staged })
    }
}

async fn relocate(from: &Path, to: &Path) -> Result<(), ExecutorError> {
    tokio::fs::copy(from, to)
        .await
        .map_err(|e| ExecutorError::staging(to, e))?;
    tokio::fs::remove_file(from)
        .await
        .map_err(|e| ExecutorError::staging(from, e))
}

/// A snippet file sitting in the staging directory.
///
/// Dropping this value does NOT delete the file. Call
/// [`StagedFile::discard`] once the run is over.
#[derive(Debug)]
#[must_use = "a staged file must be discarded after use"]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Location of the staged file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Staging`] if the file cannot be removed.
    pub async fn discard(self) -> Result<(), ExecutorError> {
        let Self { path } = self;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) => Err(ExecutorError::staging(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn temp_dir() -> TempDir {
        match TempDir::new() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        }
    }

    #[test]
    fn file_names_follow_language_scheme() {
        assert_eq!(file_name(Language::Node, "abcd1234"), "index-abcd1234.js");
        assert_eq!(file_name(Language::Php, "abcd1234"), "index-abcd1234.php");
        assert_eq!(file_name(Language::Go, "abcd1234"), "main-abcd1234.go");
    }

    #[test]
    fn generated_name_check_rejects_lookalikes() {
        assert!(is_generated_name("index-abcd1234.js"));
        assert!(is_generated_name("main-00000000.go"));
        assert!(!is_generated_name("index-abcd123.js"), "suffix too short");
        assert!(!is_generated_name("index-ABCD1234.js"), "uppercase is never generated");
        assert!(!is_generated_name("main-abcd1234.js"), "stem and extension must agree");
        assert!(!is_generated_name("notes.txt"));
        assert!(!is_generated_name(".gitkeep"));
    }

    #[tokio::test]
    async fn stage_moves_source_into_staging_dir() {
        let work = temp_dir();
        let stage_root = temp_dir();
        let staging = Staging::new(work.path(), stage_root.path());

        let staged = match staging.stage(Language::Node, "console.log(1)").await {
            Ok(s) => s,
            Err(e) => panic!("stage failed: {e}"),
        };
        assert_eq!(staged.path().parent(), Some(stage_root.path()));
        let name = staged.path().file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(is_generated_name(name), "{name} must be a generated name");

        match tokio::fs::read_to_string(staged.path()).await {
            Ok(text) => assert_eq!(text, "console.log(1)"),
            Err(e) => panic!("staged file unreadable: {e}"),
        }
        assert!(!work.path().join(name).exists(), "draft must be removed after relocation");

        let path = staged.path().to_owned();
        if let Err(e) = staged.discard().await {
            panic!("discard failed: {e}");
        }
        assert!(!path.exists(), "discard must delete the staged file");
    }

    #[tokio::test]
    async fn stage_reports_missing_work_dir() {
        let root = temp_dir();
        let staging = Staging::new(root.path().join("missing"), root.path());
        let result = staging.stage(Language::Php, "<?php echo 1;").await;
        assert!(matches!(result, Err(ExecutorError::Staging { .. })), "got {result:?}");
    }

    #[tokio::test]
    async fn stage_cleans_draft_when_relocation_fails() {
        let work = temp_dir();
        let root = temp_dir();
        let staging = Staging::new(work.path(), root.path().join("absent"));
        let result = staging.stage(Language::Go, "package main").await;
        assert!(matches!(result, Err(ExecutorError::Staging { .. })), "got {result:?}");
        let leftovers = std::fs::read_dir(work.path()).map(Iterator::count).unwrap_or(usize::MAX);
        assert_eq!(leftovers, 0, "failed relocation must not leave a draft behind");
    }

    #[tokio::test]
    async fn prepare_removes_only_generated_files() {
        let root = temp_dir();
        let dir = root.path().join("tmp");
        let staging = Staging::new(root.path(), &dir);
        if let Err(e) = staging.prepare().await {
            panic!("first prepare failed: {e}");
        }
        assert!(dir.is_dir(), "prepare must create the directory");

        for name in ["index-aaaaaaaa.js", "main-12345678.go", "keep.txt"] {
            if let Err(e) = std::fs::write(dir.join(name), "x") {
                panic!("seed {name}: {e}");
            }
        }

        match staging.prepare().await {
            Ok(removed) => assert_eq!(removed, 2),
            Err(e) => panic!("prepare failed: {e}"),
        }
        assert!(dir.join("keep.txt").exists());
        assert!(!dir.join("index-aaaaaaaa.js").exists());
    }

    proptest::proptest! {
        #[test]
        fn proptest_suffix_is_always_generated(lang_idx in 0usize..3) {
            let lang = Language::ALL[lang_idx];
            let suffix = random_suffix();
            proptest::prop_assert_eq!(suffix.len(), SUFFIX_LEN);
            proptest::prop_assert!(
                suffix.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()),
                "suffix must be [a-z0-9], got {}", suffix
            );
            proptest::prop_assert!(is_generated_name(&file_name(lang, &suffix)));
        }
    }
}
