// src/config/validate.rs

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::config::model::{BuildFile, MergeEntry, RawBuildFile, RawMergeEntry};
use crate::errors::{MergewatchError, Result};
use crate::types::SourceKind;

impl TryFrom<RawBuildFile> for BuildFile {
    type Error = MergewatchError;

    fn try_from(raw: RawBuildFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_tasks(&raw)?;

        let mut tasks: BTreeMap<String, Vec<MergeEntry>> = BTreeMap::new();
        for (name, entries) in &raw.task {
            let validated = validate_task(name, entries)?;
            tasks.insert(name.clone(), validated);
        }

        validate_output_paths(&tasks)?;

        Ok(BuildFile::new_unchecked(
            raw.options,
            raw.babel,
            raw.minify,
            tasks,
        ))
    }
}

fn ensure_has_tasks(raw: &RawBuildFile) -> Result<()> {
    if raw.task.is_empty() {
        return Err(MergewatchError::ConfigError(
            "build file must contain at least one [[task.<name>]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_task(name: &str, entries: &[RawMergeEntry]) -> Result<Vec<MergeEntry>> {
    if entries.is_empty() {
        return Err(MergewatchError::ConfigError(format!(
            "task '{}' has no file-set entries",
            name
        )));
    }

    let mut validated = Vec::with_capacity(entries.len());
    let mut task_kind: Option<SourceKind> = None;

    for entry in entries {
        let kind = resolve_kind(name, entry)?;

        match task_kind {
            None => task_kind = Some(kind),
            Some(existing) if existing != kind => {
                return Err(MergewatchError::ConfigError(format!(
                    "task '{}' mixes kinds '{}' and '{}'; all file-sets under one task must agree",
                    name, existing, kind
                )));
            }
            Some(_) => {}
        }

        if entry.files.is_empty() {
            return Err(MergewatchError::ConfigError(format!(
                "task '{}' has a file-set with an empty `files` list",
                name
            )));
        }
        if entry.output_dir.trim().is_empty() {
            return Err(MergewatchError::ConfigError(format!(
                "task '{}' has a file-set with an empty `output_dir`",
                name
            )));
        }
        if entry.concat_file_name.trim().is_empty()
            || entry.concat_file_name.contains('/')
            || entry.concat_file_name.contains('\\')
        {
            return Err(MergewatchError::ConfigError(format!(
                "task '{}' has an invalid `concat_file_name` '{}' (must be a bare file name)",
                name, entry.concat_file_name
            )));
        }

        validated.push(MergeEntry {
            kind,
            files: entry.files.iter().map(PathBuf::from).collect(),
            output_dir: PathBuf::from(&entry.output_dir),
            concat_file_name: entry.concat_file_name.clone(),
        });
    }

    Ok(validated)
}

fn resolve_kind(name: &str, entry: &RawMergeEntry) -> Result<SourceKind> {
    match entry.kind.or_else(|| SourceKind::infer(name)) {
        Some(kind) => Ok(kind),
        None => Err(MergewatchError::ConfigError(format!(
            "task '{}' needs an explicit `kind` (\"styles\" or \"scripts\")",
            name
        ))),
    }
}

/// Every file-set must write to its own destination; concurrent pipelines
/// rely on disjoint output paths.
fn validate_output_paths(tasks: &BTreeMap<String, Vec<MergeEntry>>) -> Result<()> {
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for (name, entries) in tasks {
        for entry in entries {
            let output = entry.output_dir.join(&entry.concat_file_name);
            if !seen.insert(output.clone()) {
                return Err(MergewatchError::ConfigError(format!(
                    "task '{}' writes to {:?}, which another file-set also writes to",
                    name, output
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{BabelSection, OptionsSection};

    fn raw_entry(files: &[&str], output_dir: &str, concat: &str) -> RawMergeEntry {
        RawMergeEntry {
            kind: None,
            files: files.iter().map(|s| s.to_string()).collect(),
            output_dir: output_dir.to_string(),
            concat_file_name: concat.to_string(),
        }
    }

    fn raw_with_tasks(task: BTreeMap<String, Vec<RawMergeEntry>>) -> RawBuildFile {
        RawBuildFile {
            options: OptionsSection::default(),
            babel: BabelSection::default(),
            minify: BTreeMap::new(),
            task,
        }
    }

    #[test]
    fn kind_inferred_from_conventional_task_name() {
        let mut task = BTreeMap::new();
        task.insert(
            "scripts".to_string(),
            vec![raw_entry(&["a.js"], "dist", "app.js")],
        );

        let build = BuildFile::try_from(raw_with_tasks(task)).unwrap();
        assert_eq!(build.tasks["scripts"][0].kind, SourceKind::Scripts);
    }

    #[test]
    fn unconventional_task_name_requires_explicit_kind() {
        let mut task = BTreeMap::new();
        task.insert(
            "vendor".to_string(),
            vec![raw_entry(&["a.js"], "dist", "vendor.js")],
        );

        let err = BuildFile::try_from(raw_with_tasks(task)).unwrap_err();
        assert!(matches!(err, MergewatchError::ConfigError(_)));
    }

    #[test]
    fn mixed_kinds_under_one_task_are_rejected() {
        let mut styles = raw_entry(&["a.css"], "dist", "a.css");
        styles.kind = Some(SourceKind::Styles);
        let mut scripts = raw_entry(&["b.js"], "dist", "b.js");
        scripts.kind = Some(SourceKind::Scripts);

        let mut task = BTreeMap::new();
        task.insert("assets".to_string(), vec![styles, scripts]);

        assert!(BuildFile::try_from(raw_with_tasks(task)).is_err());
    }

    #[test]
    fn colliding_output_paths_are_rejected() {
        let mut task = BTreeMap::new();
        task.insert(
            "scripts".to_string(),
            vec![
                raw_entry(&["a.js"], "dist", "app.js"),
                raw_entry(&["b.js"], "dist", "app.js"),
            ],
        );

        assert!(BuildFile::try_from(raw_with_tasks(task)).is_err());
    }

    #[test]
    fn concat_file_name_must_be_bare() {
        let mut task = BTreeMap::new();
        task.insert(
            "scripts".to_string(),
            vec![raw_entry(&["a.js"], "dist", "js/app.js")],
        );

        assert!(BuildFile::try_from(raw_with_tasks(task)).is_err());
    }

    #[test]
    fn empty_build_file_is_rejected() {
        assert!(BuildFile::try_from(raw_with_tasks(BTreeMap::new())).is_err());
    }
}
