use gameini::{BlockSet, Diagnostic, DiagnosticKind, SourceLocation, parse_str, read_source};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::builder::{BuiltRecord, build_record};
use crate::error::{Error, Result};
use crate::inherit::resolve;
use crate::options::LoadOptions;
use crate::repository::Repository;
use crate::types::ObjectRecord;

/// Handed to the progress callback after each input has been parsed.
#[derive(Debug, Clone, Copy)]
pub struct LoadProgress<'a> {
    /// 1-based position of this input.
    pub index: usize,
    pub total: usize,
    pub source: &'a str,
    /// Blocks found in this input, before merging with earlier inputs.
    pub blocks: usize,
}

/// Summary of one load call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub sources: Vec<String>,
    /// Distinct `(kind, name)` blocks after merging.
    pub blocks: usize,
    pub objects: usize,
    pub weapons: usize,
    pub armors: usize,
    pub generic_blocks: usize,
    pub inherited_fields: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadReport {
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Blocks parsed so far in this call. Nothing reaches the repository until
/// every input has been read.
#[derive(Default)]
struct Staging {
    blocks: BlockSet,
    report: LoadReport,
}

impl Staging {
    fn add(&mut self, text: &str, label: &str) -> usize {
        let parsed = parse_str(text, label);
        let count = parsed.blocks.len();
        self.report.sources.push(label.to_string());
        self.report.diagnostics.extend(parsed.diagnostics);
        self.blocks.extend(parsed.blocks);
        count
    }

    fn commit(self, repo: &mut Repository, options: &LoadOptions) -> LoadReport {
        let Staging { blocks, mut report } = self;
        report.blocks = blocks.len();

        // Object and ObjectReskin blocks are merged separately but share one
        // id space in the repository.
        let mut built_objects: BTreeMap<String, Option<SourceLocation>> = BTreeMap::new();
        for block in blocks.into_blocks() {
            let record = build_record(block);
            match &record {
                BuiltRecord::Object(r) => match built_objects.get(&r.id) {
                    Some(previous) => {
                        report.diagnostics.push(duplicate_object(r, previous.as_ref()));
                    }
                    None => {
                        report.objects += 1;
                        built_objects.insert(r.id.clone(), r.location.clone());
                    }
                },
                BuiltRecord::Weapon(_) => report.weapons += 1,
                BuiltRecord::Armor(_) => report.armors += 1,
                BuiltRecord::Generic(_) => report.generic_blocks += 1,
            }
            repo.insert(record);
        }

        if options.resolve_inheritance {
            // Children stored by earlier calls whose parent arrived in this one.
            let waiting: Vec<String> = repo
                .objects()
                .filter(|o| {
                    !built_objects.contains_key(&o.id)
                        && o.parent_id
                            .as_deref()
                            .is_some_and(|p| built_objects.contains_key(p))
                })
                .map(|o| o.id.clone())
                .collect();
            let ids = built_objects
                .keys()
                .chain(waiting.iter())
                .map(String::as_str);
            let resolution = resolve(repo, ids);
            report.inherited_fields = resolution.inherited_fields;
            report.diagnostics.extend(resolution.diagnostics);
        }

        log::info!(
            "Loaded {} blocks from {} sources ({} objects, {} weapons, {} armors, {} other), {} warnings",
            report.blocks,
            report.sources.len(),
            report.objects,
            report.weapons,
            report.armors,
            report.generic_blocks,
            report.warning_count()
        );
        report
    }
}

fn duplicate_object(record: &ObjectRecord, previous: Option<&SourceLocation>) -> Diagnostic {
    let message = match previous {
        Some(at) => format!("object {} replaces the one defined at {}", record.id, at),
        None => format!("object {} is defined twice", record.id),
    };
    Diagnostic::new(DiagnosticKind::DuplicateObject, record.location.clone(), message).emit()
}

/// Every file under `dir` with the configured extension, walked in file-name
/// order at each level so merge order is the same on every platform.
pub fn discover_files(dir: &Path, options: &LoadOptions) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let mut walker = WalkDir::new(dir)
        .follow_links(options.follow_links)
        .sort_by_file_name();
    if let Some(depth) = options.max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && options.matches_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub fn load_directory(
    repo: &mut Repository,
    dir: &Path,
    options: &LoadOptions,
) -> Result<LoadReport> {
    load_directory_with_progress(repo, dir, options, |_| {})
}

pub fn load_directory_with_progress<F>(
    repo: &mut Repository,
    dir: &Path,
    options: &LoadOptions,
    progress: F,
) -> Result<LoadReport>
where
    F: FnMut(&LoadProgress<'_>),
{
    let files = discover_files(dir, options)?;
    log::debug!("Discovered {} files under {:?}", files.len(), dir);
    load_files_with_progress(repo, &files, options, progress)
}

/// Parses `files` in the given order, then builds and resolves records.
/// If any file cannot be read the repository is left as it was.
pub fn load_files_with_progress<F>(
    repo: &mut Repository,
    files: &[PathBuf],
    options: &LoadOptions,
    mut progress: F,
) -> Result<LoadReport>
where
    F: FnMut(&LoadProgress<'_>),
{
    let mut staging = Staging::default();
    let total = files.len();

    for (i, path) in files.iter().enumerate() {
        let text = read_source(path)?;
        let label = path.display().to_string();
        let blocks = staging.add(&text, &label);
        log::debug!("Parsed {} ({} blocks)", label, blocks);
        progress(&LoadProgress {
            index: i + 1,
            total,
            source: &label,
            blocks,
        });
    }

    Ok(staging.commit(repo, options))
}

pub fn load_file(repo: &mut Repository, path: &Path, options: &LoadOptions) -> Result<LoadReport> {
    load_files_with_progress(repo, &[path.to_path_buf()], options, |_| {})
}

/// Parses in-memory text labelled `source`. Cannot fail: text needs no I/O.
pub fn load_text(
    repo: &mut Repository,
    content: &str,
    source: &str,
    options: &LoadOptions,
) -> LoadReport {
    let mut staging = Staging::default();
    staging.add(content, source);
    staging.commit(repo, options)
}
