use std::path::Path;

use crate::error::Result;
use crate::options::LoadOptions;
use crate::process::{self, LoadProgress, LoadReport};
use crate::repository::Repository;

/// Owns the repository for one loading session.
///
/// Each `load_*` call parses its inputs, replaces records with the same ids
/// and resolves inheritance for what it built. `clear` empties everything;
/// `reload_directory` builds into a fresh repository and swaps it in only
/// when the whole load succeeded, so readers never see a half-built state.
#[derive(Debug, Clone, Default)]
pub struct TemplateDatabase {
    repository: Repository,
    options: LoadOptions,
}

impl TemplateDatabase {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            repository: Repository::new(),
            options,
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn into_repository(self) -> Repository {
        self.repository
    }

    pub fn load_directory(&mut self, dir: &Path) -> Result<LoadReport> {
        process::load_directory(&mut self.repository, dir, &self.options)
    }

    pub fn load_directory_with_progress<F>(&mut self, dir: &Path, progress: F) -> Result<LoadReport>
    where
        F: FnMut(&LoadProgress<'_>),
    {
        process::load_directory_with_progress(&mut self.repository, dir, &self.options, progress)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<LoadReport> {
        process::load_file(&mut self.repository, path, &self.options)
    }

    pub fn load_text(&mut self, content: &str, source: &str) -> LoadReport {
        process::load_text(&mut self.repository, content, source, &self.options)
    }

    pub fn clear(&mut self) {
        self.repository.clear();
    }

    pub fn reload_directory<F>(&mut self, dir: &Path, progress: F) -> Result<LoadReport>
    where
        F: FnMut(&LoadProgress<'_>),
    {
        let mut fresh = Repository::new();
        let report =
            process::load_directory_with_progress(&mut fresh, dir, &self.options, progress)?;
        self.repository = fresh;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_and_reload_failure() {
        let mut db = TemplateDatabase::default();
        db.load_text("Weapon Gun\n  Damage = 5\nEnd\n", "w.ini");
        assert_eq!(db.repository().counts().weapons, 1);

        // A failed reload keeps the old contents.
        assert!(db.reload_directory(Path::new("/definitely/not/here"), |_| {}).is_err());
        assert!(db.repository().weapon("Gun").is_some());

        db.clear();
        assert!(db.repository().is_empty());
    }
}
