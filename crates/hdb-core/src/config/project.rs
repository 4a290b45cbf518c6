//! Project directory layout and `hdb init`

use super::credentials_file::{CredentialStore, ENV_FILE, ENV_FILE_TEMPLATE};
use super::selection::{CONFIG_FILE, SelectionDocument, SelectionStore};
use crate::error::{HdbError, HdbResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Ignore file kept up to date by init
pub const GITIGNORE: &str = ".gitignore";

const GITIGNORE_HEADER: &str = "# HarperDB Helper Configuration";

/// What init did to `.gitignore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitignoreUpdate {
    Created,
    /// Entries appended to an existing file
    Updated(Vec<String>),
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub created_credentials: bool,
    pub created_selection: bool,
    pub gitignore: GitignoreUpdate,
}

/// Locations of the configuration files for one project directory
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    project_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    /// Paths relative to the working directory
    pub fn current() -> HdbResult<Self> {
        let dir = std::env::current_dir()
            .map_err(|e| HdbError::io(format!("Cannot determine working directory: {e}")))?;
        Ok(Self::new(dir))
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn env_file(&self) -> PathBuf {
        self.project_dir.join(ENV_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.project_dir.join(CONFIG_FILE)
    }

    pub fn gitignore(&self) -> PathBuf {
        self.project_dir.join(GITIGNORE)
    }

    /// Both configuration files exist
    pub fn is_initialized(&self) -> bool {
        self.env_file().exists() && self.config_file().exists()
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(self.env_file())
    }

    pub fn selection_store(&self) -> SelectionStore {
        SelectionStore::new(self.config_file())
    }

    /// Create missing configuration files and make sure both are ignored
    /// by git. Existing files are left as they are.
    pub fn initialize_files(&self) -> HdbResult<InitReport> {
        let credentials = self.credential_store();
        let created_credentials = !credentials.exists();
        if created_credentials {
            credentials.write_text(ENV_FILE_TEMPLATE)?;
            info!("Created {}", ENV_FILE);
        }

        let selection = self.selection_store();
        let created_selection = !selection.exists();
        if created_selection {
            selection.write(&SelectionDocument::default())?;
            info!("Created {}", CONFIG_FILE);
        }

        let gitignore = self.update_gitignore()?;

        Ok(InitReport {
            created_credentials,
            created_selection,
            gitignore,
        })
    }

    fn update_gitignore(&self) -> HdbResult<GitignoreUpdate> {
        let path = self.gitignore();
        if !path.exists() {
            let content = format!("{GITIGNORE_HEADER}\n{CONFIG_FILE}\n{ENV_FILE}\n");
            fs::write(&path, content).map_err(|e| HdbError::io_at(&path, e))?;
            return Ok(GitignoreUpdate::Created);
        }

        let existing = fs::read_to_string(&path).map_err(|e| HdbError::io_at(&path, e))?;
        let missing = missing_ignore_entries(&existing);
        if missing.is_empty() {
            debug!("{} already lists the configuration files", GITIGNORE);
            return Ok(GitignoreUpdate::Unchanged);
        }

        let mut content = existing;
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        if !content.contains(GITIGNORE_HEADER) {
            content.push_str(GITIGNORE_HEADER);
            content.push('\n');
        }
        for entry in &missing {
            content.push_str(entry);
            content.push('\n');
        }
        fs::write(&path, content).map_err(|e| HdbError::io_at(&path, e))?;

        Ok(GitignoreUpdate::Updated(missing))
    }
}

/// Configuration file names not yet listed in `contents`
pub fn missing_ignore_entries(contents: &str) -> Vec<String> {
    [CONFIG_FILE, ENV_FILE]
        .into_iter()
        .filter(|entry| !contents.lines().any(|line| line.trim() == *entry))
        .map(str::to_string)
        .collect()
}
