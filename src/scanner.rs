use anyhow::Result;
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// File scanner for traversing source directories.
///
/// The `FileScanner` recursively walks through a directory to find all files with a given
/// extension (`php` unless configured otherwise). It skips hidden directories (those
/// starting with `.`) and the `vendor` and `var` directories of a Symfony project.
/// Files are returned in a stable, name-sorted walk order so that repeated runs see the
/// same file order.
///
/// # Example
///
/// ```no_run
/// use route_extractor::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./src")).with_extension("php");
/// let result = scanner.scan().unwrap();
/// println!("Found {} PHP files", result.files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    extension: String,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered files and any warnings encountered during scanning.
pub struct ScanResult {
    /// Paths of all discovered files, in walk order
    pub files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

/// Directory names never descended into
const SKIPPED_DIRS: [&str; 2] = ["vendor", "var"];

impl FileScanner {
    /// Creates a new `FileScanner` for `.php` files below `root_path`.
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            extension: "php".to_string(),
        }
    }

    /// Sets the extension (with or without the leading dot) of the collected files.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Scans the directory tree and collects all matching files.
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_skipped = e.file_type().is_dir() && SKIPPED_DIRS.contains(&&*file_name);

                !is_hidden && !is_skipped
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_file()
                        && path.extension().and_then(|s| s.to_str()) == Some(self.extension.as_str())
                    {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult { files, warnings })
    }
}
