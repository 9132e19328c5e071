use crate::abstract_source::{ErrorDetails, ErrorLayer, Result, SourceError};
use crate::file_format::tree::Tree;

pub fn write_file_ensuring_parent_dir(file_path: &str, contents: &str) -> Result<()> {
    let as_path = std::path::Path::new(file_path);
    let parent_path = match as_path.parent() {
        Some(p) => p,
        None => {
            return Err(SourceError::StickyProblem(ErrorDetails {
                layer: ErrorLayer::DataLayer,
                message: format!("Problem getting parent of '{}'", file_path),
            }));
        }
    };
    // A bare file name has an empty parent, which is the current directory.
    if !parent_path.as_os_str().is_empty() {
        if let Err(e) = std::fs::create_dir_all(parent_path) {
            return Err(SourceError::StickyProblem(ErrorDetails {
                layer: ErrorLayer::DataLayer,
                message: format!("Problem creating parent of '{}': {}", file_path, e),
            }));
        }
    }
    std::fs::write(as_path, contents)?;
    Ok(())
}

/// Serialize `tree` to `file_path`, returning the number of bytes written.
pub fn write_document(file_path: &str, tree: &Tree) -> Result<usize> {
    let document = tree.to_document_string()?;
    write_file_ensuring_parent_dir(file_path, &document)?;
    Ok(document.len())
}

pub fn read_document(file_path: &str) -> Result<Tree> {
    let contents = match std::fs::read_to_string(file_path) {
        Ok(contents) => contents,
        Err(e) => {
            return Err(SourceError::StickyProblem(ErrorDetails {
                layer: ErrorLayer::DataLayer,
                message: format!("Problem reading '{}': {}", file_path, e),
            }));
        }
    };
    Ok(Tree::from_document_str(&contents)?)
}

const SIZE_UNITS: [&str; 6] = ["B", "kB", "MB", "GB", "TB", "PB"];

/// `1536` => `"1.50 kB"`.  Powers of 1024; anything past petabytes stays in
/// petabytes.
pub fn human_size(len: usize) -> String {
    let mut size = len as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:4.2} {}", size, SIZE_UNITS[unit])
}
