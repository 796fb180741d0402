use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use lending_core::ledger::Book;

/// Read a JSON or YAML file (by extension) and deserialise into a typed struct.
pub fn read_structured<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    Ok(value)
}

/// Load a lending book.
pub fn read_book(path: &str) -> Result<Book, Box<dyn std::error::Error>> {
    let book: Book = read_structured(path)?;
    log::debug!(
        "Read book '{}' ({} clients, {} loans)",
        path,
        book.clients.len(),
        book.loans.len()
    );
    Ok(book)
}

/// Write a book back in the format its extension names.
pub fn write_book(path: &str, book: &Book) -> Result<(), Box<dyn std::error::Error>> {
    let target = resolve_path(path)?;
    let contents = serialize_for(&target, book)?;
    fs::write(&target, contents)
        .map_err(|e| format!("Failed to write '{}': {}", target.display(), e))?;
    log::info!("Wrote book to {}", target.display());
    Ok(())
}

fn serialize_for<T: Serialize>(path: &Path, value: &T) -> Result<String, Box<dyn std::error::Error>> {
    if is_yaml(path) {
        Ok(serde_yaml::to_string(value)?)
    } else {
        let mut s = serde_json::to_string_pretty(value)?;
        s.push('\n');
        Ok(s)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
