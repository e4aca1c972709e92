use std::{fs, io, path::Path};

/// Create a symlink to a directory.
///
/// The `link` path will be a symbolic link pointing to `original`.
pub fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    return std::os::unix::fs::symlink(original, link);
    #[cfg(windows)]
    return junction::create(original, link); // junctions instead of symlinks because symlinks may require elevated privileges.
}

/// Create a symlink to a directory, replacing whatever occupies `link`.
///
/// The parent directory of `link` is created when missing (scoped package
/// names need their `@scope` directory first).
pub fn force_symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)?;
    }
    match link.symlink_metadata() {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            #[cfg(unix)]
            fs::remove_file(link)?;
            #[cfg(windows)]
            fs::remove_dir(link).or_else(|_| fs::remove_file(link))?;
        }
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(link)?,
        Ok(_) => fs::remove_file(link)?,
        Err(_) => {}
    }
    symlink_dir(original, link)
}

/// Hardlink `original` to `link`, replacing an existing file.
///
/// The parent directory of `link` is created when missing.
pub fn force_hardlink_file(original: &Path, link: &Path) -> io::Result<()> {
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)?;
    }
    if link.symlink_metadata().is_ok() {
        fs::remove_file(link)?;
    }
    fs::hard_link(original, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn force_symlink_dir_replaces_existing_link() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let link = dir.path().join("nested").join("link");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();

        force_symlink_dir(&first, &link).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), first);

        force_symlink_dir(&second, &link).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), second);
    }

    #[test]
    #[cfg(unix)]
    fn force_hardlink_file_shares_the_inode() {
        use std::os::unix::fs::MetadataExt;

        let dir = tempdir().unwrap();
        let original = dir.path().join("original");
        let link = dir.path().join("farm").join("link");
        fs::write(&original, "content").unwrap();

        force_hardlink_file(&original, &link).unwrap();
        assert_eq!(
            fs::metadata(&original).unwrap().ino(),
            fs::metadata(&link).unwrap().ino(),
        );

        // Replacing is idempotent.
        force_hardlink_file(&original, &link).unwrap();
        assert_eq!(fs::read_to_string(&link).unwrap(), "content");
    }
}
