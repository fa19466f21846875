//! Chapter tree layout: paths, writing and reading chapter files.
//!
//! ```text
//! <root>/
//! ├── bsb/
//! │   ├── GEN/
//! │   │   ├── 1.json
//! │   │   └── ...
//! │   └── ...
//! └── cu1/
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use bibledata_shared::{BibleDataError, Result, VerseRecord};

/// Path of one chapter file under `root`.
pub fn chapter_path(root: &Path, folder: &str, book_id: &str, chapter: u32) -> PathBuf {
    root.join(folder).join(book_id).join(format!("{chapter}.json"))
}

/// Write a chapter as a pretty-printed JSON array, replacing any existing file.
///
/// Intermediate directories are created. The file is written to a temporary
/// sibling first and renamed into place.
pub fn write_chapter(
    root: &Path,
    folder: &str,
    book_id: &str,
    chapter: u32,
    verses: &[VerseRecord],
) -> Result<PathBuf> {
    let target = chapter_path(root, folder, book_id, chapter);
    let dir = root.join(folder).join(book_id);
    std::fs::create_dir_all(&dir).map_err(|e| BibleDataError::io(&dir, e))?;

    let json = serde_json::to_string_pretty(verses)
        .map_err(|e| BibleDataError::parse(format!("serialize {book_id}/{chapter}: {e}")))?;

    let temp = dir.join(format!(".{chapter}.json.tmp"));
    std::fs::write(&temp, json).map_err(|e| BibleDataError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, &target) {
        let _ = std::fs::remove_file(&temp);
        return Err(BibleDataError::io(&target, e));
    }

    debug!(path = %target.display(), verses = verses.len(), "wrote chapter");
    Ok(target)
}

/// Read a chapter file back into verse records.
pub fn read_chapter(path: &Path) -> Result<Vec<VerseRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| BibleDataError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| BibleDataError::parse(format!("{}: {e}", path.display())))
}

/// Immediate subdirectories of `dir`, sorted by name.
pub(crate) fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| BibleDataError::io(dir, e))? {
        let entry = entry.map_err(|e| BibleDataError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// `*.json` files in `dir` named by chapter number, sorted numerically.
/// Files with a non-numeric stem are skipped.
pub(crate) fn chapter_files(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| BibleDataError::io(dir, e))? {
        let entry = entry.map_err(|e| BibleDataError::io(dir, e))?;
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        match path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u32>().ok())
        {
            Some(chapter) => files.push((chapter, path)),
            None => debug!(path = %path.display(), "not a chapter file, skipping"),
        }
    }
    files.sort();
    Ok(files)
}

/// Final path component as a string, for labels and book IDs.
pub(crate) fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("bibledata-writer-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn chapter_path_layout() {
        let path = chapter_path(Path::new("/data"), "bsb", "GEN", 12);
        assert_eq!(path, PathBuf::from("/data/bsb/GEN/12.json"));
    }

    #[test]
    fn write_then_read_roundtrip_with_non_ascii() {
        let tmp = temp_dir();
        let verses = vec![
            VerseRecord::new(1, "太初有道，道與神同在，道就是神。"),
            VerseRecord::new(2, "“Let there be light,” — and there was light."),
        ];

        let path = write_chapter(&tmp, "cu1", "JHN", 1, &verses).unwrap();
        assert_eq!(path, tmp.join("cu1/JHN/1.json"));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("太初有道"), "non-ASCII text must not be escaped");
        assert!(raw.starts_with("[\n  {\n    \"verse\": 1,"));

        assert_eq!(read_chapter(&path).unwrap(), verses);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_overwrites_and_leaves_no_temp_files() {
        let tmp = temp_dir();

        let old = [VerseRecord::new(1, "old"), VerseRecord::new(2, "old")];
        write_chapter(&tmp, "bsb", "RUT", 1, &old).unwrap();
        let path = write_chapter(&tmp, "bsb", "RUT", 1, &[VerseRecord::new(1, "new")]).unwrap();

        assert_eq!(read_chapter(&path).unwrap(), vec![VerseRecord::new(1, "new")]);

        let leftovers: Vec<_> = std::fs::read_dir(tmp.join("bsb/RUT"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let tmp = temp_dir();
        // A non-empty directory in the way makes the rename fail.
        std::fs::create_dir_all(tmp.join("bsb/GEN/1.json/blocker")).unwrap();

        let err = write_chapter(&tmp, "bsb", "GEN", 1, &[VerseRecord::new(1, "a")]).unwrap_err();
        assert!(matches!(err, BibleDataError::Io { .. }));
        assert!(!tmp.join("bsb/GEN/.1.json.tmp").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn read_chapter_rejects_malformed_file() {
        let tmp = temp_dir();
        let path = tmp.join("broken.json");
        std::fs::write(&path, "{\"verse\": 1").unwrap();

        let err = read_chapter(&path).unwrap_err();
        assert!(matches!(err, BibleDataError::Parse { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn chapter_files_sort_numerically() {
        let tmp = temp_dir();
        for name in ["10.json", "2.json", "1.json", "books.json", "3.txt"] {
            std::fs::write(tmp.join(name), "[]").unwrap();
        }
        std::fs::create_dir_all(tmp.join("4.json")).unwrap();

        let chapters: Vec<u32> = chapter_files(&tmp)
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(chapters, vec![1, 2, 10]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn sorted_subdirs_ignores_files() {
        let tmp = temp_dir();
        for dir in ["GEN", "EXO", "1SA"] {
            std::fs::create_dir_all(tmp.join(dir)).unwrap();
        }
        std::fs::write(tmp.join("books.json"), "[]").unwrap();

        let names: Vec<String> = sorted_subdirs(&tmp)
            .unwrap()
            .iter()
            .map(|p| dir_name(p))
            .collect();
        assert_eq!(names, vec!["1SA", "EXO", "GEN"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
