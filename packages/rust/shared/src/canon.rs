//! The 66-book Protestant canon with book IDs and chapter counts.

use serde::Serialize;

use crate::error::{BibleDataError, Result};

/// Old or New Testament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Old,
    New,
}

/// A canonical book: display name, three-character ID and chapter count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Book {
    pub name: &'static str,
    pub id: &'static str,
    pub testament: Testament,
    pub chapters: u32,
}

const fn ot(name: &'static str, id: &'static str, chapters: u32) -> Book {
    Book {
        name,
        id,
        testament: Testament::Old,
        chapters,
    }
}

const fn nt(name: &'static str, id: &'static str, chapters: u32) -> Book {
    Book {
        name,
        id,
        testament: Testament::New,
        chapters,
    }
}

/// All books in canonical order.
pub const BOOKS: [Book; 66] = [
    ot("Genesis", "GEN", 50),
    ot("Exodus", "EXO", 40),
    ot("Leviticus", "LEV", 27),
    ot("Numbers", "NUM", 36),
    ot("Deuteronomy", "DEU", 34),
    ot("Joshua", "JOS", 24),
    ot("Judges", "JDG", 21),
    ot("Ruth", "RUT", 4),
    ot("1 Samuel", "1SA", 31),
    ot("2 Samuel", "2SA", 24),
    ot("1 Kings", "1KI", 22),
    ot("2 Kings", "2KI", 25),
    ot("1 Chronicles", "1CH", 29),
    ot("2 Chronicles", "2CH", 36),
    ot("Ezra", "EZR", 10),
    ot("Nehemiah", "NEH", 13),
    ot("Esther", "EST", 10),
    ot("Job", "JOB", 42),
    ot("Psalms", "PSA", 150),
    ot("Proverbs", "PRO", 31),
    ot("Ecclesiastes", "ECC", 12),
    ot("Song of Solomon", "SNG", 8),
    ot("Isaiah", "ISA", 66),
    ot("Jeremiah", "JER", 52),
    ot("Lamentations", "LAM", 5),
    ot("Ezekiel", "EZK", 48),
    ot("Daniel", "DAN", 12),
    ot("Hosea", "HOS", 14),
    ot("Joel", "JOL", 3),
    ot("Amos", "AMO", 9),
    ot("Obadiah", "OBA", 1),
    ot("Jonah", "JON", 4),
    ot("Micah", "MIC", 7),
    ot("Nahum", "NAM", 3),
    ot("Habakkuk", "HAB", 3),
    ot("Zephaniah", "ZEP", 3),
    ot("Haggai", "HAG", 2),
    ot("Zechariah", "ZEC", 14),
    ot("Malachi", "MAL", 4),
    nt("Matthew", "MAT", 28),
    nt("Mark", "MRK", 16),
    nt("Luke", "LUK", 24),
    nt("John", "JHN", 21),
    nt("Acts", "ACT", 28),
    nt("Romans", "ROM", 16),
    nt("1 Corinthians", "1CO", 16),
    nt("2 Corinthians", "2CO", 13),
    nt("Galatians", "GAL", 6),
    nt("Ephesians", "EPH", 6),
    nt("Philippians", "PHP", 4),
    nt("Colossians", "COL", 4),
    nt("1 Thessalonians", "1TH", 5),
    nt("2 Thessalonians", "2TH", 3),
    nt("1 Timothy", "1TI", 6),
    nt("2 Timothy", "2TI", 4),
    nt("Titus", "TIT", 3),
    nt("Philemon", "PHM", 1),
    nt("Hebrews", "HEB", 13),
    nt("James", "JAS", 5),
    nt("1 Peter", "1PE", 5),
    nt("2 Peter", "2PE", 3),
    nt("1 John", "1JN", 5),
    nt("2 John", "2JN", 1),
    nt("3 John", "3JN", 1),
    nt("Jude", "JUD", 1),
    nt("Revelation", "REV", 22),
];

/// Look up a book by ID, ignoring ASCII case.
pub fn find_book(id: &str) -> Option<&'static Book> {
    BOOKS.iter().find(|b| b.id.eq_ignore_ascii_case(id))
}

/// Resolve a list of book IDs to canon entries, in canonical order.
/// An empty list selects every book.
pub fn select_books<S: AsRef<str>>(ids: &[S]) -> Result<Vec<&'static Book>> {
    if ids.is_empty() {
        return Ok(BOOKS.iter().collect());
    }

    for id in ids {
        if find_book(id.as_ref()).is_none() {
            return Err(BibleDataError::validation(format!(
                "unknown book id '{}'",
                id.as_ref()
            )));
        }
    }

    Ok(BOOKS
        .iter()
        .filter(|b| ids.iter().any(|id| b.id.eq_ignore_ascii_case(id.as_ref())))
        .collect())
}

/// Total number of chapters across the given books.
pub fn total_chapters<'a>(books: impl IntoIterator<Item = &'a Book>) -> usize {
    books.into_iter().map(|b| b.chapters as usize).sum()
}
