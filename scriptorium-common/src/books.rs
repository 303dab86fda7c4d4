//! Protestant canon catalog: USFM book codes, English names and groupings
//!
//! Group order and membership drive both the book selector and the
//! completion grid, so the two always lay out books identically.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Testament {
    Old,
    New,
}

impl Testament {
    /// Short badge text
    pub fn abbrev(&self) -> &'static str {
        match self {
            Testament::Old => "OT",
            Testament::New => "NT",
        }
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// Named run of books sharing a color scheme
#[derive(Debug, Clone, Copy)]
pub struct BookGroup {
    pub title: &'static str,
    /// CSS-friendly key for the group's color scheme
    pub key: &'static str,
    pub testament: Testament,
    pub books: &'static [&'static str],
}

const BOOK_NAMES: &[(&str, &str)] = &[
    ("GEN", "Genesis"),
    ("EXO", "Exodus"),
    ("LEV", "Leviticus"),
    ("NUM", "Numbers"),
    ("DEU", "Deuteronomy"),
    ("JOS", "Joshua"),
    ("JDG", "Judges"),
    ("RUT", "Ruth"),
    ("1SA", "1 Samuel"),
    ("2SA", "2 Samuel"),
    ("1KI", "1 Kings"),
    ("2KI", "2 Kings"),
    ("1CH", "1 Chronicles"),
    ("2CH", "2 Chronicles"),
    ("EZR", "Ezra"),
    ("NEH", "Nehemiah"),
    ("EST", "Esther"),
    ("JOB", "Job"),
    ("PSA", "Psalms"),
    ("PRO", "Proverbs"),
    ("ECC", "Ecclesiastes"),
    ("SNG", "Song of Songs"),
    ("ISA", "Isaiah"),
    ("JER", "Jeremiah"),
    ("LAM", "Lamentations"),
    ("EZK", "Ezekiel"),
    ("DAN", "Daniel"),
    ("HOS", "Hosea"),
    ("JOL", "Joel"),
    ("AMO", "Amos"),
    ("OBA", "Obadiah"),
    ("JON", "Jonah"),
    ("MIC", "Micah"),
    ("NAM", "Nahum"),
    ("HAB", "Habakkuk"),
    ("ZEP", "Zephaniah"),
    ("HAG", "Haggai"),
    ("ZEC", "Zechariah"),
    ("MAL", "Malachi"),
    ("MAT", "Matthew"),
    ("MRK", "Mark"),
    ("LUK", "Luke"),
    ("JHN", "John"),
    ("ACT", "Acts"),
    ("ROM", "Romans"),
    ("1CO", "1 Corinthians"),
    ("2CO", "2 Corinthians"),
    ("GAL", "Galatians"),
    ("EPH", "Ephesians"),
    ("PHP", "Philippians"),
    ("COL", "Colossians"),
    ("1TH", "1 Thessalonians"),
    ("2TH", "2 Thessalonians"),
    ("1TI", "1 Timothy"),
    ("2TI", "2 Timothy"),
    ("TIT", "Titus"),
    ("PHM", "Philemon"),
    ("HEB", "Hebrews"),
    ("JAS", "James"),
    ("1PE", "1 Peter"),
    ("2PE", "2 Peter"),
    ("1JN", "1 John"),
    ("2JN", "2 John"),
    ("3JN", "3 John"),
    ("JUD", "Jude"),
    ("REV", "Revelation"),
];

pub const BOOK_GROUPS: &[BookGroup] = &[
    BookGroup {
        title: "Pentateuch",
        key: "pentateuch",
        testament: Testament::Old,
        books: &["GEN", "EXO", "LEV", "NUM", "DEU"],
    },
    BookGroup {
        title: "Historical Books",
        key: "historical",
        testament: Testament::Old,
        books: &[
            "JOS", "JDG", "RUT", "1SA", "2SA", "1KI", "2KI", "1CH", "2CH", "EZR", "NEH", "EST",
        ],
    },
    BookGroup {
        title: "Wisdom & Poetry",
        key: "wisdom",
        testament: Testament::Old,
        books: &["JOB", "PSA", "PRO", "ECC", "SNG"],
    },
    BookGroup {
        title: "Major Prophets",
        key: "major-prophets",
        testament: Testament::Old,
        books: &["ISA", "JER", "LAM", "EZK", "DAN"],
    },
    BookGroup {
        title: "Minor Prophets",
        key: "minor-prophets",
        testament: Testament::Old,
        books: &[
            "HOS", "JOL", "AMO", "OBA", "JON", "MIC", "NAM", "HAB", "ZEP", "HAG", "ZEC", "MAL",
        ],
    },
    BookGroup {
        title: "Gospels & Acts",
        key: "gospels",
        testament: Testament::New,
        books: &["MAT", "MRK", "LUK", "JHN", "ACT"],
    },
    BookGroup {
        title: "Pauline Epistles",
        key: "pauline",
        testament: Testament::New,
        books: &[
            "ROM", "1CO", "2CO", "GAL", "EPH", "PHP", "COL", "1TH", "2TH", "1TI", "2TI", "TIT",
            "PHM",
        ],
    },
    BookGroup {
        title: "General Epistles",
        key: "general",
        testament: Testament::New,
        books: &["HEB", "JAS", "1PE", "2PE", "1JN", "2JN", "3JN", "JUD"],
    },
    BookGroup {
        title: "Apocalyptic",
        key: "apocalyptic",
        testament: Testament::New,
        books: &["REV"],
    },
];

/// English name for a book code, or the code itself when unknown
pub fn book_name(code: &str) -> &str {
    BOOK_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// All 66 book codes in canonical order
pub fn all_books() -> impl Iterator<Item = &'static str> {
    BOOK_GROUPS.iter().flat_map(|g| g.books.iter().copied())
}

/// Book codes of one testament in canonical order
pub fn testament_books(testament: Testament) -> impl Iterator<Item = &'static str> {
    BOOK_GROUPS
        .iter()
        .filter(move |g| g.testament == testament)
        .flat_map(|g| g.books.iter().copied())
}

/// Group a book belongs to
pub fn group_of(code: &str) -> Option<&'static BookGroup> {
    BOOK_GROUPS.iter().find(|g| g.books.contains(&code))
}

/// Split a training corpus string (`NT` or `MAT-ACT;1CO`) into display chips
pub fn parse_corpus(corpus: &str) -> Vec<String> {
    corpus.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
