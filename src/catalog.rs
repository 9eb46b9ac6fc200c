/// A programming language a challenge can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub id: &'static str,
    pub name: &'static str,
}

pub const PROGRAMMING_LANGUAGES: &[Language] = &[
    Language {
        id: "javascript",
        name: "JavaScript",
    },
    Language {
        id: "python",
        name: "Python",
    },
    Language {
        id: "typescript",
        name: "TypeScript",
    },
    Language {
        id: "java",
        name: "Java",
    },
    Language { id: "go", name: "Go" },
    Language {
        id: "rust",
        name: "Rust",
    },
    Language {
        id: "html",
        name: "HTML",
    },
];

/// The language selected when nothing else was configured
pub fn default_language() -> &'static Language {
    &PROGRAMMING_LANGUAGES[0]
}

/// Look a language up by id, case-insensitively
pub fn find(id: &str) -> Option<&'static Language> {
    PROGRAMMING_LANGUAGES
        .iter()
        .find(|l| l.id.eq_ignore_ascii_case(id.trim()))
}

pub fn index_of(language: &Language) -> usize {
    PROGRAMMING_LANGUAGES
        .iter()
        .position(|l| l.id == language.id)
        .unwrap_or(0)
}

/// Step through the catalog, wrapping at both ends
pub fn cycle(current: &Language, step: isize) -> &'static Language {
    let len = PROGRAMMING_LANGUAGES.len() as isize;
    let idx = (index_of(current) as isize + step).rem_euclid(len);
    &PROGRAMMING_LANGUAGES[idx as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<_> = PROGRAMMING_LANGUAGES.iter().map(|l| l.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), PROGRAMMING_LANGUAGES.len());
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("Rust").map(|l| l.name), Some("Rust"));
        assert_eq!(find("  go ").map(|l| l.name), Some("Go"));
        assert!(find("cobol").is_none());
    }

    #[test]
    fn test_default_language() {
        assert_eq!(default_language().name, "JavaScript");
    }

    #[test]
    fn test_cycle_wraps() {
        let first = &PROGRAMMING_LANGUAGES[0];
        let last = PROGRAMMING_LANGUAGES.last().unwrap();

        assert_eq!(cycle(first, -1), last);
        assert_eq!(cycle(last, 1), first);
        assert_eq!(cycle(first, 1).id, "python");
    }
}
