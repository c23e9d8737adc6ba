/// Non-overlapping occurrences of `query` in `text`. An empty query never matches.
pub fn count_matches(text: &str, query: &str, case_sensitive: bool) -> usize {
    if query.is_empty() {
        return 0;
    }
    if case_sensitive {
        return text.matches(query).count();
    }
    text.to_lowercase().matches(&query.to_lowercase()).count()
}

/// Sums [`count_matches`] over every page.
pub fn count_matches_in_pages<'a>(
    pages: impl IntoIterator<Item = &'a str>,
    query: &str,
    case_sensitive: bool,
) -> usize {
    pages
        .into_iter()
        .map(|text| count_matches(text, query, case_sensitive))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::{count_matches, count_matches_in_pages};

    #[test]
    fn counts_across_pages() {
        let total = count_matches_in_pages(["the cat the dog", "a the"], "the", false);
        assert_eq!(total, 3);
    }

    #[test]
    fn matches_do_not_overlap() {
        assert_eq!(count_matches("aaaa", "aa", false), 2);
        assert_eq!(count_matches("abababa", "aba", false), 2);
    }

    #[test]
    fn case_handling() {
        assert_eq!(count_matches("The THE the", "the", false), 3);
        assert_eq!(count_matches("The THE the", "the", true), 1);
        assert_eq!(count_matches("Straße", "STRASSE", false), 0);
    }

    #[test]
    fn empty_query_is_zero() {
        assert_eq!(count_matches("anything", "", false), 0);
        assert_eq!(count_matches("", "x", false), 0);
    }
}
