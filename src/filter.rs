use crate::catalog::MovieRecord;

/// Whether `movie` matches an already lower-cased search needle.
pub fn matches(movie: &MovieRecord, needle_lower: &str) -> bool {
    if movie.title.to_lowercase().contains(needle_lower) {
        return true;
    }
    match &movie.genre {
        Some(genre) => genre.to_lowercase().contains(needle_lower),
        None => false,
    }
}

/// Indices of the catalog entries visible for `search`, in catalog order.
pub fn visible_indices(catalog: &[MovieRecord], search: &str) -> Vec<usize> {
    if search.is_empty() {
        return (0..catalog.len()).collect();
    }
    let needle = search.to_lowercase();
    catalog
        .iter()
        .enumerate()
        .filter(|(_, movie)| matches(movie, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// The visible subsequence itself.
pub fn filter_catalog<'a>(catalog: &'a [MovieRecord], search: &str) -> Vec<&'a MovieRecord> {
    visible_indices(catalog, search)
        .into_iter()
        .map(|i| &catalog[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample;
    use proptest::prelude::*;

    fn scenario() -> Vec<MovieRecord> {
        vec![
            sample("1", "Inception", Some("Sci-Fi")),
            sample("2", "The Matrix", Some("Sci-Fi")),
            sample("3", "Goodfellas", Some("Crime")),
        ]
    }

    fn ids(movies: &[&MovieRecord]) -> Vec<String> {
        movies.iter().map(|m| m.id.clone()).collect()
    }

    #[test]
    fn test_genre_match_keeps_order() {
        let catalog = scenario();
        assert_eq!(ids(&filter_catalog(&catalog, "sci")), vec!["1", "2"]);
    }

    #[test]
    fn test_empty_search_is_identity() {
        let catalog = scenario();
        assert_eq!(ids(&filter_catalog(&catalog, "")), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let catalog = scenario();
        assert!(filter_catalog(&catalog, "zzz").is_empty());
    }

    #[test]
    fn test_title_match_is_case_insensitive() {
        let catalog = scenario();
        assert_eq!(ids(&filter_catalog(&catalog, "MATRIX")), vec!["2"]);
        assert_eq!(ids(&filter_catalog(&catalog, "fell")), vec!["3"]);
    }

    #[test]
    fn test_absent_genre_only_fails_genre_clause() {
        let catalog = vec![
            sample("1", "Crimson Tide", None),
            sample("2", "Heat", None),
            sample("3", "Se7en", Some("Crime")),
        ];
        assert_eq!(ids(&filter_catalog(&catalog, "crim")), vec!["1", "3"]);
    }

    #[test]
    fn test_search_is_not_trimmed() {
        let catalog = scenario();
        assert!(filter_catalog(&catalog, " inception").is_empty());
        assert_eq!(ids(&filter_catalog(&catalog, "the ")), vec!["2"]);
    }

    fn record_strategy() -> impl Strategy<Value = MovieRecord> {
        (
            "[a-zA-Z ]{0,12}",
            proptest::option::of("[a-zA-Z-]{0,8}"),
        )
            .prop_map(|(title, genre)| MovieRecord {
                id: String::new(),
                title,
                video_url: String::new(),
                poster_url: String::new(),
                duration_label: None,
                genre,
            })
    }

    fn catalog_strategy() -> impl Strategy<Value = Vec<MovieRecord>> {
        proptest::collection::vec(record_strategy(), 0..20).prop_map(|mut movies| {
            for (i, movie) in movies.iter_mut().enumerate() {
                movie.id = i.to_string();
            }
            movies
        })
    }

    proptest! {
        #[test]
        fn prop_result_is_ordered_subsequence(catalog in catalog_strategy(), search in "[a-zA-Z]{0,3}") {
            let indices = visible_indices(&catalog, &search);
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(indices.iter().all(|&i| i < catalog.len()));
        }

        #[test]
        fn prop_membership_matches_definition(catalog in catalog_strategy(), search in "[a-zA-Z]{0,3}") {
            let indices = visible_indices(&catalog, &search);
            let needle = search.to_lowercase();
            for (i, movie) in catalog.iter().enumerate() {
                let expected = search.is_empty()
                    || movie.title.to_lowercase().contains(&needle)
                    || movie.genre.as_ref().is_some_and(|g| g.to_lowercase().contains(&needle));
                prop_assert_eq!(indices.contains(&i), expected);
            }
        }

        #[test]
        fn prop_empty_search_returns_catalog(catalog in catalog_strategy()) {
            let visible = filter_catalog(&catalog, "");
            prop_assert_eq!(visible.len(), catalog.len());
            prop_assert!(visible.iter().zip(catalog.iter()).all(|(a, b)| *a == b));
        }

        #[test]
        fn prop_filter_is_deterministic(catalog in catalog_strategy(), search in "[a-z]{0,3}") {
            prop_assert_eq!(visible_indices(&catalog, &search), visible_indices(&catalog, &search));
        }
    }
}
