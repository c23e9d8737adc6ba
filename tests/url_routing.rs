use pagelink::config::DocumentConfig;
use pagelink::registry::{DocumentRegistry, Route, page_path};
use pagelink::url::{HistoryMode, Location, MemoryHistory, UrlSynchronizer};
use proptest::prelude::*;

fn registry() -> DocumentRegistry {
    DocumentRegistry::from_config(&[DocumentConfig {
        name: "manual".to_string(),
        location: "/docs/manual.pdf".into(),
        title: Some("User Manual".to_string()),
    }])
    .expect("registry should build")
}

#[test]
fn unknown_document_redirects_home() {
    assert_eq!(
        registry().resolve_route("/missing/4"),
        Route::Redirect {
            to: "/".to_string()
        }
    );
}

#[test]
fn malformed_page_falls_back_to_first_page() {
    for path in ["/manual/abc", "/manual/0", "/manual/-3"] {
        assert_eq!(
            registry().resolve_route(path),
            Route::Viewer {
                name: "manual".to_string(),
                initial_page: 1
            },
            "{path}"
        );
    }
}

proptest! {
    #[test]
    fn written_page_reads_back(page in 1_usize..100_000, query in proptest::option::of("[a-z]{1,6}=[a-z0-9]{1,6}")) {
        let raw = match &query {
            Some(query) => format!("/manual?{query}"),
            None => "/manual".to_string(),
        };
        let history = MemoryHistory::new(Location::parse(&raw).expect("valid url"));
        let mut url = UrlSynchronizer::new("manual", history);

        url.write_page(page, HistoryMode::Push);
        prop_assert_eq!(url.read_page(), page);
        prop_assert_eq!(url.location().query.clone(), query);
        prop_assert_eq!(&url.location().path, &page_path("manual", page));
    }

    #[test]
    fn routes_built_from_pages_resolve_to_them(page in 1_usize..100_000) {
        prop_assert_eq!(
            registry().resolve_route(&page_path("manual", page)),
            Route::Viewer { name: "manual".to_string(), initial_page: page }
        );
    }
}
