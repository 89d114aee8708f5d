//! 随机博客数据上的筛选、排序与分页性质测试

mod common;

use std::collections::{BTreeSet, HashMap};

use article_filter::{page_count, ArticleFilter, MemoryStore, PageWindow, SearchConfig, SearchRequest};
use chrono::{Duration, NaiveDate};
use common::{article, Dataset};
use proptest::prelude::*;
use utils_common::{ArticleId, TagId};

const VOCABULARY: &[&str] = &[
    "espresso", "grinder", "latte", "roasting", "brewing", "kettle", "crème", "café", "filter", "beans",
];

const PAGE_SIZE: u32 = 3;

#[derive(Debug, Clone)]
struct GeneratedArticle {
    title: String,
    day: i64,
    category: Option<i64>,
    tags: BTreeSet<TagId>,
}

fn article_strategy() -> impl Strategy<Value = GeneratedArticle> {
    (
        prop::collection::vec(prop::sample::select(VOCABULARY), 1..4),
        0i64..40,
        prop::option::of(1i64..=3),
        prop::collection::btree_set(1i64..=5, 0..4),
    )
        .prop_map(|(words, day, category, tags)| GeneratedArticle {
            title: words.join(" "),
            day,
            category,
            tags,
        })
}

fn blog_strategy() -> impl Strategy<Value = Vec<GeneratedArticle>> {
    prop::collection::vec(article_strategy(), 0..25)
}

fn request_strategy() -> impl Strategy<Value = SearchRequest> {
    (
        prop::option::of(prop::sample::select(VOCABULARY)),
        prop::option::of(1i64..=3),
        prop::collection::btree_set(1i64..=5, 0..3),
    )
        .prop_map(|(term, category, tags)| SearchRequest {
            term: term.unwrap_or_default().to_string(),
            category,
            tags,
            page: 1,
        })
}

fn build(articles: &[GeneratedArticle]) -> (MemoryStore, HashMap<ArticleId, BTreeSet<TagId>>) {
    let epoch = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut dataset = Dataset::new();
    let mut tags = HashMap::new();

    for (i, generated) in articles.iter().enumerate() {
        let id = i as ArticleId + 1;
        let date = (epoch + Duration::days(generated.day)).to_string();
        let mut article = article(id, &generated.title, &date);
        article.category_id = generated.category;
        let tag_ids: Vec<TagId> = generated.tags.iter().copied().collect();
        dataset = dataset.with(article, &tag_ids);
        tags.insert(id, generated.tags.clone());
    }

    (dataset.store(), tags)
}

fn filter(store: MemoryStore) -> ArticleFilter<MemoryStore> {
    let config = SearchConfig {
        page_size: PAGE_SIZE,
        ..SearchConfig::default()
    };
    ArticleFilter::new(store, config).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn empty_request_counts_every_article(articles in blog_strategy()) {
        let (store, _) = build(&articles);
        let filter = filter(store);

        let page = filter.search(&SearchRequest::new("")).unwrap();
        prop_assert_eq!(page.total_matching_rows, articles.len() as u64);
    }

    #[test]
    fn tag_match_count_is_the_exact_intersection(articles in blog_strategy(), request in request_strategy()) {
        let (store, tags) = build(&articles);
        let filter = filter(store);

        let all = filter.search_window(&request, PageWindow::new(0, usize::MAX)).unwrap();
        for result in &all.results {
            let expected = tags[&result.article.id].intersection(&request.tags).count() as u32;
            prop_assert_eq!(result.tag_match_count, expected);
            prop_assert!(result.tag_match_count as usize <= request.tags.len());
            if !request.tags.is_empty() {
                prop_assert!(result.tag_match_count >= 1);
            }
            if let Some(category) = request.category {
                prop_assert_eq!(result.article.category_id, Some(category));
            }
        }
    }

    #[test]
    fn results_are_in_descending_key_order(articles in blog_strategy(), request in request_strategy()) {
        let (store, _) = build(&articles);
        let filter = filter(store);

        let all = filter.search_window(&request, PageWindow::new(0, usize::MAX)).unwrap();
        prop_assert_eq!(all.results.len() as u64, all.total_matching_rows);

        for pair in all.results.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let key_a = (a.tag_match_count, a.text_rank, a.fuzzy_score, a.article.date, a.article.id);
            let key_b = (b.tag_match_count, b.text_rank, b.fuzzy_score, b.article.date, b.article.id);
            prop_assert!(key_a > key_b, "{:?} should precede {:?}", key_a, key_b);
        }
    }

    #[test]
    fn pages_concatenate_to_the_full_ordering(articles in blog_strategy(), request in request_strategy()) {
        let (store, _) = build(&articles);
        let filter = filter(store);

        let all = filter.search_window(&request, PageWindow::new(0, usize::MAX)).unwrap();
        let pages = page_count(all.total_matching_rows, PAGE_SIZE);

        let mut concatenated = Vec::new();
        for page in 1..=pages {
            let result = filter.search(&request.clone().with_page(page as i64)).unwrap();
            prop_assert_eq!(result.total_matching_rows, all.total_matching_rows);
            prop_assert!(result.results.len() <= PAGE_SIZE as usize);
            prop_assert!(result.results.iter().all(|r| r.total_matching_rows == all.total_matching_rows));
            concatenated.extend(result.results.into_iter().map(|r| r.article.id));
        }

        let expected: Vec<ArticleId> = all.results.iter().map(|r| r.article.id).collect();
        prop_assert_eq!(concatenated, expected);
    }

    #[test]
    fn non_positive_pages_behave_like_the_first(articles in blog_strategy(), page in -5i64..=0) {
        let (store, _) = build(&articles);
        let filter = filter(store);

        let first = filter.search(&SearchRequest::new("").with_page(1)).unwrap();
        let corrected = filter.search(&SearchRequest::new("").with_page(page)).unwrap();
        prop_assert_eq!(first, corrected);
    }
}
