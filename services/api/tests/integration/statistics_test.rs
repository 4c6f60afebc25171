use bookstore_api::domain::types::{BookRecord, User};
use bookstore_api::usecase::book::CreateBookInput;
use bookstore_api::usecase::review::{BookRef, CreateReviewInput, CreateReviewUseCase};
use bookstore_api::usecase::statistics::GetStatisticsUseCase;
use bookstore_domain::book::{BookStatus, Language};

use crate::helpers::{
    MemoryStore, actor_for, author, book_input, category, create_book, register, shelve,
};

fn statistics(
    store: &MemoryStore,
) -> GetStatisticsUseCase<crate::helpers::MemStatistics, crate::helpers::MemBooks> {
    GetStatisticsUseCase {
        stats: store.statistics(),
        books: store.books(),
    }
}

async fn rate(store: &MemoryStore, user: &User, book: &BookRecord, rating: i16) {
    CreateReviewUseCase {
        reviews: store.reviews(),
        books: store.books(),
    }
    .execute(
        &actor_for(user),
        CreateReviewInput {
            book: BookRef::Id(book.book.id),
            rating,
            comment: String::new(),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn should_report_zeroes_for_empty_catalog() {
    let store = MemoryStore::new();
    let stats = statistics(&store).execute().await.unwrap();

    assert_eq!(stats.total_books, 0);
    assert_eq!(stats.available_books, 0);
    assert_eq!(stats.total_authors, 0);
    assert_eq!(stats.total_categories, 0);
    assert!(stats.per_category.is_empty());
    assert!(stats.per_language.is_empty());
    assert!(stats.top_rated.is_empty());
}

#[tokio::test]
async fn should_count_books_by_category_and_language() {
    let store = MemoryStore::new();
    let writer = author(&store, "Nguyễn Du").await;
    let poetry = category(&store, "Thơ").await;
    let history = category(&store, "Lịch sử").await;
    category(&store, "Ẩm thực").await;

    for (title, isbn, cat, language, status, stock) in [
        ("Truyện Kiều", "9786046000001", &poetry, Language::Vi, BookStatus::Available, 2),
        ("The Tale of Kieu", "9786046000002", &poetry, Language::En, BookStatus::Available, 0),
        ("Việt Nam sử lược", "9786046000003", &history, Language::Vi, BookStatus::Borrowed, 4),
        ("Kim Vân Kiều", "9786046000004", &poetry, Language::Zh, BookStatus::Available, 1),
    ] {
        create_book(
            &store,
            CreateBookInput {
                language: Some(language),
                status: Some(status),
                stock_quantity: Some(stock),
                ..book_input(title, isbn, &writer, cat)
            },
        )
        .await;
    }

    let stats = statistics(&store).execute().await.unwrap();

    assert_eq!(stats.total_books, 4);
    assert_eq!(stats.available_books, 2);
    assert_eq!(stats.total_authors, 1);
    assert_eq!(stats.total_categories, 3);

    let categories: Vec<(&str, u64)> = stats
        .per_category
        .iter()
        .map(|c| (c.name.as_str(), c.book_count))
        .collect();
    assert_eq!(categories, vec![("Lịch sử", 1), ("Thơ", 3), ("Ẩm thực", 0)]);

    let languages: Vec<(Language, u64)> = stats
        .per_language
        .iter()
        .map(|l| (l.language, l.count))
        .collect();
    assert_eq!(
        languages,
        vec![(Language::Vi, 2), (Language::En, 1), (Language::Zh, 1)]
    );
}

#[tokio::test]
async fn should_rank_top_five_by_exact_average_then_id() {
    let store = MemoryStore::new();
    let mut books = Vec::new();
    for n in 0..7 {
        books.push(
            shelve(
                &store,
                &format!("Book {n}"),
                &format!("978604700{n:04}"),
                50_000,
                Language::Vi,
                BookStatus::Available,
                1,
            )
            .await,
        );
    }
    let readers = [
        register(&store, "r1").await,
        register(&store, "r2").await,
        register(&store, "r3").await,
    ];

    // Averages: book 0 10/3, book 1 11/3, book 2 5, book 3 2, book 4 9/2, book 5 1.
    rate(&store, &readers[0], &books[0], 4).await;
    rate(&store, &readers[1], &books[0], 3).await;
    rate(&store, &readers[2], &books[0], 3).await;
    rate(&store, &readers[0], &books[1], 5).await;
    rate(&store, &readers[1], &books[1], 5).await;
    rate(&store, &readers[2], &books[1], 1).await;
    rate(&store, &readers[0], &books[2], 5).await;
    rate(&store, &readers[0], &books[3], 2).await;
    rate(&store, &readers[0], &books[4], 4).await;
    rate(&store, &readers[1], &books[4], 5).await;
    rate(&store, &readers[0], &books[5], 1).await;

    let stats = statistics(&store).execute().await.unwrap();
    let top: Vec<&str> = stats
        .top_rated
        .iter()
        .map(|r| r.book.title.as_str())
        .collect();

    assert_eq!(top, vec!["Book 2", "Book 4", "Book 1", "Book 0", "Book 3"]);
    assert!(stats.top_rated.iter().all(|r| r.rating.has_reviews()));
}

#[tokio::test]
async fn should_break_equal_averages_by_book_id() {
    let store = MemoryStore::new();
    let first = shelve(&store, "First", "9786048000001", 50_000, Language::Vi, BookStatus::Available, 1).await;
    let second = shelve(&store, "Second", "9786048000002", 50_000, Language::Vi, BookStatus::Available, 1).await;
    let a = register(&store, "reader-a").await;
    let b = register(&store, "reader-b").await;

    // 8/2 and 4/1 are the same average.
    rate(&store, &a, &second, 4).await;
    rate(&store, &b, &second, 4).await;
    rate(&store, &a, &first, 4).await;

    let stats = statistics(&store).execute().await.unwrap();
    let ids: Vec<i32> = stats.top_rated.iter().map(|r| r.book.id).collect();
    assert_eq!(ids, vec![first.book.id, second.book.id]);
}

#[tokio::test]
async fn should_reflect_new_books_immediately() {
    let store = MemoryStore::new();
    shelve(&store, "One", "9786049000001", 50_000, Language::Vi, BookStatus::Available, 1).await;
    assert_eq!(statistics(&store).execute().await.unwrap().total_books, 1);

    shelve(&store, "Two", "9786049000002", 50_000, Language::Vi, BookStatus::Available, 1).await;
    assert_eq!(statistics(&store).execute().await.unwrap().total_books, 2);
}
