use rust_decimal::Decimal;

use bookstore_api::domain::query::{SortKey, parse_ordering};
use bookstore_api::error::ServiceError;
use bookstore_api::usecase::book::{BookFilters, ListBooksUseCase};
use bookstore_api::usecase::review::{BookRef, CreateReviewInput, CreateReviewUseCase};
use bookstore_api::usecase::search::{SearchBooksUseCase, SearchInput};
use bookstore_domain::book::{BookStatus, Language};
use bookstore_domain::pagination::PageRequest;

use crate::helpers::{MemoryStore, actor_for, author, book_input, category, create_book, register, shelve};

fn titles(records: &[bookstore_api::domain::types::BookRecord]) -> Vec<&str> {
    records.iter().map(|r| r.book.title.as_str()).collect()
}

async fn catalog() -> MemoryStore {
    let store = MemoryStore::new();
    let martin = author(&store, "Robert C. Martin").await;
    let anh = author(&store, "Nguyễn Nhật Ánh").await;
    let programming = category(&store, "Lập trình").await;
    let novels = category(&store, "Tiểu thuyết").await;

    for (title, isbn, price, language, author, category) in [
        ("Clean Code", "9780132350884", 350_000, Language::En, &martin, &programming),
        ("The Clean Coder", "9780137081073", 250_000, Language::En, &martin, &programming),
        ("Mắt biếc", "9786041000101", 90_000, Language::Vi, &anh, &novels),
        ("Tôi thấy hoa vàng trên cỏ xanh", "9786041000102", 120_000, Language::Vi, &anh, &novels),
    ] {
        create_book(
            &store,
            bookstore_api::usecase::book::CreateBookInput {
                price: Decimal::new(price, 0),
                language: Some(language),
                ..book_input(title, isbn, author, category)
            },
        )
        .await;
    }
    store
}

fn search(store: &MemoryStore) -> SearchBooksUseCase<crate::helpers::MemBooks> {
    SearchBooksUseCase {
        repo: store.books(),
    }
}

#[tokio::test]
async fn should_match_text_across_title_author_and_category() {
    let store = catalog().await;

    let by_title = search(&store)
        .execute(SearchInput {
            q: Some("clean".into()),
            ordering: parse_ordering("title"),
            ..SearchInput::default()
        })
        .await
        .unwrap();
    assert_eq!(titles(&by_title), vec!["Clean Code", "The Clean Coder"]);

    let by_author = search(&store)
        .execute(SearchInput {
            q: Some("nhật ánh".into()),
            ordering: parse_ordering("price"),
            ..SearchInput::default()
        })
        .await
        .unwrap();
    assert_eq!(titles(&by_author), vec!["Mắt biếc", "Tôi thấy hoa vàng trên cỏ xanh"]);

    let by_category = search(&store)
        .execute(SearchInput {
            q: Some("LẬP TRÌNH".into()),
            ..SearchInput::default()
        })
        .await
        .unwrap();
    assert_eq!(by_category.len(), 2);

    let by_isbn = search(&store)
        .execute(SearchInput {
            q: Some("0132350884".into()),
            ..SearchInput::default()
        })
        .await
        .unwrap();
    assert_eq!(titles(&by_isbn), vec!["Clean Code"]);
}

#[tokio::test]
async fn should_combine_price_range_and_language() {
    let store = catalog().await;

    let results = search(&store)
        .execute(SearchInput {
            min_price: Some(Decimal::new(100_000, 0)),
            max_price: Some(Decimal::new(300_000, 0)),
            ordering: vec![SortKey::desc("price")],
            ..SearchInput::default()
        })
        .await
        .unwrap();
    assert_eq!(
        titles(&results),
        vec!["The Clean Coder", "Tôi thấy hoa vàng trên cỏ xanh"]
    );

    let vietnamese = search(&store)
        .execute(SearchInput {
            min_price: Some(Decimal::new(100_000, 0)),
            language: Some(Language::Vi),
            ..SearchInput::default()
        })
        .await
        .unwrap();
    assert_eq!(titles(&vietnamese), vec!["Tôi thấy hoa vàng trên cỏ xanh"]);
}

#[tokio::test]
async fn should_return_nothing_for_inverted_price_bounds() {
    let store = catalog().await;
    let results = search(&store)
        .execute(SearchInput {
            min_price: Some(Decimal::new(300_000, 0)),
            max_price: Some(Decimal::new(100_000, 0)),
            ..SearchInput::default()
        })
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn should_reject_unknown_ordering_field() {
    let store = catalog().await;
    let result = search(&store)
        .execute(SearchInput {
            ordering: parse_ordering("isbn"),
            ..SearchInput::default()
        })
        .await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn should_order_by_average_rating_with_reviewless_books_as_zero() {
    let store = catalog().await;
    let reader = register(&store, "reader").await;
    let critic = register(&store, "critic").await;
    let books = store.tables().books.clone();
    let reviews = CreateReviewUseCase {
        reviews: store.reviews(),
        books: store.books(),
    };
    for (user, title, rating) in [
        (&reader, "Mắt biếc", 5),
        (&critic, "Mắt biếc", 4),
        (&reader, "Clean Code", 3),
    ] {
        let book = books.iter().find(|b| b.title == title).unwrap();
        reviews
            .execute(
                &actor_for(user),
                CreateReviewInput {
                    book: BookRef::Id(book.id),
                    rating,
                    comment: String::new(),
                },
            )
            .await
            .unwrap();
    }

    let results = search(&store)
        .execute(SearchInput {
            ordering: parse_ordering("-average_rating,title"),
            ..SearchInput::default()
        })
        .await
        .unwrap();

    assert_eq!(
        titles(&results),
        vec![
            "Mắt biếc",
            "Clean Code",
            "The Clean Coder",
            "Tôi thấy hoa vàng trên cỏ xanh"
        ]
    );
    assert_eq!(results[0].rating.average(), 4.5);
}

#[tokio::test]
async fn should_page_book_list_and_report_total() {
    let store = catalog().await;
    let page = ListBooksUseCase {
        repo: store.books(),
    }
    .execute(BookFilters {
        ordering: parse_ordering("price"),
        page: Some(PageRequest::new(1, 3)),
        ..BookFilters::default()
    })
    .await
    .unwrap();

    assert_eq!(
        titles(&page.books),
        vec!["Mắt biếc", "Tôi thấy hoa vàng trên cỏ xanh", "The Clean Coder"]
    );
    assert_eq!(page.total, Some(4));
}

#[tokio::test]
async fn should_filter_book_list_by_status_and_publisher() {
    let store = MemoryStore::new();
    shelve(&store, "On shelf", "9786045000001", 50_000, Language::Vi, BookStatus::Available, 1).await;
    shelve(&store, "Fixing", "9786045000002", 50_000, Language::Vi, BookStatus::Maintenance, 1).await;

    let page = ListBooksUseCase {
        repo: store.books(),
    }
    .execute(BookFilters {
        status: Some(BookStatus::Maintenance),
        publisher: Some("NXB Trẻ".into()),
        ..BookFilters::default()
    })
    .await
    .unwrap();
    assert_eq!(titles(&page.books), vec!["Fixing"]);

    let other_publisher = ListBooksUseCase {
        repo: store.books(),
    }
    .execute(BookFilters {
        publisher: Some("Kim Đồng".into()),
        ..BookFilters::default()
    })
    .await
    .unwrap();
    assert!(other_publisher.books.is_empty());
}
