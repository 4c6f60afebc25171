use chrono::NaiveDate;

use bookstore_api::domain::query::ListParams;
use bookstore_api::domain::types::BookChanges;
use bookstore_api::error::ServiceError;
use bookstore_api::usecase::book::{
    AvailableBooksUseCase, BestSellersUseCase, CategoryBooksUseCase, CreateBookInput,
    CreateBookUseCase, DeleteBookUseCase, NewReleasesUseCase, SetBookCoverUseCase,
    UpdateBookUseCase,
};
use bookstore_api::usecase::category::{DeleteCategoryUseCase, ListCategoriesUseCase};
use bookstore_api::usecase::review::{BookRef, CreateReviewInput, CreateReviewUseCase};
use bookstore_domain::actor::Actor;
use bookstore_domain::book::{BookStatus, Language};
use bookstore_domain::pagination::PageRequest;

use crate::helpers::{
    MemoryBlobs, MemoryStore, PNG, actor_for, author, book_input, category, create_book, register,
    shelve, staff,
};

fn create_usecase(
    store: &MemoryStore,
) -> CreateBookUseCase<
    crate::helpers::MemBooks,
    crate::helpers::MemAuthors,
    crate::helpers::MemCategories,
> {
    CreateBookUseCase {
        books: store.books(),
        authors: store.authors(),
        categories: store.categories(),
    }
}

// ── CreateBook ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_thirteen_digit_isbn() {
    let store = MemoryStore::new();
    let author = author(&store, "Robert C. Martin").await;
    let category = category(&store, "Lập trình").await;
    let usecase = create_usecase(&store);

    let short = usecase
        .execute(&staff(), book_input("Clean Code", "12345", &author, &category))
        .await;
    assert!(matches!(short, Err(ServiceError::Validation(_))), "got {short:?}");

    let record = usecase
        .execute(
            &staff(),
            book_input("Clean Code", "1234567890123", &author, &category),
        )
        .await
        .unwrap();
    assert_eq!(record.book.isbn, "1234567890123");
    assert_eq!(record.author.name, "Robert C. Martin");
    assert_eq!(record.category.name, "Lập trình");
}

#[tokio::test]
async fn should_apply_book_defaults() {
    let store = MemoryStore::new();
    let author = author(&store, "Nguyễn Nhật Ánh").await;
    let category = category(&store, "Văn học").await;

    let record = create_book(
        &store,
        CreateBookInput {
            pages: None,
            ..book_input("Mắt biếc", "9786041000001", &author, &category)
        },
    )
    .await;

    assert_eq!(record.book.slug, "mat-biec");
    assert_eq!(record.book.language, Language::Vi);
    assert_eq!(record.book.status, BookStatus::Available);
    assert_eq!(record.book.stock_quantity, 1);
    assert_eq!(record.book.pages, 0);
    assert!(!record.rating.has_reviews());
}

#[tokio::test]
async fn should_reject_duplicate_isbn() {
    let store = MemoryStore::new();
    let author = author(&store, "Paulo Coelho").await;
    let category = category(&store, "Tiểu thuyết").await;
    create_book(
        &store,
        book_input("Nhà giả kim", "9786041000002", &author, &category),
    )
    .await;

    let result = create_usecase(&store)
        .execute(
            &staff(),
            book_input("The Alchemist", "9786041000002", &author, &category),
        )
        .await;

    assert!(matches!(result, Err(ServiceError::Duplicate(_))), "got {result:?}");
}

#[tokio::test]
async fn should_reject_unknown_author_reference() {
    let store = MemoryStore::new();
    let author = author(&store, "Paulo Coelho").await;
    let category = category(&store, "Tiểu thuyết").await;

    let result = create_usecase(&store)
        .execute(
            &staff(),
            CreateBookInput {
                author_id: author.id + 100,
                ..book_input("Nhà giả kim", "9786041000003", &author, &category)
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))), "got {result:?}");
}

#[tokio::test]
async fn should_reject_anonymous_book_creation() {
    let store = MemoryStore::new();
    let author = author(&store, "Paulo Coelho").await;
    let category = category(&store, "Tiểu thuyết").await;

    let result = create_usecase(&store)
        .execute(
            &Actor::Anonymous,
            book_input("Nhà giả kim", "9786041000004", &author, &category),
        )
        .await;

    assert!(matches!(result, Err(ServiceError::AuthenticationRequired)));
    assert!(store.tables().books.is_empty());
}

// ── UpdateBook ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_slug_when_title_changes() {
    let store = MemoryStore::new();
    let record = shelve(
        &store,
        "Cho tôi xin một vé đi tuổi thơ",
        "9786041000005",
        85_000,
        Language::Vi,
        BookStatus::Available,
        4,
    )
    .await;
    let before = record.book.updated_at;

    let updated = UpdateBookUseCase {
        books: store.books(),
        authors: store.authors(),
        categories: store.categories(),
    }
    .execute(
        &staff(),
        &record.book.slug,
        BookChanges {
            title: Some("  Vé đi tuổi thơ  ".into()),
            price: Some(rust_decimal::Decimal::new(95_000, 0)),
            ..BookChanges::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.book.title, "Vé đi tuổi thơ");
    assert_eq!(updated.book.slug, record.book.slug);
    assert_eq!(updated.book.price, rust_decimal::Decimal::new(95_000, 0));
    assert!(updated.book.updated_at >= before);
}

#[tokio::test]
async fn should_reject_negative_stock_on_update() {
    let store = MemoryStore::new();
    let record = shelve(
        &store,
        "Tắt đèn",
        "9786041000006",
        60_000,
        Language::Vi,
        BookStatus::Available,
        2,
    )
    .await;

    let result = UpdateBookUseCase {
        books: store.books(),
        authors: store.authors(),
        categories: store.categories(),
    }
    .execute(
        &staff(),
        &record.book.slug,
        BookChanges {
            stock_quantity: Some(-1),
            ..BookChanges::default()
        },
    )
    .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
    assert_eq!(store.tables().books[0].stock_quantity, 2);
}

// ── Cover ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_store_cover_through_blob_store() {
    let store = MemoryStore::new();
    let record = shelve(
        &store,
        "Số đỏ",
        "9786041000007",
        70_000,
        Language::Vi,
        BookStatus::Available,
        2,
    )
    .await;
    let blobs = MemoryBlobs::default();

    let updated = SetBookCoverUseCase {
        repo: store.books(),
        blobs: blobs.clone(),
    }
    .execute(&staff(), &record.book.slug, bytes::Bytes::from_static(PNG))
    .await
    .unwrap();

    assert_eq!(updated.book.cover_image.as_deref(), Some("blob-1.png"));
    assert_eq!(blobs.stored.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_non_image_cover() {
    let store = MemoryStore::new();
    let record = shelve(
        &store,
        "Số đỏ",
        "9786041000008",
        70_000,
        Language::Vi,
        BookStatus::Available,
        2,
    )
    .await;
    let blobs = MemoryBlobs::default();

    let result = SetBookCoverUseCase {
        repo: store.books(),
        blobs: blobs.clone(),
    }
    .execute(
        &staff(),
        &record.book.slug,
        bytes::Bytes::from_static(b"plain text"),
    )
    .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
    assert!(blobs.stored.lock().unwrap().is_empty());
}

// ── Cascades ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_cascade_category_delete_to_books_and_reviews() {
    let store = MemoryStore::new();
    let record = shelve(
        &store,
        "Dế Mèn phiêu lưu ký",
        "9786041000009",
        50_000,
        Language::Vi,
        BookStatus::Available,
        3,
    )
    .await;
    let reader = register(&store, "reader").await;
    CreateReviewUseCase {
        reviews: store.reviews(),
        books: store.books(),
    }
    .execute(
        &actor_for(&reader),
        CreateReviewInput {
            book: BookRef::Id(record.book.id),
            rating: 5,
            comment: "tuyệt vời".into(),
        },
    )
    .await
    .unwrap();

    DeleteCategoryUseCase {
        repo: store.categories(),
    }
    .execute(&staff(), &record.category.slug)
    .await
    .unwrap();

    let tables = store.tables();
    assert!(tables.categories.is_empty());
    assert!(tables.books.is_empty());
    assert!(tables.reviews.is_empty());
    assert_eq!(tables.users.len(), 1);
}

#[tokio::test]
async fn should_report_missing_book_on_delete() {
    let store = MemoryStore::new();
    let result = DeleteBookUseCase {
        repo: store.books(),
    }
    .execute(&staff(), "no-such-book")
    .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

// ── Listings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_count_books_per_category_and_filter_by_search() {
    let store = MemoryStore::new();
    let author = author(&store, "Tô Hoài").await;
    let literature = category(&store, "Văn học").await;
    category(&store, "Khoa học").await;
    create_book(
        &store,
        book_input("Dế Mèn", "9786041000010", &author, &literature),
    )
    .await;
    create_book(
        &store,
        book_input("Vợ chồng A Phủ", "9786041000011", &author, &literature),
    )
    .await;

    let usecase = ListCategoriesUseCase {
        repo: store.categories(),
    };
    let all = usecase.execute(&ListParams::default()).await.unwrap();
    let counts: Vec<(&str, u64)> = all
        .iter()
        .map(|r| (r.category.name.as_str(), r.books_count))
        .collect();
    assert_eq!(counts, vec![("Khoa học", 0), ("Văn học", 2)]);

    let searched = usecase
        .execute(&ListParams {
            search: Some("VĂN".into()),
            ..ListParams::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].category.name, "Văn học");
}

#[tokio::test]
async fn should_page_category_books_with_total() {
    let store = MemoryStore::new();
    let author = author(&store, "Nam Cao").await;
    let category = category(&store, "Truyện ngắn").await;
    for n in 0..5 {
        create_book(
            &store,
            book_input(
                &format!("Tập {n}"),
                &format!("978604100{n:04}"),
                &author,
                &category,
            ),
        )
        .await;
    }

    let page = CategoryBooksUseCase {
        categories: store.categories(),
        books: store.books(),
    }
    .execute(&category.slug, Some(PageRequest::new(3, 2)))
    .await
    .unwrap();

    assert_eq!(page.books.len(), 1);
    assert_eq!(page.total, Some(5));
}

#[tokio::test]
async fn should_list_only_available_books_in_stock() {
    let store = MemoryStore::new();
    shelve(&store, "A", "9786041000020", 10_000, Language::Vi, BookStatus::Available, 2).await;
    shelve(&store, "B", "9786041000021", 10_000, Language::Vi, BookStatus::Available, 0).await;
    shelve(&store, "C", "9786041000022", 10_000, Language::Vi, BookStatus::Borrowed, 5).await;

    let page = AvailableBooksUseCase {
        repo: store.books(),
    }
    .execute(None)
    .await
    .unwrap();

    let titles: Vec<&str> = page.books.iter().map(|r| r.book.title.as_str()).collect();
    assert_eq!(titles, vec!["A"]);
    assert_eq!(page.total, None);
}

#[tokio::test]
async fn should_rank_best_sellers_by_lowest_stock() {
    let store = MemoryStore::new();
    for (n, stock) in [7, 1, 4, 0, 9, 3, 2, 8, 6, 5, 10, 11].into_iter().enumerate() {
        shelve(
            &store,
            &format!("Book {n}"),
            &format!("978604200{n:04}"),
            10_000,
            Language::En,
            BookStatus::Available,
            stock,
        )
        .await;
    }
    shelve(&store, "Borrowed", "9786043000000", 10_000, Language::En, BookStatus::Borrowed, 0)
        .await;

    let books = BestSellersUseCase {
        repo: store.books(),
    }
    .execute()
    .await
    .unwrap();

    let stocks: Vec<i32> = books.iter().map(|r| r.book.stock_quantity).collect();
    assert_eq!(stocks, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    assert!(books.iter().all(|r| r.book.status == BookStatus::Available));
}

#[tokio::test]
async fn should_list_new_releases_within_thirty_days() {
    let store = MemoryStore::new();
    let author = author(&store, "Haruki Murakami").await;
    let category = category(&store, "Tiểu thuyết").await;
    let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    for (title, isbn, date) in [
        ("Today", "9786044000001", today),
        ("Boundary", "9786044000002", NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()),
        ("Too old", "9786044000003", NaiveDate::from_ymd_opt(2024, 5, 30).unwrap()),
    ] {
        create_book(
            &store,
            CreateBookInput {
                publication_date: date,
                ..book_input(title, isbn, &author, &category)
            },
        )
        .await;
    }

    let books = NewReleasesUseCase {
        repo: store.books(),
    }
    .execute(today)
    .await
    .unwrap();

    let titles: Vec<&str> = books.iter().map(|r| r.book.title.as_str()).collect();
    assert_eq!(titles, vec!["Today", "Boundary"]);
}
