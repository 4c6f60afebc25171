//! Sample catalog, accounts and reviews for local development.

use std::fmt;

use anyhow::Context as _;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use bookstore_api::domain::repository::{
    AuthorRepository, BookRepository, CategoryRepository, CredentialPort, ReviewRepository,
    UserRepository,
};
use bookstore_api::domain::slug::slugify;
use bookstore_api::domain::types::{NewAuthor, NewBook, NewCategory, NewReview, NewUser};
use bookstore_api::infra::credentials::Argon2Credentials;
use bookstore_api::infra::db::author::DbAuthorRepository;
use bookstore_api::infra::db::book::DbBookRepository;
use bookstore_api::infra::db::category::DbCategoryRepository;
use bookstore_api::infra::db::review::DbReviewRepository;
use bookstore_api::infra::db::user::DbUserRepository;
use bookstore_domain::book::{BookStatus, Language};
use bookstore_domain::user::UserRole;

// ── Data ─────────────────────────────────────────────────────────────────────

const CATEGORIES: [(&str, &str); 5] = [
    ("Tiểu thuyết", "Các tác phẩm tiểu thuyết văn học"),
    ("Khoa học", "Sách về khoa học và công nghệ"),
    ("Kinh doanh", "Sách về kinh doanh và quản lý"),
    ("Lập trình", "Sách về lập trình và công nghệ thông tin"),
    ("Tâm lý học", "Sách về tâm lý học và phát triển bản thân"),
];

const AUTHORS: [(&str, &str, &str); 5] = [
    (
        "Nguyễn Nhật Ánh",
        "Nhà văn nổi tiếng Việt Nam với nhiều tác phẩm văn học được yêu thích",
        "nguyennhatanh@example.com",
    ),
    (
        "Dale Carnegie",
        "Tác giả nổi tiếng với các sách về kỹ năng giao tiếp và phát triển bản thân",
        "dalecarnegie@example.com",
    ),
    (
        "Robert C. Martin",
        "Tác giả nổi tiếng về lập trình và kiến trúc phần mềm",
        "robertmartin@example.com",
    ),
    (
        "Stephen Hawking",
        "Nhà vật lý lý thuyết nổi tiếng với các nghiên cứu về vũ trụ học",
        "stephenhawking@example.com",
    ),
    (
        "Paulo Coelho",
        "Nhà văn Brazil nổi tiếng với tác phẩm \"Nhà giả kim\"",
        "paulocoelho@example.com",
    ),
];

struct SampleBook {
    title: &'static str,
    /// Index into [`AUTHORS`].
    author: usize,
    /// Index into [`CATEGORIES`].
    category: usize,
    description: &'static str,
    isbn: &'static str,
    year: i32,
    publisher: &'static str,
    language: Language,
    pages: i32,
    price: i64,
    stock_quantity: i32,
}

const BOOKS: [SampleBook; 6] = [
    SampleBook {
        title: "Tôi Thấy Hoa Vàng Trên Cỏ Xanh",
        author: 0,
        category: 0,
        description: "Một tác phẩm văn học đặc sắc về tuổi thơ và tình bạn",
        isbn: "9786043234567",
        year: 2010,
        publisher: "NXB Trẻ",
        language: Language::Vi,
        pages: 400,
        price: 120_000,
        stock_quantity: 50,
    },
    SampleBook {
        title: "Đắc Nhân Tâm",
        author: 1,
        category: 4,
        description: "Nghệ thuật đắc nhân tâm - cách ứng xử và giao tiếp hiệu quả",
        isbn: "9786043234568",
        year: 1936,
        publisher: "NXB Tổng hợp",
        language: Language::Vi,
        pages: 320,
        price: 89_000,
        stock_quantity: 30,
    },
    SampleBook {
        title: "Clean Code",
        author: 2,
        category: 3,
        description: "Hướng dẫn viết code sạch và dễ bảo trì",
        isbn: "9786043234569",
        year: 2008,
        publisher: "Prentice Hall",
        language: Language::En,
        pages: 464,
        price: 250_000,
        stock_quantity: 25,
    },
    SampleBook {
        title: "A Brief History of Time",
        author: 3,
        category: 1,
        description: "Lược sử thời gian - khám phá vũ trụ và thuyết tương đối",
        isbn: "9786043234570",
        year: 1988,
        publisher: "Bantam Books",
        language: Language::En,
        pages: 256,
        price: 180_000,
        stock_quantity: 20,
    },
    SampleBook {
        title: "Nhà Giả Kim",
        author: 4,
        category: 0,
        description: "Câu chuyện về hành trình tìm kiếm kho báu và ý nghĩa cuộc sống",
        isbn: "9786043234571",
        year: 1988,
        publisher: "NXB Văn học",
        language: Language::Vi,
        pages: 208,
        price: 75_000,
        stock_quantity: 40,
    },
    SampleBook {
        title: "The Lean Startup",
        author: 2,
        category: 2,
        description: "Phương pháp khởi nghiệp tinh gọn và hiệu quả",
        isbn: "9786043234572",
        year: 2011,
        publisher: "Crown Business",
        language: Language::En,
        pages: 336,
        price: 200_000,
        stock_quantity: 15,
    },
];

/// (username, email, first name, last name)
const USERS: [(&str, &str, &str, &str); 2] = [
    ("user1", "user1@example.com", "Nguyễn", "Văn A"),
    ("user2", "user2@example.com", "Trần", "Thị B"),
];

const SAMPLE_PASSWORD: &str = "user123";

/// (book index, user index, rating, comment)
const REVIEWS: [(usize, usize, i16, &str); 5] = [
    (0, 0, 5, "Một tác phẩm tuyệt vời về tuổi thơ!"),
    (0, 1, 4, "Sách hay, đáng đọc!"),
    (1, 0, 5, "Sách rất hữu ích cho việc phát triển kỹ năng giao tiếp"),
    (2, 1, 5, "Một cuốn sách kinh điển về lập trình!"),
    (3, 0, 4, "Sách khoa học rất thú vị và dễ hiểu"),
];

// ── Report ───────────────────────────────────────────────────────────────────

/// Rows inserted by one seed run, per table.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub categories: usize,
    pub authors: usize,
    pub books: usize,
    pub users: usize,
    pub reviews: usize,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {} categories, {} authors, {} books, {} users, {} reviews",
            self.categories, self.authors, self.books, self.users, self.reviews
        )
    }
}

// ── Run ──────────────────────────────────────────────────────────────────────

fn slug_of(name: &str) -> anyhow::Result<String> {
    slugify(name).with_context(|| format!("no slug can be derived from {name:?}"))
}

/// Insert every sample row that is not already present.
pub async fn run(db: &DatabaseConnection) -> anyhow::Result<SeedReport> {
    let categories = DbCategoryRepository { db: db.clone() };
    let authors = DbAuthorRepository { db: db.clone() };
    let books = DbBookRepository { db: db.clone() };
    let users = DbUserRepository { db: db.clone() };
    let reviews = DbReviewRepository { db: db.clone() };
    let mut report = SeedReport::default();

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let slug = slug_of(name)?;
        let category = match categories.find_by_slug(&slug).await? {
            Some(existing) => existing,
            None => {
                let created = categories
                    .create(&NewCategory {
                        name: name.to_owned(),
                        description: description.to_owned(),
                        slug,
                    })
                    .await?;
                info!(category_id = created.id, name, "seeded category");
                report.categories += 1;
                created
            }
        };
        category_ids.push(category.id);
    }

    let mut author_ids = Vec::with_capacity(AUTHORS.len());
    for (name, bio, email) in AUTHORS {
        let slug = slug_of(name)?;
        let author = match authors.find_by_slug(&slug).await? {
            Some(existing) => existing,
            None => {
                let created = authors
                    .create(&NewAuthor {
                        name: name.to_owned(),
                        bio: bio.to_owned(),
                        email: email.to_owned(),
                        website: String::new(),
                        slug,
                    })
                    .await?;
                info!(author_id = created.id, name, "seeded author");
                report.authors += 1;
                created
            }
        };
        author_ids.push(author.id);
    }

    let mut book_ids = Vec::with_capacity(BOOKS.len());
    for sample in &BOOKS {
        let slug = slug_of(sample.title)?;
        let id = match books.find_by_slug(&slug).await? {
            Some(existing) => existing.book.id,
            None => {
                let publication_date = NaiveDate::from_ymd_opt(sample.year, 1, 1)
                    .context("sample publication year out of range")?;
                let created = books
                    .create(&NewBook {
                        title: sample.title.to_owned(),
                        slug,
                        author_id: author_ids[sample.author],
                        category_id: category_ids[sample.category],
                        description: sample.description.to_owned(),
                        isbn: sample.isbn.to_owned(),
                        publication_date,
                        publisher: sample.publisher.to_owned(),
                        language: sample.language,
                        pages: sample.pages,
                        price: Decimal::new(sample.price, 0),
                        status: BookStatus::Available,
                        stock_quantity: sample.stock_quantity,
                    })
                    .await?;
                info!(book_id = created.id, isbn = sample.isbn, "seeded book");
                report.books += 1;
                created.id
            }
        };
        book_ids.push(id);
    }

    let mut user_ids = Vec::with_capacity(USERS.len());
    for (username, email, first_name, last_name) in USERS {
        let id = match users.find_by_username(username).await? {
            Some(existing) => existing.id,
            None => {
                let created = users
                    .create(&NewUser {
                        id: Uuid::now_v7(),
                        username: username.to_owned(),
                        email: email.to_owned(),
                        credential: Argon2Credentials.hash_and_store(SAMPLE_PASSWORD)?,
                        first_name: first_name.to_owned(),
                        last_name: last_name.to_owned(),
                        phone_number: String::new(),
                        address: String::new(),
                        date_of_birth: None,
                        bio: String::new(),
                        role: UserRole::Customer,
                        is_verified: false,
                    })
                    .await?;
                info!(user_id = %created.id, username, "seeded user");
                report.users += 1;
                created.id
            }
        };
        user_ids.push(id);
    }

    for (book, user, rating, comment) in REVIEWS {
        let (book_id, user_id) = (book_ids[book], user_ids[user]);
        if reviews.find_by_book_and_user(book_id, user_id).await?.is_some() {
            continue;
        }
        let created = reviews
            .create(&NewReview {
                book_id,
                user_id,
                rating,
                comment: comment.to_owned(),
            })
            .await?;
        info!(review_id = created.id, book_id, user_id = %user_id, "seeded review");
        report.reviews += 1;
    }

    Ok(report)
}
