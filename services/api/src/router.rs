use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use bookstore_core::health::{database_ready, healthz};
use bookstore_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::MAX_IMAGE_BYTES;
use crate::handlers::{
    account::{
        change_password, create_user, delete_user, get_me, get_user, list_users, login, logout,
        profile_reviews, public_profile, register, set_avatar, update_profile, update_user,
    },
    author::{
        author_books, create_author, delete_author, get_author, list_authors, set_author_photo,
        update_author,
    },
    book::{
        available_books, best_sellers, create_book, delete_book, get_book, list_books,
        new_releases, set_book_cover, update_book,
    },
    category::{
        category_books, create_category, delete_category, get_category, list_categories,
        update_category,
    },
    review::{
        add_review, book_reviews, create_review, delete_review, get_review, list_reviews,
        update_review,
    },
    search::search_books,
    statistics::get_statistics,
};
use crate::state::AppState;

/// `GET /readyz`: ready once the database answers.
async fn readyz(State(state): State<AppState>) -> StatusCode {
    database_ready(&state.db).await
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/register/", post(register))
        .route("/auth/login/", post(login))
        .route("/auth/logout/", post(logout))
        // Categories
        .route("/categories/", get(list_categories).post(create_category))
        .route(
            "/categories/{slug}/",
            get(get_category)
                .put(update_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route("/categories/{slug}/books/", get(category_books))
        // Authors
        .route("/authors/", get(list_authors).post(create_author))
        .route(
            "/authors/{slug}/",
            get(get_author)
                .put(update_author)
                .patch(update_author)
                .delete(delete_author),
        )
        .route("/authors/{slug}/books/", get(author_books))
        .route(
            "/authors/{slug}/photo/",
            put(set_author_photo).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        // Books
        .route("/books/", get(list_books).post(create_book))
        .route("/books/available/", get(available_books))
        .route("/books/best_sellers/", get(best_sellers))
        .route("/books/new_releases/", get(new_releases))
        .route(
            "/books/{slug}/",
            get(get_book)
                .put(update_book)
                .patch(update_book)
                .delete(delete_book),
        )
        .route("/books/{slug}/reviews/", get(book_reviews))
        .route("/books/{slug}/add_review/", post(add_review))
        .route(
            "/books/{slug}/cover/",
            put(set_book_cover).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        // Reviews
        .route("/reviews/", get(list_reviews).post(create_review))
        .route(
            "/reviews/{id}/",
            get(get_review)
                .put(update_review)
                .patch(update_review)
                .delete(delete_review),
        )
        // Users
        .route("/users/", get(list_users).post(create_user))
        .route("/users/me/", get(get_me))
        .route(
            "/users/update_profile/",
            put(update_profile).patch(update_profile),
        )
        .route(
            "/users/update_profile/avatar/",
            put(set_avatar).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route("/users/change_password/", post(change_password))
        .route(
            "/users/{id}/",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        // Public profiles
        .route("/profile/{username}/", get(public_profile))
        .route("/profile/{username}/reviews/", get(profile_reviews))
        // Search and statistics
        .route("/search/", get(search_books))
        .route("/statistics/", get(get_statistics))
}

pub fn build_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.blobs.root);
    let media_url = state.blobs.media_url.clone();

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1", api_routes())
        .nest_service(&media_url, media)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
