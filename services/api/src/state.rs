use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use bookstore_auth_types::identity::TokenSecret;

use crate::infra::blob::LocalBlobStore;
use crate::infra::credentials::Argon2Credentials;
use crate::infra::db::author::DbAuthorRepository;
use crate::infra::db::book::DbBookRepository;
use crate::infra::db::category::DbCategoryRepository;
use crate::infra::db::review::DbReviewRepository;
use crate::infra::db::statistics::DbStatisticsPort;
use crate::infra::db::user::DbUserRepository;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: TokenSecret,
    pub cookie_domain: String,
    pub blobs: LocalBlobStore,
    pub credentials: Argon2Credentials,
}

impl FromRef<AppState> for TokenSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

impl AppState {
    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn author_repo(&self) -> DbAuthorRepository {
        DbAuthorRepository {
            db: self.db.clone(),
        }
    }

    pub fn book_repo(&self) -> DbBookRepository {
        DbBookRepository {
            db: self.db.clone(),
        }
    }

    pub fn review_repo(&self) -> DbReviewRepository {
        DbReviewRepository {
            db: self.db.clone(),
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn statistics(&self) -> DbStatisticsPort {
        DbStatisticsPort {
            db: self.db.clone(),
        }
    }
}
