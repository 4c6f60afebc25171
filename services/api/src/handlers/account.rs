use anyhow::Context as _;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_auth_types::cookie::{clear_access_token_cookie, set_access_token_cookie};
use bookstore_auth_types::identity::CurrentActor;
use bookstore_auth_types::token::issue_access_token;
use bookstore_domain::actor::Identity;

use crate::domain::repository::ReviewRepository;
use crate::domain::types::{ProfileChanges, User};
use crate::error::ServiceError;
use crate::handlers::views::{ReviewView, UserAccountView, UserView};
use crate::handlers::{MessageResponse, PageQuery, ValidJson, ValidPath, ValidQuery};
use crate::state::AppState;
use crate::usecase::account::{
    ChangePasswordInput, ChangePasswordUseCase, DeleteUserUseCase, GetMeUseCase, GetUserUseCase,
    ListUsersUseCase, LoginUseCase, PublicProfileUseCase, RegisterInput, RegisterUseCase,
    SetAvatarUseCase, UpdateProfileUseCase, UpdateUserUseCase, UserReviewsUseCase,
};

async fn own_account(state: &AppState, user: User) -> Result<UserAccountView, ServiceError> {
    let reviews_count = state.review_repo().count_by_user(user.id).await?;
    Ok(UserAccountView::new(user, reviews_count, &state.blobs))
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    pub user: UserAccountView,
    pub access_token: String,
    pub access_token_exp: u64,
}

/// Sign a token for `user` and set it as the access-token cookie.
fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> Result<(CookieJar, String, u64), ServiceError> {
    let (token, exp) = issue_access_token(
        Identity::new(user.id, user.role),
        state.jwt_secret.as_str(),
    )
    .context("sign access token")?;
    let jar = set_access_token_cookie(jar, token.clone(), state.cookie_domain.clone());
    Ok((jar, token, exp))
}

// ── POST /auth/register/ and POST /users/ ────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub bio: String,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(body: RegisterRequest) -> Self {
        Self {
            username: body.username,
            email: body.email,
            password: body.password,
            password_confirm: body.password_confirm,
            first_name: body.first_name,
            last_name: body.last_name,
            phone_number: body.phone_number,
            address: body.address,
            date_of_birth: body.date_of_birth,
            bio: body.bio,
        }
    }
}

async fn register_user(state: &AppState, body: RegisterRequest) -> Result<User, ServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        credentials: state.credentials.clone(),
    };
    usecase.execute(body.into()).await
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = register_user(&state, body).await?;
    let (jar, access_token, access_token_exp) = start_session(&state, jar, &user)?;
    let body = SessionResponse {
        message: "registration successful",
        user: UserAccountView::new(user, 0, &state.blobs),
        access_token,
        access_token_exp,
    };
    Ok((StatusCode::CREATED, jar, Json(body)))
}

pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserAccountView>), ServiceError> {
    let user = register_user(&state, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserAccountView::new(user, 0, &state.blobs)),
    ))
}

// ── POST /auth/login/ ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        credentials: state.credentials.clone(),
    };
    let user = usecase.execute(&body.username, &body.password).await?;
    let (jar, access_token, access_token_exp) = start_session(&state, jar, &user)?;
    let body = SessionResponse {
        message: "login successful",
        user: own_account(&state, user).await?,
        access_token,
        access_token_exp,
    };
    Ok((StatusCode::OK, jar, Json(body)))
}

// ── POST /auth/logout/ ───────────────────────────────────────────────────────

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = clear_access_token_cookie(jar, state.cookie_domain.clone());
    (
        StatusCode::OK,
        jar,
        Json(MessageResponse {
            message: "logout successful",
        }),
    )
}

// ── GET /users/ ──────────────────────────────────────────────────────────────

pub async fn list_users(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Json<Vec<UserView>>, ServiceError> {
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
        reviews: state.review_repo(),
    };
    let records = usecase.execute(&actor, query.page()).await?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| UserView::new(r, &state.blobs))
            .collect(),
    ))
}

// ── GET /users/me/ ───────────────────────────────────────────────────────────

pub async fn get_me(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
) -> Result<Json<UserAccountView>, ServiceError> {
    let usecase = GetMeUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&actor).await?;
    Ok(Json(own_account(&state, user).await?))
}

// ── PUT|PATCH /users/update_profile/ ─────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    /// `null` clears the date; an absent field leaves it.
    #[serde(default, deserialize_with = "explicit_null")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub bio: Option<String>,
}

/// Distinguishes an absent field from an explicit `null`.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<ProfileRequest> for ProfileChanges {
    fn from(body: ProfileRequest) -> Self {
        Self {
            first_name: body.first_name,
            last_name: body.last_name,
            phone_number: body.phone_number,
            address: body.address,
            date_of_birth: body.date_of_birth,
            bio: body.bio,
        }
    }
}

pub async fn update_profile(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<ProfileRequest>,
) -> Result<Json<UserAccountView>, ServiceError> {
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&actor, body.into()).await?;
    Ok(Json(own_account(&state, user).await?))
}

// ── PUT /users/update_profile/avatar/ ────────────────────────────────────────

pub async fn set_avatar(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    image: Bytes,
) -> Result<Json<UserAccountView>, ServiceError> {
    let usecase = SetAvatarUseCase {
        users: state.user_repo(),
        blobs: state.blobs.clone(),
    };
    let user = usecase.execute(&actor, image).await?;
    Ok(Json(own_account(&state, user).await?))
}

// ── POST /users/change_password/ ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

pub async fn change_password(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
        credentials: state.credentials.clone(),
    };
    usecase
        .execute(
            &actor,
            ChangePasswordInput {
                old_password: body.old_password,
                new_password: body.new_password,
                new_password_confirm: body.new_password_confirm,
            },
        )
        .await?;
    Ok(Json(MessageResponse {
        message: "password changed",
    }))
}

// ── GET|PUT|PATCH|DELETE /users/{id}/ ────────────────────────────────────────

pub async fn get_user(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<UserView>, ServiceError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
        reviews: state.review_repo(),
    };
    let record = usecase.execute(&actor, id).await?;
    Ok(Json(UserView::new(record, &state.blobs)))
}

pub async fn update_user(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(body): ValidJson<ProfileRequest>,
) -> Result<Json<UserAccountView>, ServiceError> {
    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&actor, id, body.into()).await?;
    Ok(Json(own_account(&state, user).await?))
}

pub async fn delete_user(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, ServiceError> {
    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
    };
    usecase.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /profile/{username}/ ─────────────────────────────────────────────────

pub async fn public_profile(
    State(state): State<AppState>,
    ValidPath(username): ValidPath<String>,
) -> Result<Json<UserView>, ServiceError> {
    let usecase = PublicProfileUseCase {
        users: state.user_repo(),
        reviews: state.review_repo(),
    };
    let record = usecase.execute(&username).await?;
    Ok(Json(UserView::new(record, &state.blobs)))
}

// ── GET /profile/{username}/reviews/ ─────────────────────────────────────────

pub async fn profile_reviews(
    State(state): State<AppState>,
    ValidPath(username): ValidPath<String>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Json<Vec<ReviewView>>, ServiceError> {
    let usecase = UserReviewsUseCase {
        users: state.user_repo(),
        reviews: state.review_repo(),
    };
    let records = usecase.execute(&username, query.page()).await?;
    Ok(Json(records.into_iter().map(ReviewView::from).collect()))
}
