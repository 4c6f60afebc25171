use bytes::Bytes;

use bookstore_domain::actor::Actor;
use bookstore_domain::policy::{Action, Resource, Target};

use crate::domain::query::ListParams;
use crate::domain::repository::{AuthorRepository, BlobStore};
use crate::domain::types::{Author, AuthorChanges, AuthorRecord, ImageFormat, NewAuthor};
use crate::domain::validation;
use crate::error::{Entity, ServiceError};
use crate::usecase::{authorize, resolve_slug};

async fn with_counts<R: AuthorRepository>(
    repo: &R,
    authors: Vec<Author>,
) -> Result<Vec<AuthorRecord>, ServiceError> {
    let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
    let counts = repo.books_counts(&ids).await?;
    Ok(authors
        .into_iter()
        .map(|author| AuthorRecord {
            books_count: counts.get(&author.id).copied().unwrap_or(0),
            author,
        })
        .collect())
}

async fn with_count<R: AuthorRepository>(
    repo: &R,
    author: Author,
) -> Result<AuthorRecord, ServiceError> {
    with_counts(repo, vec![author])
        .await?
        .pop()
        .ok_or(ServiceError::NotFound(Entity::Author))
}

pub(crate) async fn find_author<R: AuthorRepository>(
    repo: &R,
    slug: &str,
) -> Result<Author, ServiceError> {
    repo.find_by_slug(slug)
        .await?
        .ok_or(ServiceError::NotFound(Entity::Author))
}

fn validate_contact(email: Option<&str>, website: Option<&str>) -> Result<(), ServiceError> {
    if let Some(website) = website {
        validation::website(website)?;
    }
    match email.map(str::trim) {
        Some(email) if !email.is_empty() => validation::email(email),
        _ => Ok(()),
    }
}

// ── ListAuthors ──────────────────────────────────────────────────────────────

pub struct ListAuthorsUseCase<R: AuthorRepository> {
    pub repo: R,
}

impl<R: AuthorRepository> ListAuthorsUseCase<R> {
    pub async fn execute(&self, params: &ListParams) -> Result<Vec<AuthorRecord>, ServiceError> {
        let authors = self.repo.list(params).await?;
        with_counts(&self.repo, authors).await
    }
}

// ── GetAuthor ────────────────────────────────────────────────────────────────

pub struct GetAuthorUseCase<R: AuthorRepository> {
    pub repo: R,
}

impl<R: AuthorRepository> GetAuthorUseCase<R> {
    pub async fn execute(&self, slug: &str) -> Result<AuthorRecord, ServiceError> {
        let author = find_author(&self.repo, slug).await?;
        with_count(&self.repo, author).await
    }
}

// ── CreateAuthor ─────────────────────────────────────────────────────────────

pub struct CreateAuthorInput {
    pub name: String,
    pub bio: String,
    pub email: String,
    pub website: String,
    pub slug: Option<String>,
}

pub struct CreateAuthorUseCase<R: AuthorRepository> {
    pub repo: R,
}

impl<R: AuthorRepository> CreateAuthorUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        input: CreateAuthorInput,
    ) -> Result<AuthorRecord, ServiceError> {
        authorize(actor, Resource::Author, Action::Create, Target::Unowned)?;
        let name = input.name.trim().to_owned();
        validation::author_name(&name)?;
        validate_contact(Some(&input.email), Some(&input.website))?;
        let slug = resolve_slug(input.slug.as_deref(), &name, validation::AUTHOR_SLUG_MAX)?;

        let author = self
            .repo
            .create(&NewAuthor {
                name,
                bio: input.bio,
                email: input.email.trim().to_owned(),
                website: input.website,
                slug,
            })
            .await?;
        tracing::info!(author_id = author.id, slug = %author.slug, "author created");
        Ok(AuthorRecord {
            author,
            books_count: 0,
        })
    }
}

// ── UpdateAuthor ─────────────────────────────────────────────────────────────

pub struct UpdateAuthorUseCase<R: AuthorRepository> {
    pub repo: R,
}

impl<R: AuthorRepository> UpdateAuthorUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        slug: &str,
        mut changes: AuthorChanges,
    ) -> Result<AuthorRecord, ServiceError> {
        authorize(actor, Resource::Author, Action::Update, Target::Unowned)?;
        if let Some(name) = changes.name.as_mut() {
            *name = name.trim().to_owned();
            validation::author_name(name)?;
        }
        validate_contact(changes.email.as_deref(), changes.website.as_deref())?;

        let author = find_author(&self.repo, slug).await?;
        let author = self.repo.update(author.id, &changes).await?;
        tracing::info!(author_id = author.id, "author updated");
        with_count(&self.repo, author).await
    }
}

// ── DeleteAuthor ─────────────────────────────────────────────────────────────

pub struct DeleteAuthorUseCase<R: AuthorRepository> {
    pub repo: R,
}

impl<R: AuthorRepository> DeleteAuthorUseCase<R> {
    pub async fn execute(&self, actor: &Actor, slug: &str) -> Result<(), ServiceError> {
        authorize(actor, Resource::Author, Action::Delete, Target::Unowned)?;
        let author = find_author(&self.repo, slug).await?;
        if !self.repo.delete(author.id).await? {
            return Err(ServiceError::NotFound(Entity::Author));
        }
        tracing::info!(author_id = author.id, "author deleted");
        Ok(())
    }
}

// ── SetAuthorPhoto ───────────────────────────────────────────────────────────

pub struct SetAuthorPhotoUseCase<R: AuthorRepository, B: BlobStore> {
    pub repo: R,
    pub blobs: B,
}

impl<R: AuthorRepository, B: BlobStore> SetAuthorPhotoUseCase<R, B> {
    pub async fn execute(
        &self,
        actor: &Actor,
        slug: &str,
        image: Bytes,
    ) -> Result<AuthorRecord, ServiceError> {
        authorize(actor, Resource::Author, Action::Update, Target::Unowned)?;
        if ImageFormat::sniff(&image).is_none() {
            return Err(ServiceError::validation(
                "upload a valid image (png, jpeg, gif or webp)",
            ));
        }
        let author = find_author(&self.repo, slug).await?;
        let reference = self.blobs.store_blob(image).await?;
        let author = self.repo.set_photo(author.id, &reference).await?;
        tracing::info!(author_id = author.id, photo = %reference, "author photo stored");
        with_count(&self.repo, author).await
    }
}
