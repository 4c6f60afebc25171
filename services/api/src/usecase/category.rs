use bookstore_domain::actor::Actor;
use bookstore_domain::policy::{Action, Resource, Target};

use crate::domain::query::ListParams;
use crate::domain::repository::CategoryRepository;
use crate::domain::types::{Category, CategoryChanges, CategoryRecord, NewCategory};
use crate::domain::validation;
use crate::error::{Entity, ServiceError};
use crate::usecase::{authorize, resolve_slug};

async fn with_counts<R: CategoryRepository>(
    repo: &R,
    categories: Vec<Category>,
) -> Result<Vec<CategoryRecord>, ServiceError> {
    let ids: Vec<i32> = categories.iter().map(|c| c.id).collect();
    let counts = repo.books_counts(&ids).await?;
    Ok(categories
        .into_iter()
        .map(|category| CategoryRecord {
            books_count: counts.get(&category.id).copied().unwrap_or(0),
            category,
        })
        .collect())
}

pub(crate) async fn find_category<R: CategoryRepository>(
    repo: &R,
    slug: &str,
) -> Result<Category, ServiceError> {
    repo.find_by_slug(slug)
        .await?
        .ok_or(ServiceError::NotFound(Entity::Category))
}

// ── ListCategories ───────────────────────────────────────────────────────────

pub struct ListCategoriesUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> ListCategoriesUseCase<R> {
    pub async fn execute(&self, params: &ListParams) -> Result<Vec<CategoryRecord>, ServiceError> {
        let categories = self.repo.list(params).await?;
        with_counts(&self.repo, categories).await
    }
}

// ── GetCategory ──────────────────────────────────────────────────────────────

pub struct GetCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> GetCategoryUseCase<R> {
    pub async fn execute(&self, slug: &str) -> Result<CategoryRecord, ServiceError> {
        let category = find_category(&self.repo, slug).await?;
        let mut records = with_counts(&self.repo, vec![category]).await?;
        records.pop().ok_or(ServiceError::NotFound(Entity::Category))
    }
}

// ── CreateCategory ───────────────────────────────────────────────────────────

pub struct CreateCategoryInput {
    pub name: String,
    pub description: String,
    pub slug: Option<String>,
}

pub struct CreateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> CreateCategoryUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        input: CreateCategoryInput,
    ) -> Result<CategoryRecord, ServiceError> {
        authorize(actor, Resource::Category, Action::Create, Target::Unowned)?;
        let name = input.name.trim().to_owned();
        validation::category_name(&name)?;
        let slug = resolve_slug(input.slug.as_deref(), &name, validation::CATEGORY_SLUG_MAX)?;

        let category = self
            .repo
            .create(&NewCategory {
                name,
                description: input.description,
                slug,
            })
            .await?;
        tracing::info!(category_id = category.id, slug = %category.slug, "category created");
        Ok(CategoryRecord {
            category,
            books_count: 0,
        })
    }
}

// ── UpdateCategory ───────────────────────────────────────────────────────────

pub struct UpdateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> UpdateCategoryUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        slug: &str,
        mut changes: CategoryChanges,
    ) -> Result<CategoryRecord, ServiceError> {
        authorize(actor, Resource::Category, Action::Update, Target::Unowned)?;
        if let Some(name) = changes.name.as_mut() {
            *name = name.trim().to_owned();
            validation::category_name(name)?;
        }
        let category = find_category(&self.repo, slug).await?;
        let category = self.repo.update(category.id, &changes).await?;
        tracing::info!(category_id = category.id, "category updated");

        let mut records = with_counts(&self.repo, vec![category]).await?;
        records.pop().ok_or(ServiceError::NotFound(Entity::Category))
    }
}

// ── DeleteCategory ───────────────────────────────────────────────────────────

pub struct DeleteCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> DeleteCategoryUseCase<R> {
    pub async fn execute(&self, actor: &Actor, slug: &str) -> Result<(), ServiceError> {
        authorize(actor, Resource::Category, Action::Delete, Target::Unowned)?;
        let category = find_category(&self.repo, slug).await?;
        if !self.repo.delete(category.id).await? {
            return Err(ServiceError::NotFound(Entity::Category));
        }
        tracing::info!(category_id = category.id, "category deleted");
        Ok(())
    }
}
