use sea_orm::entity::prelude::*;

/// Account record. `password` holds the credential handle (an Argon2 PHC string), never
/// the password itself.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub avatar: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub role: i16,
    pub is_active: bool,
    pub is_verified: bool,
    pub email_verified: bool,
    pub date_joined: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
