use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func, LikeExpr, StringLen};
use sea_orm::{
    ColumnTrait, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Stored status token. Kept in lockstep with the contract enum by the
/// mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum Status {
    #[sea_orm(string_value = "CURRENT")]
    Current,
    #[sea_orm(string_value = "EX_MEMBER")]
    ExMember,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Already canonicalized (trimmed, lower-cased) by the domain layer.
    #[sea_orm(unique)]
    pub email: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Find a member by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id).one(db).await
}

/// Check if a canonicalized email already exists, optionally ignoring one
/// row (the member being updated).
pub async fn email_exists(
    db: &DatabaseConnection,
    email: &str,
    exclude: Option<Uuid>,
) -> Result<bool, DbErr> {
    let mut query = Entity::find().filter(Column::Email.eq(email));
    if let Some(id) = exclude {
        query = query.filter(Column::Id.ne(id));
    }
    let count = query.count(db).await?;
    Ok(count > 0)
}

/// Escape LIKE metacharacters so a filter matches them literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// One page of members plus the total match count. Filtered by name
/// substring (SQLite LIKE is case-insensitive for ASCII; wildcards in
/// the filter are matched literally), ordered ascending by lower-cased
/// name with id as tie-break.
pub async fn find_page(
    db: &DatabaseConnection,
    name_filter: Option<&str>,
    page: u32,
    page_size: u32,
) -> Result<(Vec<Model>, u64), DbErr> {
    let mut query = Entity::find();
    if let Some(filter) = name_filter {
        let pattern = format!("%{}%", escape_like(filter));
        query = query.filter(Column::Name.like(LikeExpr::new(pattern).escape('\\')));
    }

    let total = query.clone().count(db).await?;

    let offset = u64::from(page.saturating_sub(1)) * u64::from(page_size);
    let items = query
        .order_by(Expr::expr(Func::lower(Expr::col(Column::Name))), Order::Asc)
        .order_by_asc(Column::Id)
        .limit(u64::from(page_size))
        .offset(offset)
        .all(db)
        .await?;

    Ok((items, total))
}

/// Insert a new member row
pub async fn insert(db: &DatabaseConnection, row: Model) -> Result<(), DbErr> {
    let active_model = ActiveModel {
        id: Set(row.id),
        name: Set(row.name),
        email: Set(row.email),
        status: Set(row.status),
        created_at: Set(row.created_at),
        updated_at: Set(row.updated_at),
    };

    active_model.insert(db).await?;
    Ok(())
}

/// Update an existing member row (full row, keyed by `row.id`)
pub async fn update(db: &DatabaseConnection, row: Model) -> Result<(), DbErr> {
    let active_model = ActiveModel {
        id: Set(row.id),
        name: Set(row.name),
        email: Set(row.email),
        status: Set(row.status),
        created_at: Set(row.created_at),
        updated_at: Set(row.updated_at),
    };

    active_model.update(db).await?;
    Ok(())
}

/// Bulk-set status for the listed ids, refreshing `updated_at`.
/// Returns how many rows were touched.
pub async fn set_status_many(
    db: &DatabaseConnection,
    ids: &[Uuid],
    status: Status,
    updated_at: DateTime<Utc>,
) -> Result<u64, DbErr> {
    if ids.is_empty() {
        return Ok(0);
    }
    let result = Entity::update_many()
        .col_expr(Column::Status, Expr::value(status))
        .col_expr(Column::UpdatedAt, Expr::value(updated_at))
        .filter(Column::Id.is_in(ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_escaping_neutralizes_wildcards() {
        assert_eq!(escape_like("50% off"), "50\\% off");
        assert_eq!(escape_like("a_c"), "a\\_c");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
