use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::contract::model::{Member, MemberStatus};
use crate::domain::repo::{MembersRepository, PageRows};
use crate::infra::storage::{entity, mapper};

/// SeaORM-backed implementation of the repository port.
pub struct SeaOrmMembersRepository {
    db: DatabaseConnection,
}

impl SeaOrmMembersRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MembersRepository for SeaOrmMembersRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Member>> {
        let row = entity::find_by_id(&self.db, id).await?;
        Ok(row.map(mapper::row_to_contract))
    }

    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<bool> {
        Ok(entity::email_exists(&self.db, email, exclude).await?)
    }

    async fn insert(&self, m: Member) -> anyhow::Result<()> {
        entity::insert(&self.db, mapper::contract_to_row(m)).await?;
        Ok(())
    }

    async fn update(&self, m: Member) -> anyhow::Result<()> {
        entity::update(&self.db, mapper::contract_to_row(m)).await?;
        Ok(())
    }

    async fn find_page(
        &self,
        name_filter: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> anyhow::Result<PageRows> {
        let (rows, total) = entity::find_page(&self.db, name_filter, page, page_size).await?;
        Ok(PageRows {
            items: rows.into_iter().map(mapper::row_to_contract).collect(),
            total,
        })
    }

    async fn set_status_many(&self, ids: &[Uuid], status: MemberStatus) -> anyhow::Result<usize> {
        let touched =
            entity::set_status_many(&self.db, ids, status.into(), Utc::now()).await?;
        Ok(touched as usize)
    }
}
