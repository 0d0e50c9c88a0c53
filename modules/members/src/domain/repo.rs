use crate::contract::model::{Member, MemberStatus};
use async_trait::async_trait;
use uuid::Uuid;

/// One page worth of rows plus the total match count, as returned by the
/// storage layer before domain-level packaging.
pub struct PageRows {
    pub items: Vec<Member>,
    pub total: u64,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait MembersRepository: Send + Sync {
    /// Load a member by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Member>>;
    /// Check uniqueness by canonicalized email, optionally ignoring one
    /// member (the one being updated).
    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<bool>;
    /// Insert a fully-formed domain member.
    ///
    /// Service computes id/timestamps/canonical email; repo persists.
    async fn insert(&self, m: Member) -> anyhow::Result<()>;
    /// Update an existing member (by primary key in `m.id`).
    async fn update(&self, m: Member) -> anyhow::Result<()>;
    /// List one page, filtered by case-insensitive name substring and
    /// ordered ascending by name (id as tie-break).
    async fn find_page(
        &self,
        name_filter: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> anyhow::Result<PageRows>;
    /// Set the status of every listed member, refreshing `updated_at`.
    /// Returns how many rows were touched.
    async fn set_status_many(&self, ids: &[Uuid], status: MemberStatus) -> anyhow::Result<usize>;
}
