use std::sync::Arc;

use crate::config::MembersConfig;
use crate::contract::model::{ListQuery, Member, MemberPage, MemberPatch, MemberStatus, NewMember};
use crate::domain::error::DomainError;
use crate::domain::repo::MembersRepository;
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Domain service with the registry's business rules.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn MembersRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub page_size: u32,
    pub name_max_len: usize,
    pub enforce_unique_email: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from(&MembersConfig::default())
    }
}

impl From<&MembersConfig> for ServiceConfig {
    fn from(cfg: &MembersConfig) -> Self {
        Self {
            page_size: cfg.page_size,
            name_max_len: cfg.name_max_len,
            enforce_unique_email: cfg.enforce_unique_email,
        }
    }
}

/// Canonicalize an email for storage and comparison: trim whitespace and
/// ASCII lower-case.
pub fn canonicalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

impl Service {
    pub fn new(repo: Arc<dyn MembersRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "members.service.get", skip(self), fields(member_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Member, DomainError> {
        debug!("Getting member by id");

        let member = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::member_not_found(id))?;
        Ok(member)
    }

    /// List members: filter and order first, then paginate.
    #[instrument(name = "members.service.list", skip(self, query))]
    pub async fn list(&self, query: ListQuery) -> Result<MemberPage, DomainError> {
        let page = query.page.unwrap_or(1).max(1);
        let filter = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        let rows = self
            .repo
            .find_page(filter, page, self.config.page_size)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        debug!("Listed {} members (total {})", rows.items.len(), rows.total);
        Ok(MemberPage {
            items: rows.items,
            page,
            page_size: self.config.page_size,
            total: rows.total,
        })
    }

    #[instrument(
        name = "members.service.create",
        skip(self, new_member),
        fields(email = %new_member.email)
    )]
    pub async fn create(&self, new_member: NewMember) -> Result<Member, DomainError> {
        info!("Creating new member");

        let name = new_member.name.trim().to_string();
        let email = canonicalize_email(&new_member.email);

        self.validate_name(&name)?;
        self.validate_email(&email)?;
        self.check_email_unique(&email, None).await?;

        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4(),
            name,
            email,
            status: MemberStatus::Current,
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(member.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Created member with id={}", member.id);
        Ok(member)
    }

    #[instrument(name = "members.service.update", skip(self, patch), fields(member_id = %id))]
    pub async fn update(&self, id: Uuid, patch: MemberPatch) -> Result<Member, DomainError> {
        info!("Updating member");

        // Validate the whole patch before touching the record; a failed
        // update must leave no partial write.
        let name = patch.name.as_deref().map(|n| n.trim().to_string());
        let email = patch.email.as_deref().map(canonicalize_email);

        if let Some(ref name) = name {
            self.validate_name(name)?;
        }
        if let Some(ref email) = email {
            self.validate_email(email)?;
        }

        let mut current = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::member_not_found(id))?;

        if let Some(ref new_email) = email {
            if new_email != &current.email {
                self.check_email_unique(new_email, Some(id)).await?;
            }
        }

        if let Some(name) = name {
            current.name = name;
        }
        if let Some(email) = email {
            current.email = email;
        }
        current.updated_at = Utc::now();

        self.repo
            .update(current.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Updated member");
        Ok(current)
    }

    /// Flip status between Current and Ex-Member, refresh `updated_at`,
    /// persist, and return the updated member.
    #[instrument(name = "members.service.toggle_status", skip(self), fields(member_id = %id))]
    pub async fn toggle_status(&self, id: Uuid) -> Result<Member, DomainError> {
        let mut current = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::member_not_found(id))?;

        current.status = current.status.toggled();
        current.updated_at = Utc::now();

        self.repo
            .update(current.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Toggled member status to {}", current.status.as_str());
        Ok(current)
    }

    /// Bulk-set status for the listed members. Missing ids are skipped.
    #[instrument(name = "members.service.mark_all", skip(self, ids))]
    pub async fn mark_all(
        &self,
        ids: &[Uuid],
        status: MemberStatus,
    ) -> Result<usize, DomainError> {
        let touched = self
            .repo
            .set_status_many(ids, status)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!("Marked {} member(s) as {}", touched, status.as_str());
        Ok(touched)
    }

    /// Bulk-toggle status for the listed members. Missing ids are skipped.
    #[instrument(name = "members.service.toggle_many", skip(self, ids))]
    pub async fn toggle_many(&self, ids: &[Uuid]) -> Result<usize, DomainError> {
        let mut toggled = 0;
        for id in ids {
            match self.toggle_status(*id).await {
                Ok(_) => toggled += 1,
                Err(DomainError::MemberNotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(toggled)
    }

    // --- validation helpers ---

    fn validate_name(&self, name: &str) -> Result<(), DomainError> {
        if name.is_empty() {
            return Err(DomainError::empty_name());
        }
        if name.len() > self.config.name_max_len {
            return Err(DomainError::name_too_long(
                name.len(),
                self.config.name_max_len,
            ));
        }
        Ok(())
    }

    fn validate_email(&self, email: &str) -> Result<(), DomainError> {
        if email.is_empty() {
            return Err(DomainError::validation("email", "Email is required."));
        }
        if !email.contains('@') || !email.contains('.') {
            return Err(DomainError::invalid_email(email.to_string()));
        }
        Ok(())
    }

    async fn check_email_unique(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), DomainError> {
        if !self.config.enforce_unique_email {
            return Ok(());
        }
        if self
            .repo
            .email_exists(email, exclude)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::email_already_exists(email.to_string()));
        }
        Ok(())
    }
}
