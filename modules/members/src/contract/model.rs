use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Binary membership status. The only state machine in the system: two
/// states, one transition in each direction, no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberStatus {
    #[default]
    Current,
    ExMember,
}

impl MemberStatus {
    /// Stable wire/storage token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::ExMember => "EX_MEMBER",
        }
    }

    /// Human-readable label for rendering.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::ExMember => "Ex-Member",
        }
    }

    /// The other state.
    pub fn toggled(self) -> Self {
        match self {
            Self::Current => Self::ExMember,
            Self::ExMember => Self::Current,
        }
    }
}

/// Pure member model (no serde), independent of storage and HTTP types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    /// Stored canonicalized: trimmed and ASCII lower-cased.
    pub email: String,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new member. Status is not accepted here: new
/// members always start as Current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub email: String,
}

/// Partial update data for a member. Status changes go through the
/// toggle operation only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Listing parameters: case-insensitive substring filter on name and a
/// 1-based page number.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
}

/// One page of a member listing. Filtering and ordering happen before
/// pagination; a page past the end is an empty page, not an error.
#[derive(Debug, Clone)]
pub struct MemberPage {
    pub items: Vec<Member>,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    /// Total matching members across all pages.
    pub total: u64,
}

impl MemberPage {
    pub fn total_pages(&self) -> u32 {
        if self.total == 0 {
            return 1;
        }
        self.total.div_ceil(self.page_size as u64) as u32
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}
