use crate::contract::model::{Member, MemberStatus};
use crate::infra::storage::entity::{Model as MemberRow, Status};

impl From<Status> for MemberStatus {
    fn from(s: Status) -> Self {
        match s {
            Status::Current => MemberStatus::Current,
            Status::ExMember => MemberStatus::ExMember,
        }
    }
}

impl From<MemberStatus> for Status {
    fn from(s: MemberStatus) -> Self {
        match s {
            MemberStatus::Current => Status::Current,
            MemberStatus::ExMember => Status::ExMember,
        }
    }
}

/// Convert a database row to a contract model
pub fn row_to_contract(row: MemberRow) -> Member {
    Member {
        id: row.id,
        name: row.name,
        email: row.email,
        status: row.status.into(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Convert a contract model to a database row
pub fn contract_to_row(member: Member) -> MemberRow {
    MemberRow {
        id: member.id,
        name: member.name,
        email: member.email,
        status: member.status.into(),
        created_at: member.created_at,
        updated_at: member.updated_at,
    }
}
