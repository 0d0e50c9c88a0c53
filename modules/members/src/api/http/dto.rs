use serde::Deserialize;

use crate::contract::model::{ListQuery, MemberPatch, NewMember};

/// Form payload shared by the create and edit forms
#[derive(Debug, Clone, Deserialize)]
pub struct MemberFormData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Query parameters for the member list
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListParams {
    pub q: Option<String>,
    pub page: Option<u32>,
    /// Set by the post-create redirect to show a confirmation notice.
    pub created: Option<u8>,
}

/// Login form payload
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Query parameters for the login page
#[derive(Debug, Deserialize, Default)]
pub struct LoginParams {
    pub next: Option<String>,
}

impl From<MemberFormData> for NewMember {
    fn from(form: MemberFormData) -> Self {
        Self {
            name: form.name,
            email: form.email,
        }
    }
}

impl From<MemberFormData> for MemberPatch {
    fn from(form: MemberFormData) -> Self {
        Self {
            name: Some(form.name),
            email: Some(form.email),
        }
    }
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        Self {
            q: params.q,
            page: params.page,
        }
    }
}
