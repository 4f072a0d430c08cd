use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    /// Informational back-reference; the owning halqa's member list is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halqa_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Halqa {
    pub id: String,
    pub area_id: String,
    pub name: String,
    #[serde(default)]
    pub meeting_day: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Halqa {
    pub fn strength(&self) -> usize {
        self.members.len()
    }

    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }
}
