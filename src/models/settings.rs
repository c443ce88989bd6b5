use serde::{Deserialize, Serialize};

/// 会员等级（按积分门槛划分）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLevel {
    pub name: String,
    pub min_points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_name: String,
    pub description: String,
    pub contact_email: String,
    pub maintenance_mode: bool,
    pub chapters_per_page: u32,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Fiction Reader".to_string(),
            description: String::new(),
            contact_email: String::new(),
            maintenance_mode: false,
            chapters_per_page: 50,
        }
    }
}

pub fn default_member_levels() -> Vec<MemberLevel> {
    [("Bronze", 0), ("Silver", 500), ("Gold", 2000), ("Diamond", 10000)]
        .into_iter()
        .map(|(name, min_points)| MemberLevel {
            name: name.to_string(),
            min_points,
        })
        .collect()
}
