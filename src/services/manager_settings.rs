use crate::{
    error::{AppError, Result},
    models::settings::{default_member_levels, MemberLevel, SiteSettings},
    services::session::SessionStore,
};
use tracing::info;

pub const MEMBER_LEVELS_KEY: &str = "memberLevels";
pub const SITE_SETTINGS_KEY: &str = "siteSettings";

/// 后台设置
///
/// 后台暂无对应接口，会员等级和站点设置直接保存在本地存储中。
#[derive(Clone)]
pub struct ManagerSettings {
    store: SessionStore,
}

impl ManagerSettings {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// 已保存的会员等级，未设置时返回默认等级；按门槛升序
    pub fn member_levels(&self) -> Vec<MemberLevel> {
        let mut levels = self
            .store
            .get_json::<Vec<MemberLevel>>(MEMBER_LEVELS_KEY)
            .filter(|levels| !levels.is_empty())
            .unwrap_or_else(default_member_levels);
        levels.sort_by_key(|level| level.min_points);
        levels
    }

    pub fn save_member_levels(&self, mut levels: Vec<MemberLevel>) -> Result<()> {
        if levels.is_empty() {
            return Err(AppError::validation("At least one member level is required"));
        }

        for level in &mut levels {
            level.name = level.name.trim().to_string();
            if level.name.is_empty() {
                return Err(AppError::validation("Member level name is required"));
            }
            if level.min_points < 0 {
                return Err(AppError::Validation(format!(
                    "Member level '{}' has a negative threshold",
                    level.name
                )));
            }
        }

        levels.sort_by_key(|level| level.min_points);
        if levels.windows(2).any(|pair| pair[0].min_points == pair[1].min_points) {
            return Err(AppError::validation("Member level thresholds must be unique"));
        }

        self.store.set_json(MEMBER_LEVELS_KEY, &levels)?;
        info!("Saved {} member levels", levels.len());
        Ok(())
    }

    /// 积分对应的会员等级：门槛不超过积分的最高等级
    pub fn level_for_points(&self, points: i64) -> Option<MemberLevel> {
        self.member_levels()
            .into_iter()
            .take_while(|level| level.min_points <= points)
            .last()
    }

    pub fn site_settings(&self) -> SiteSettings {
        self.store
            .get_json(SITE_SETTINGS_KEY)
            .unwrap_or_default()
    }

    pub fn save_site_settings(&self, settings: &SiteSettings) -> Result<()> {
        if settings.site_name.trim().is_empty() {
            return Err(AppError::validation("Site name is required"));
        }
        if settings.chapters_per_page == 0 {
            return Err(AppError::validation("Chapters per page must be positive"));
        }

        self.store.set_json(SITE_SETTINGS_KEY, settings)?;
        info!("Saved site settings");
        Ok(())
    }

    /// 恢复默认设置
    pub fn reset(&self) -> Result<()> {
        self.store.remove_item(MEMBER_LEVELS_KEY)?;
        self.store.remove_item(SITE_SETTINGS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(name: &str, min_points: i64) -> MemberLevel {
        MemberLevel {
            name: name.to_string(),
            min_points,
        }
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = ManagerSettings::new(SessionStore::in_memory());
        assert_eq!(settings.member_levels(), default_member_levels());
        assert_eq!(settings.site_settings(), SiteSettings::default());
    }

    #[test]
    fn test_level_for_points() {
        let settings = ManagerSettings::new(SessionStore::in_memory());
        settings
            .save_member_levels(vec![level("Gold", 1000), level(" Novice ", 0), level("Silver", 100)])
            .unwrap();

        assert_eq!(settings.level_for_points(0).unwrap().name, "Novice");
        assert_eq!(settings.level_for_points(999).unwrap().name, "Silver");
        assert_eq!(settings.level_for_points(5000).unwrap().name, "Gold");
        assert!(settings.level_for_points(-1).is_none());
    }

    #[test]
    fn test_rejects_invalid_levels() {
        let settings = ManagerSettings::new(SessionStore::in_memory());
        assert!(settings.save_member_levels(vec![]).is_err());
        assert!(settings.save_member_levels(vec![level("  ", 0)]).is_err());
        assert!(settings
            .save_member_levels(vec![level("A", 10), level("B", 10)])
            .is_err());
    }

    #[test]
    fn test_site_settings_round_trip_and_reset() {
        let store = SessionStore::in_memory();
        let settings = ManagerSettings::new(store.clone());

        let custom = SiteSettings {
            site_name: "Night Library".to_string(),
            maintenance_mode: true,
            ..SiteSettings::default()
        };
        settings.save_site_settings(&custom).unwrap();
        assert_eq!(settings.site_settings(), custom);
        assert!(store.get_item(SITE_SETTINGS_KEY).is_some());

        settings.reset().unwrap();
        assert_eq!(settings.site_settings(), SiteSettings::default());
    }
}
