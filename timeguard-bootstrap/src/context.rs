use anyhow::Result;

use timeguard_domain::AuditSettings;
use timeguard_infrastructure::{AppConfig, VolumeJournal, DEFAULT_VOLUME};

pub struct AuditContext {
    pub settings: AuditSettings,
    pub journal: VolumeJournal,
}

impl AuditContext {
    pub fn new() -> Result<Self> {
        let config = AppConfig::load()?;
        let settings = config.to_audit_settings();
        let journal = VolumeJournal::open(DEFAULT_VOLUME)?;
        Ok(Self { settings, journal })
    }
}
