#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum FixtureStage {
    /// Allow-list tree has been built; the pool holds nothing
    #[default]
    TreeBuilt,

    /// Pool tokens have been minted to the admin and approved for the service
    PoolFunded,

    /// The root has been published and claims are allowed
    CampaignInitialized,
}

impl FixtureStage {
    pub fn all() -> &'static [FixtureStage] {
        &[
            FixtureStage::TreeBuilt,
            FixtureStage::PoolFunded,
            FixtureStage::CampaignInitialized,
        ]
    }
}
