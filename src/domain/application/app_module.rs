use crate::domain::utils::id::ModuleName;

#[derive(Debug, Clone, PartialEq)]
pub struct AppModule {
    pub name: ModuleName,

    /// Static memory footprint.
    pub ram: u64,
}

impl AppModule {
    pub fn new(name: impl Into<ModuleName>, ram: u64) -> Self {
        Self { name: name.into(), ram }
    }
}
