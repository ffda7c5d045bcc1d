//! Keyword rule tables for the model's tagged behaviors.
//!
//! The model attaches configuration through behaviors whose names are
//! fixed keywords (`setStage`, `executionScript`, ...) or dynamic,
//! prefix-matched keywords carrying an instance name (`setCache<Name>`,
//! `setLibrary<Name>`). Both tables are processed uniformly: the
//! extractor iterates [`ConfigKeyword::ALL`] for the global
//! configuration and classifies each job behavior via
//! [`BehaviorKind::classify`]. Unknown keywords are skipped silently;
//! absence is not an error.

/// Top-level configuration keywords under the `configurePipeline`
/// component usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKeyword {
    /// `onPush` trigger component.
    Push,
    /// `onPullRequest` trigger component.
    PullRequest,
    /// PR event types qualifier.
    Types,
    /// Global variable declarations.
    Variables,
    /// Global permission declarations.
    Permissions,
    /// Branch inclusion filter qualifier.
    IncludeBranches,
    /// Branch exclusion filter qualifier.
    ExcludeBranches,
    /// Path inclusion filter qualifier.
    IncludeFiles,
    /// Path exclusion filter qualifier.
    ExcludeFiles,
}

impl ConfigKeyword {
    /// Every top-level configuration keyword, in processing order.
    pub const ALL: [Self; 9] = [
        Self::Push,
        Self::PullRequest,
        Self::Types,
        Self::Variables,
        Self::Permissions,
        Self::IncludeBranches,
        Self::ExcludeBranches,
        Self::IncludeFiles,
        Self::ExcludeFiles,
    ];

    /// Qualifiers collected recursively under each trigger keyword.
    pub const FILTER_QUALIFIERS: [Self; 5] = [
        Self::Types,
        Self::IncludeBranches,
        Self::ExcludeBranches,
        Self::IncludeFiles,
        Self::ExcludeFiles,
    ];

    /// The keyword as it appears in the model.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Push => "onPush",
            Self::PullRequest => "onPullRequest",
            Self::Types => "setTypes",
            Self::Variables => "setGlobalVariables",
            Self::Permissions => "setGlobalPermissions",
            Self::IncludeBranches => "includeBranches",
            Self::ExcludeBranches => "excludeBranches",
            Self::IncludeFiles => "includeFiles",
            Self::ExcludeFiles => "excludeFiles",
        }
    }
}

/// Prefix of the dynamic cache behavior keyword.
pub const CACHE_PREFIX: &str = "setCache";

/// Prefix of the dynamic library behavior keyword.
pub const LIBRARY_PREFIX: &str = "setLibrary";

/// Classification of a job behavior name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorKind {
    /// `setStage`: stage membership, first statement wins.
    Stage,
    /// `executionScript`: `cmd<N>` keyed shell statements.
    Exec,
    /// `setDependencies`: needed job names.
    Dependencies,
    /// `setPermissions`: job-level permission scopes.
    Permissions,
    /// `setContainerImage`: container image properties.
    Image,
    /// `setBuildArtifact`: upload-artifact properties and paths.
    BuildArtifact,
    /// `setDownloadArtifact`: download-artifact properties.
    DownloadArtifact,
    /// `setRelease`: release properties and paths.
    Release,
    /// `setEnvironment`: deployment environment properties.
    Environment,
    /// `setReportArtifact`: report entries.
    Report,
    /// `setCheckout`: checkout ref and options.
    Checkout,
    /// `setCache<Name>`: one cache instance keyed by the full name.
    Cache,
    /// `setLibrary<Name>`: one library instance keyed by the full name.
    Library,
}

impl BehaviorKind {
    /// Classify a behavior name, fixed keywords before dynamic prefixes.
    ///
    /// `setCache`/`setLibrary` prefixes match the bare prefix too: an
    /// unnamed `setCache` behavior is a valid single instance.
    #[must_use]
    pub fn classify(name: &str) -> Option<Self> {
        let fixed = match name {
            "setStage" => Some(Self::Stage),
            "executionScript" => Some(Self::Exec),
            "setDependencies" => Some(Self::Dependencies),
            "setPermissions" => Some(Self::Permissions),
            "setContainerImage" => Some(Self::Image),
            "setBuildArtifact" => Some(Self::BuildArtifact),
            "setDownloadArtifact" => Some(Self::DownloadArtifact),
            "setRelease" => Some(Self::Release),
            "setEnvironment" => Some(Self::Environment),
            "setReportArtifact" => Some(Self::Report),
            "setCheckout" => Some(Self::Checkout),
            _ => None,
        };
        if fixed.is_some() {
            return fixed;
        }
        if name.starts_with(LIBRARY_PREFIX) {
            return Some(Self::Library);
        }
        if name.starts_with(CACHE_PREFIX) {
            return Some(Self::Cache);
        }
        None
    }
}
