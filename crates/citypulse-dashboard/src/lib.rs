//! The CityPulse dashboard: five independent sections, each fetching from a
//! provider, refining the results and presenting them.

pub mod adapters;
pub mod air_quality;
pub mod dashboard;
pub mod gate;
pub mod policies;
pub mod refine;
pub mod render;
pub mod section;
pub mod selection;
pub mod suggest;

pub use air_quality::{AqiTier, TierColors};
pub use dashboard::{
    Dashboard, DashboardView, SectionKind, SectionPayload, SectionUpdate, Sections,
};
pub use gate::CityGate;
pub use refine::{Ranking, Refined, RefinementPolicy};
pub use render::DashboardReport;
pub use section::{
    FailureKind, ProviderAdapter, Section, SectionFailure, SectionQuery, SectionState,
};
pub use selection::{SelectionTracker, Ticket};
pub use suggest::suggest;
