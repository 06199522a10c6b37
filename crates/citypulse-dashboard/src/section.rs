//! The fetch, refine, present pipeline shared by every dashboard section.

use std::sync::Arc;

use async_trait::async_trait;
use citypulse_core::{PlaceCategory, Provider, ProviderError};

use crate::gate::CityGate;
use crate::refine::{Refined, RefinementPolicy};

/// What a section is asked to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionQuery {
    pub city: String,
    pub category: PlaceCategory,
}

impl SectionQuery {
    pub fn new(city: impl Into<String>, category: PlaceCategory) -> Self {
        Self {
            city: city.into(),
            category,
        }
    }
}

/// Fetches raw records for one section from its provider.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    type Item: Send + 'static;

    fn provider(&self) -> Provider;

    async fn fetch(&self, query: &SectionQuery) -> Result<Vec<Self::Item>, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing API key or similar local setup problem
    Configuration,
    /// The provider refused the request (bad key, rate limit, 4xx/5xx)
    Rejected,
    NotFound,
    Network,
    InvalidResponse,
}

/// A failed section, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFailure {
    pub provider: Provider,
    pub kind: FailureKind,
    /// Message suitable for the user
    pub message: String,
    /// Full error text for logs
    pub detail: String,
}

impl From<&ProviderError> for SectionFailure {
    fn from(err: &ProviderError) -> Self {
        let kind = match err {
            ProviderError::MissingApiKey { .. } => FailureKind::Configuration,
            ProviderError::Unauthorized { .. }
            | ProviderError::RateLimited { .. }
            | ProviderError::Rejected { .. } => FailureKind::Rejected,
            ProviderError::NotFound { .. } => FailureKind::NotFound,
            ProviderError::Network { .. } => FailureKind::Network,
            ProviderError::InvalidResponse { .. } => FailureKind::InvalidResponse,
        };
        Self {
            provider: err.provider(),
            kind,
            message: err.user_message().to_string(),
            detail: err.to_string(),
        }
    }
}

/// Display state of one section. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionState<T> {
    /// No city selected yet
    Idle,
    Loading,
    /// The section does not apply to the selected city
    Hidden,
    /// The provider answered but nothing survived refinement
    Empty,
    Ready(Refined<T>),
    Failed(SectionFailure),
}

impl<T> SectionState<T> {
    /// False only while a fetch is outstanding.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SectionState::Loading)
    }

    pub fn items(&self) -> &[T] {
        match self {
            SectionState::Ready(refined) => &refined.items,
            _ => &[],
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.items().first()
    }

    pub fn failure(&self) -> Option<&SectionFailure> {
        match self {
            SectionState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

type PolicyFactory<T> = Box<dyn Fn(&SectionQuery) -> RefinementPolicy<T> + Send + Sync>;

/// One pipeline: optional gate, provider adapter and refinement policy.
pub struct Section<T> {
    adapter: Arc<dyn ProviderAdapter<Item = T>>,
    policy_for: PolicyFactory<T>,
    gate: Option<CityGate>,
}

impl<T: Send + 'static> Section<T> {
    /// `policy_for` builds the refinement policy for each query, so policies
    /// can depend on the searched city.
    pub fn new(
        adapter: Arc<dyn ProviderAdapter<Item = T>>,
        policy_for: impl Fn(&SectionQuery) -> RefinementPolicy<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            adapter,
            policy_for: Box::new(policy_for),
            gate: None,
        }
    }

    /// Only attempt the fetch for cities the gate allows.
    pub fn with_gate(mut self, gate: CityGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn provider(&self) -> Provider {
        self.adapter.provider()
    }

    pub async fn run(&self, query: &SectionQuery) -> SectionState<T> {
        if let Some(gate) = &self.gate {
            if !gate.allows(&query.city) {
                tracing::debug!("{} section hidden for {}", self.provider(), query.city);
                return SectionState::Hidden;
            }
        }

        match self.adapter.fetch(query).await {
            Ok(raw) => {
                let refined = (self.policy_for)(query).apply(raw);
                if refined.is_empty() {
                    SectionState::Empty
                } else {
                    SectionState::Ready(refined)
                }
            }
            Err(e) => {
                if e.is_configuration_error() {
                    tracing::warn!("{} section not configured: {}", self.provider(), e);
                } else {
                    tracing::warn!("{} section failed for {}: {}", self.provider(), query.city, e);
                }
                SectionState::Failed(SectionFailure::from(&e))
            }
        }
    }
}
