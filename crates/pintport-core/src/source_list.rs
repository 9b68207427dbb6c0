//! Priority-ordered collection of [`Source`]s with stable identifiers.
//!
//! Ids handed out here are recorded next to stored prices, so the list keeps
//! them unique and never rewrites one that is already set. Every mutator
//! builds the proposed sequence in a scratch vector, validates it as a whole
//! and only then swaps it in; a rejected call leaves the list untouched.
//!
//! The list is not internally synchronised. Share it behind one lock held
//! across each mutating call.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::slice;

use log::{debug, warn};

use crate::data_source::{ProviderRegistry, SourceError};
use crate::{Source, SourceId, SourceListError, TimeSeries, UtcDateTime};

/// How the next free id is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdPolicy {
    /// One more than the highest id among current members. Removing the
    /// member holding the highest id lets that number be handed out again.
    #[default]
    HighWaterMark,
    /// One more than the highest id this list has ever held, including
    /// removed members.
    Monotonic,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    sources: Vec<Source>,
    policy: IdPolicy,
    /// Highest id ever held; tracked only under `IdPolicy::Monotonic`.
    max_seen: Option<SourceId>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: IdPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Empty list that will not hand out ids at or below `mark`.
    ///
    /// Used to resume a monotonic list whose earlier members, now gone, are
    /// still referenced by stored prices. `HighWaterMark` lists only look at
    /// current members, so the mark is ignored for them.
    pub fn with_high_water_mark(policy: IdPolicy, mark: SourceId) -> Self {
        let max_seen = match policy {
            IdPolicy::HighWaterMark => None,
            IdPolicy::Monotonic => Some(mark),
        };
        Self {
            sources: Vec::new(),
            policy,
            max_seen,
        }
    }

    /// Build a list from `sources` in one validated pass.
    ///
    /// Sources without an id get consecutive ids, in order, starting above
    /// the largest explicit id (from 0 when there is none).
    pub fn try_from_sources(
        sources: impl IntoIterator<Item = Source>,
    ) -> Result<Self, SourceListError> {
        Self::try_from_sources_with_policy(sources, IdPolicy::default())
    }

    pub fn try_from_sources_with_policy(
        sources: impl IntoIterator<Item = Source>,
        policy: IdPolicy,
    ) -> Result<Self, SourceListError> {
        let mut list = Self::with_policy(policy);
        list.try_extend(sources)?;
        Ok(list)
    }

    /// Append every source in one validated pass; all or nothing.
    ///
    /// Returns the ids given to id-less sources, in order.
    pub fn try_extend(
        &mut self,
        sources: impl IntoIterator<Item = Source>,
    ) -> Result<Vec<SourceId>, SourceListError> {
        let mut scratch = self.sources.clone();
        scratch.extend(sources);
        self.commit(scratch)
    }

    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Source> {
        self.sources.iter()
    }

    pub fn as_slice(&self) -> &[Source] {
        &self.sources
    }

    pub fn get(&self, index: usize) -> Result<&Source, SourceListError> {
        self.sources.get(index).ok_or(SourceListError::IndexOutOfRange {
            index,
            len: self.sources.len(),
        })
    }

    /// Member ids in list order.
    pub fn ids(&self) -> Vec<SourceId> {
        self.sources.iter().filter_map(Source::id).collect()
    }

    pub fn find(&self, id: SourceId) -> Option<&Source> {
        self.sources.iter().find(|source| source.id() == Some(id))
    }

    pub fn position_of(&self, id: SourceId) -> Option<usize> {
        self.sources.iter().position(|source| source.id() == Some(id))
    }

    /// Id an id-less source would receive if inserted now.
    pub fn next_id(&self) -> Option<SourceId> {
        next_after(self.floor(&self.sources))
    }

    /// Replace the member at `index`, returning the one it displaced.
    pub fn set(&mut self, index: usize, source: Source) -> Result<Source, SourceListError> {
        self.check_index(index, self.sources.len())?;
        let mut scratch = self.sources.clone();
        let replaced = std::mem::replace(&mut scratch[index], source);
        self.commit(scratch)?;
        Ok(replaced)
    }

    /// Insert at `index` (`index == len` appends) and return the member's id.
    pub fn insert(&mut self, index: usize, source: Source) -> Result<SourceId, SourceListError> {
        self.check_index(index, self.sources.len() + 1)?;
        let explicit = source.id();
        let mut scratch = self.sources.clone();
        scratch.insert(index, source);
        let assigned = self.commit(scratch)?;
        explicit
            .or_else(|| assigned.first().copied())
            .ok_or(SourceListError::IdOverflow)
    }

    pub fn push(&mut self, source: Source) -> Result<SourceId, SourceListError> {
        self.insert(self.sources.len(), source)
    }

    /// Remove the member at `index`. It keeps its id.
    pub fn remove(&mut self, index: usize) -> Result<Source, SourceListError> {
        self.check_index(index, self.sources.len())?;
        let removed = self.sources.remove(index);
        debug!("removed source {removed} from position {index}");
        Ok(removed)
    }

    /// Query members in priority order and return the first series served.
    ///
    /// Members whose provider is not in `registry` count as failed attempts.
    pub fn fetch(
        &self,
        registry: &ProviderRegistry,
        start: Option<UtcDateTime>,
        end: Option<UtcDateTime>,
    ) -> Result<FetchSuccess, FetchFailure> {
        let mut attempts = Vec::new();

        for source in &self.sources {
            let Some(source_id) = source.id() else {
                continue;
            };
            let result = match registry.get(source.provider()) {
                Some(provider) => source.fetch(provider, start, end),
                None => Err(SourceError::provider_not_registered(source.provider())),
            };

            match result {
                Ok(series) => {
                    return Ok(FetchSuccess {
                        source_id,
                        series,
                        failed_attempts: attempts,
                    })
                }
                Err(error) => {
                    warn!("source {source} failed: {error}");
                    attempts.push(FetchAttempt { source_id, error });
                }
            }
        }

        Err(FetchFailure { attempts })
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<(), SourceListError> {
        if index >= bound {
            return Err(SourceListError::IndexOutOfRange {
                index,
                len: self.sources.len(),
            });
        }
        Ok(())
    }

    /// Highest id that must not be handed out again, given a candidate.
    fn floor(&self, candidate: &[Source]) -> Option<SourceId> {
        let current = self.sources.iter().chain(candidate).filter_map(Source::id).max();
        match self.policy {
            IdPolicy::HighWaterMark => current,
            IdPolicy::Monotonic => current.max(self.max_seen),
        }
    }

    /// Validate `scratch`, give id-less members fresh ids and make it live.
    /// Returns the ids handed out, in list order.
    fn commit(&mut self, mut scratch: Vec<Source>) -> Result<Vec<SourceId>, SourceListError> {
        if let Err(error) = validate(&scratch) {
            warn!("rejected source list change: {error}");
            return Err(error);
        }

        let mut next = next_after(self.floor(&scratch));
        let mut assigned = Vec::new();
        for source in scratch.iter_mut().filter(|source| source.id().is_none()) {
            let id = next.ok_or(SourceListError::IdOverflow)?;
            source.assign_id(id);
            debug!("assigned id {id} to {source}");
            assigned.push(id);
            next = next_after(Some(id));
        }

        if self.policy == IdPolicy::Monotonic {
            self.max_seen = self
                .max_seen
                .max(scratch.iter().filter_map(Source::id).max());
        }
        self.sources = scratch;
        Ok(assigned)
    }
}

fn next_after(floor: Option<SourceId>) -> Option<SourceId> {
    match floor {
        None => Some(SourceId(0)),
        Some(SourceId(id)) => id.checked_add(1).map(SourceId),
    }
}

fn validate(candidate: &[Source]) -> Result<(), SourceListError> {
    let mut keys = HashSet::with_capacity(candidate.len());
    let mut ids = HashSet::with_capacity(candidate.len());

    for (index, source) in candidate.iter().enumerate() {
        source
            .validate()
            .map_err(|reason| SourceListError::InvalidMember { index, reason })?;

        let (query, symbol) = source.dedup_key();
        if !keys.insert((query, symbol)) {
            return Err(SourceListError::DuplicateKey {
                query: query.to_owned(),
                symbol: symbol.map(str::to_owned),
            });
        }

        if let Some(id) = source.id() {
            if !ids.insert(id) {
                return Err(SourceListError::DuplicateId { id });
            }
        }
    }

    Ok(())
}

impl TryFrom<Vec<Source>> for SourceList {
    type Error = SourceListError;

    fn try_from(sources: Vec<Source>) -> Result<Self, Self::Error> {
        Self::try_from_sources(sources)
    }
}

impl<'a> IntoIterator for &'a SourceList {
    type Item = &'a Source;
    type IntoIter = slice::Iter<'a, Source>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

impl Display for SourceList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (position, source) in self.sources.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{source}")?;
        }
        f.write_str("]")
    }
}

/// A failed provider call made while walking the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    pub source_id: SourceId,
    pub error: SourceError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchSuccess {
    /// Member that served the series; price rows are keyed by this id.
    pub source_id: SourceId,
    pub series: TimeSeries,
    pub failed_attempts: Vec<FetchAttempt>,
}

/// Every member failed, or the list was empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub attempts: Vec<FetchAttempt>,
}

impl Display for FetchFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.attempts.is_empty() {
            return f.write_str("no sources to fetch from");
        }
        write!(f, "all {} sources failed", self.attempts.len())?;
        for attempt in &self.attempts {
            write!(f, "; #{}: {}", attempt.source_id, attempt.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FetchFailure {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    fn fx(query: &str) -> Source {
        Source::with_config("fx", query, Some(query), "LSE", &Config::default())
    }

    #[test]
    fn empty_list_starts_at_zero() {
        let list = SourceList::new();
        assert!(list.is_empty());
        assert_eq!(list.next_id(), Some(SourceId(0)));
    }

    #[test]
    fn push_assigns_consecutive_ids() {
        let mut list = SourceList::new();
        assert_eq!(list.push(fx("GBPUSD")).expect("push"), SourceId(0));
        assert_eq!(list.push(fx("EURUSD")).expect("push"), SourceId(1));
        assert_eq!(list.ids(), vec![SourceId(0), SourceId(1)]);
    }

    #[test]
    fn construction_skips_past_explicit_ids() {
        let list = SourceList::try_from_sources(vec![
            fx("GBPUSD"),
            fx("EURUSD").with_id(SourceId(0)),
        ])
        .expect("valid");
        assert_eq!(list.ids(), vec![SourceId(1), SourceId(0)]);
    }

    #[test]
    fn insert_past_end_is_out_of_range() {
        let mut list = SourceList::new();
        let err = list.insert(1, fx("GBPUSD")).expect_err("must fail");
        assert_eq!(err, SourceListError::IndexOutOfRange { index: 1, len: 0 });
        assert!(list.is_empty());
    }

    #[test]
    fn set_with_idless_source_does_not_reuse_replaced_id() {
        let mut list =
            SourceList::try_from_sources(vec![fx("GBPUSD"), fx("EURUSD")]).expect("valid");
        let replaced = list.set(1, fx("CHFUSD")).expect("set");
        assert_eq!(replaced.id(), Some(SourceId(1)));
        assert_eq!(list.ids(), vec![SourceId(0), SourceId(2)]);
    }

    #[test]
    fn set_may_keep_key_of_replaced_member() {
        let mut list =
            SourceList::try_from_sources(vec![fx("GBPUSD"), fx("EURUSD")]).expect("valid");
        let moved = fx("GBPUSD").currency("GBP");
        list.set(0, moved).expect("same key at same slot is allowed");
        assert_eq!(list.get(0).expect("present").currency_code(), "GBP");
    }

    #[test]
    fn invalid_member_reports_index() {
        let err = SourceList::try_from_sources(vec![fx("GBPUSD"), fx("EURUSD").currency("usd")])
            .expect_err("must fail");
        assert!(matches!(err, SourceListError::InvalidMember { index: 1, .. }));
    }

    #[test]
    fn monotonic_policy_survives_removal_of_max() {
        let mut list = SourceList::try_from_sources_with_policy(
            vec![fx("GBPUSD"), fx("EURUSD")],
            IdPolicy::Monotonic,
        )
        .expect("valid");
        list.remove(1).expect("remove");
        assert_eq!(list.next_id(), Some(SourceId(2)));
        assert_eq!(list.push(fx("CHFUSD")).expect("push"), SourceId(2));
    }

    #[test]
    fn monotonic_list_resumes_above_saved_mark() {
        let mut list = SourceList::with_high_water_mark(IdPolicy::Monotonic, SourceId(4));
        let ids = list.try_extend(vec![fx("GBPUSD"), fx("EURUSD")]).expect("valid");
        assert_eq!(ids, vec![SourceId(5), SourceId(6)]);
    }

    #[test]
    fn high_water_mark_policy_ignores_saved_mark() {
        let mut list = SourceList::with_high_water_mark(IdPolicy::HighWaterMark, SourceId(4));
        assert_eq!(list.push(fx("GBPUSD")).expect("push"), SourceId(0));
        assert_eq!(list, SourceList::try_from_sources(vec![fx("GBPUSD")]).expect("valid"));
    }

    #[test]
    fn try_extend_is_all_or_nothing() {
        let mut list = SourceList::try_from_sources(vec![fx("GBPUSD")]).expect("valid");
        let before = list.clone();
        let err = list
            .try_extend(vec![fx("EURUSD"), fx("GBPUSD")])
            .expect_err("duplicate key");
        assert!(matches!(err, SourceListError::DuplicateKey { .. }));
        assert_eq!(list, before);
    }

    #[test]
    fn high_water_mark_reuses_removed_max() {
        let mut list =
            SourceList::try_from_sources(vec![fx("GBPUSD"), fx("EURUSD")]).expect("valid");
        list.remove(1).expect("remove");
        assert_eq!(list.push(fx("CHFUSD")).expect("push"), SourceId(1));
    }

    #[test]
    fn overflowing_id_space_is_rejected() {
        let mut list = SourceList::try_from_sources(vec![fx("GBPUSD").with_id(SourceId(u32::MAX))])
            .expect("valid");
        let err = list.push(fx("EURUSD")).expect_err("must fail");
        assert_eq!(err, SourceListError::IdOverflow);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn display_lists_members() {
        let list = SourceList::try_from_sources(vec![fx("GBPUSD")]).expect("valid");
        assert_eq!(list.to_string(), "[#0 fx:GBPUSD/GBPUSD @LSE (USD)]");
    }
}
