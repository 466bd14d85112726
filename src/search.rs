//! Search page state: the latest result slots, the "has searched" flag and
//! the open/closed state of every sample's detail view.

use crate::domain::SearchTerm;
use crate::model::{Sample, Specimen};
use crate::render::{self, SampleCard, SampleKey, SpecimenView};
use crate::resolver::{LookupFailure, Resolution};

/// Identifies one sample card on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CardId {
    /// The sample returned by the accession lookup.
    Found,
    /// A sample listed under the found specimen.
    Nested(SampleKey),
}

/// A submitted search waiting for its resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub term: SearchTerm,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageView<'a> {
    /// Nothing has been searched yet.
    Idle,
    NoResults {
        failures: &'a [LookupFailure],
    },
    Results {
        sample: Option<&'a Sample>,
        specimen: Option<SpecimenView<'a>>,
        failures: &'a [LookupFailure],
    },
}

#[derive(Debug, Default)]
pub struct SearchPage {
    has_searched: bool,
    input_invalid: bool,
    sample: Option<Sample>,
    specimen: Option<Specimen>,
    failures: Vec<LookupFailure>,
    issued: u64,
    applied: Option<u64>,
    cards: Vec<(CardId, SampleCard)>,
}

impl SearchPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `input` and issues a ticket for it.
    ///
    /// Blank input only marks the field invalid; result slots and the
    /// "has searched" flag are left alone. A valid term flips "has
    /// searched" right away, before any lookup has answered.
    pub fn submit(&mut self, input: &str) -> Option<SearchTicket> {
        match input.parse::<SearchTerm>() {
            Ok(term) => {
                self.input_invalid = false;
                self.has_searched = true;
                self.issued += 1;
                Some(SearchTicket {
                    seq: self.issued,
                    term,
                })
            }
            Err(_) => {
                self.input_invalid = true;
                None
            }
        }
    }

    /// Stores the resolution for ticket `seq` unless a later search has
    /// already been applied or issued. Returns whether it was applied.
    pub fn apply(&mut self, seq: u64, resolution: Resolution) -> bool {
        if seq != self.issued || self.applied == Some(seq) {
            tracing::debug!(seq, latest = self.issued, "discarding stale search result");
            return false;
        }
        self.applied = Some(seq);
        self.sample = resolution.sample;
        self.specimen = resolution.specimen;
        self.failures = resolution.failures;
        self.cards = self
            .card_ids()
            .into_iter()
            .map(|id| (id, SampleCard::default()))
            .collect();
        true
    }

    /// A search has been issued and its result is not in yet.
    pub fn is_pending(&self) -> bool {
        self.issued > self.applied.unwrap_or(0)
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    pub fn input_invalid(&self) -> bool {
        self.input_invalid
    }

    pub fn clear_invalid(&mut self) {
        self.input_invalid = false;
    }

    pub fn sample(&self) -> Option<&Sample> {
        self.sample.as_ref()
    }

    pub fn specimen(&self) -> Option<&Specimen> {
        self.specimen.as_ref()
    }

    pub fn view(&self) -> PageView<'_> {
        if !self.has_searched {
            return PageView::Idle;
        }
        if self.sample.is_none() && self.specimen.is_none() {
            return PageView::NoResults {
                failures: &self.failures,
            };
        }
        PageView::Results {
            sample: self.sample.as_ref(),
            specimen: self.specimen.as_ref().map(render::specimen_view),
            failures: &self.failures,
        }
    }

    /// Cards in display order: the found sample first, then the specimen's
    /// samples in list order.
    pub fn cards(&self) -> impl Iterator<Item = &CardId> {
        self.cards.iter().map(|(id, _)| id)
    }

    pub fn card_sample(&self, id: &CardId) -> Option<&Sample> {
        match id {
            CardId::Found => self.sample.as_ref(),
            CardId::Nested(key) => {
                let specimen = self.specimen.as_ref()?;
                render::sample_keys(&specimen.samples)
                    .iter()
                    .position(|candidate| candidate == key)
                    .and_then(|index| specimen.samples.get(index))
            }
        }
    }

    pub fn is_detail_open(&self, id: &CardId) -> bool {
        self.card(id).is_some_and(SampleCard::is_open)
    }

    /// The card whose detail view is open, if any.
    pub fn open_detail_card(&self) -> Option<&CardId> {
        self.cards
            .iter()
            .find(|(_, card)| card.is_open())
            .map(|(id, _)| id)
    }

    /// Opens the detail view of `id`. Returns false for unknown cards.
    pub fn open_detail(&mut self, id: &CardId) -> bool {
        match self.card_mut(id) {
            Some(card) => {
                card.open();
                true
            }
            None => false,
        }
    }

    pub fn close_detail(&mut self, id: &CardId) {
        if let Some(card) = self.card_mut(id) {
            card.close();
        }
    }

    fn card(&self, id: &CardId) -> Option<&SampleCard> {
        self.cards
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, card)| card)
    }

    fn card_mut(&mut self, id: &CardId) -> Option<&mut SampleCard> {
        self.cards
            .iter_mut()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, card)| card)
    }

    fn card_ids(&self) -> Vec<CardId> {
        let mut ids = Vec::new();
        if self.sample.is_some() {
            ids.push(CardId::Found);
        }
        if let Some(specimen) = &self.specimen {
            ids.extend(
                render::sample_keys(&specimen.samples)
                    .into_iter()
                    .map(CardId::Nested),
            );
        }
        ids
    }
}
