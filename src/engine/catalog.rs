use std::collections::{BTreeMap, HashMap, HashSet};

use crate::limits::*;
use crate::model::*;
use crate::tree::{IndexError, OrderedIndex};

use super::EngineError;

/// Venue records plus the categorical and capacity indices used for search.
///
/// Not synchronized; the engine keeps it behind a single lock so the name
/// check and the insert in [`VenueCatalog::add_venue`] are one atomic step.
#[derive(Debug)]
pub struct VenueCatalog {
    venues: BTreeMap<VenueId, Venue>,
    kind_index: HashMap<String, Vec<VenueId>>,
    location_index: HashMap<String, Vec<VenueId>>,
    /// capacity → venues with exactly that capacity, in insertion order.
    capacity_index: OrderedIndex<u32, Vec<VenueId>>,
    next_id: VenueId,
}

impl Default for VenueCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl VenueCatalog {
    pub fn new() -> Self {
        Self {
            venues: BTreeMap::new(),
            kind_index: HashMap::new(),
            location_index: HashMap::new(),
            capacity_index: OrderedIndex::new(),
            next_id: 1,
        }
    }

    // ── Venue CRUD ───────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Id the next successful `add_venue` will assign.
    pub fn next_id(&self) -> VenueId {
        self.next_id
    }

    pub fn add_venue(&mut self, venue: NewVenue) -> Result<VenueId, EngineError> {
        validate_venue(&venue)?;
        if self.venues.len() >= MAX_VENUES {
            return Err(EngineError::LimitExceeded("too many venues"));
        }
        if self.id_by_name(&venue.name).is_some() {
            return Err(EngineError::NameConflict(venue.name));
        }

        let id = self.next_id;
        self.kind_index.entry(venue.kind.clone()).or_default().push(id);
        self.location_index
            .entry(venue.location.clone())
            .or_default()
            .push(id);
        match self.capacity_index.get_mut(&venue.capacity) {
            Some(ids) => ids.push(id),
            None => {
                self.capacity_index.insert(venue.capacity, vec![id]);
            }
        }
        self.venues.insert(id, Venue::from_new(id, venue));
        self.next_id += 1;
        Ok(id)
    }

    pub fn get(&self, id: VenueId) -> Option<&Venue> {
        self.venues.get(&id)
    }

    pub fn contains(&self, id: VenueId) -> bool {
        self.venues.contains_key(&id)
    }

    pub fn id_by_name(&self, name: &str) -> Option<VenueId> {
        self.venues
            .values()
            .find(|v| v.name == name)
            .map(|v| v.id)
    }

    /// All venues, ascending id.
    pub fn venues(&self) -> impl Iterator<Item = &Venue> {
        self.venues.values()
    }

    pub fn names(&self) -> BTreeMap<VenueId, String> {
        self.venues
            .iter()
            .map(|(id, v)| (*id, v.name.clone()))
            .collect()
    }

    // ── Search ───────────────────────────────────────────────────

    /// Narrow the full id set by location, then kind, then the inclusive
    /// capacity range. Each step keeps the previous step's order, so results
    /// come back in ascending id.
    pub fn filter(&self, query: &VenueQuery) -> VenueSearch {
        let mut ids: Vec<VenueId> = self.venues.keys().copied().collect();
        if let CategoryFilter::Exactly(location) = &query.location {
            ids = intersect(&ids, self.location_index.get(location).map(Vec::as_slice).unwrap_or_default());
        }
        if let CategoryFilter::Exactly(kind) = &query.kind {
            ids = intersect(&ids, self.kind_index.get(kind).map(Vec::as_slice).unwrap_or_default());
        }

        let in_range: HashSet<VenueId> = if query.cap_min <= query.cap_max {
            self.capacity_index
                .range(query.cap_min, query.cap_max)
                .flat_map(|(_, ids)| ids.iter().copied())
                .collect()
        } else {
            HashSet::new()
        };
        ids.retain(|id| in_range.contains(id));

        let venues = ids
            .iter()
            .filter_map(|id| self.venues.get(id).cloned())
            .collect();
        VenueSearch { venues, order: ids }
    }

    /// Smallest and largest capacity across the catalog.
    pub fn capacity_bounds(&self) -> Result<(u32, u32), IndexError> {
        Ok((self.capacity_index.min()?, self.capacity_index.max()?))
    }

    pub fn kind_list(&self) -> Vec<String> {
        sorted_keys(&self.kind_index)
    }

    pub fn location_list(&self) -> Vec<String> {
        sorted_keys(&self.location_index)
    }
}

/// Elements of `a` that also occur in `b`, in `a`'s order.
fn intersect(a: &[VenueId], b: &[VenueId]) -> Vec<VenueId> {
    let keep: HashSet<VenueId> = b.iter().copied().collect();
    a.iter().copied().filter(|id| keep.contains(id)).collect()
}

fn sorted_keys(index: &HashMap<String, Vec<VenueId>>) -> Vec<String> {
    let mut keys: Vec<String> = index.keys().cloned().collect();
    keys.sort();
    keys
}

fn validate_venue(venue: &NewVenue) -> Result<(), EngineError> {
    if venue.name.trim().is_empty() {
        return Err(EngineError::LimitExceeded("venue name is empty"));
    }
    if venue.name.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("venue name too long"));
    }
    if venue.kind.len() > MAX_CATEGORY_LEN || venue.location.len() > MAX_CATEGORY_LEN {
        return Err(EngineError::LimitExceeded("category too long"));
    }
    if venue.kind == MATCH_ALL || venue.location == MATCH_ALL {
        return Err(EngineError::LimitExceeded("category collides with match-all sentinel"));
    }
    if venue.description.len() > MAX_DESCRIPTION_LEN {
        return Err(EngineError::LimitExceeded("description too long"));
    }
    Ok(())
}
