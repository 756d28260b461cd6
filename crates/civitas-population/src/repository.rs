//! Authoritative in-memory store of every character.
//!
//! [`CharacterRepository`] owns all [`Character`] records and keeps a set of
//! secondary indices in step with them. Every mutation goes through the
//! repository so the indices can never drift from the primary map:
//!
//! | Index | Membership |
//! |---|---|
//! | living | alive characters |
//! | dead | dead characters retained for history (`keep_dead`) |
//! | birthdate | every character, keyed by `(month, day)` |
//! | family, class | every character with a non-blank key |
//! | name, cognomen, branch, lineage | living characters with a non-blank key |
//!
//! All queries return records in ascending ID order. An index entry whose
//! ID is missing from the primary map is logged and skipped.

use std::collections::{BTreeMap, BTreeSet};

use civitas_types::{Character, CharacterId, SocialClass};

use crate::error::PopulationError;

type IdSet = BTreeSet<CharacterId>;

/// Normalise a free-text index key: trimmed, lowercased, `None` when blank.
pub fn normalize_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Lineage key combining family and branch.
fn lineage_key(family: &str, branch: &str) -> Option<String> {
    let family = normalize_key(family)?;
    let branch = normalize_key(branch)?;
    Some(format!("{family}/{branch}"))
}

/// Index keys derived from one record.
struct IndexKeys {
    birthdate: (u32, u32),
    family: Option<String>,
    class: SocialClass,
    name: Option<String>,
    cognomen: Option<String>,
    branch: Option<String>,
    lineage: Option<String>,
}

impl IndexKeys {
    fn of(character: &Character) -> Self {
        let branch = character.branch.as_deref().unwrap_or_default();
        Self {
            birthdate: (character.birth_month, character.birth_day),
            family: normalize_key(&character.family),
            class: character.social_class,
            name: normalize_key(&character.full_name()),
            cognomen: character.name.cognomen.as_deref().and_then(normalize_key),
            branch: normalize_key(branch),
            lineage: lineage_key(&character.family, branch),
        }
    }
}

/// A secondary index that disagrees with the primary map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexViolation {
    /// Character concerned.
    pub id: CharacterId,
    /// Name of the offending index.
    pub index: &'static str,
    /// What is wrong.
    pub problem: &'static str,
}

/// Authoritative collection of characters with secondary indices.
#[derive(Debug, Default, Clone)]
pub struct CharacterRepository {
    characters: BTreeMap<CharacterId, Character>,
    living: IdSet,
    dead: IdSet,
    by_birthdate: BTreeMap<(u32, u32), IdSet>,
    by_family: BTreeMap<String, IdSet>,
    by_class: BTreeMap<SocialClass, IdSet>,
    by_name: BTreeMap<String, IdSet>,
    by_cognomen: BTreeMap<String, IdSet>,
    by_branch: BTreeMap<String, IdSet>,
    by_lineage: BTreeMap<String, IdSet>,
}

impl CharacterRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Insert or replace a character by ID.
    ///
    /// A replaced record has all of its index entries removed first. The
    /// record joins the living index if alive, otherwise the dead index when
    /// `keep_dead` is set.
    pub fn add(&mut self, character: Character, keep_dead: bool) {
        if let Some(previous) = self.characters.remove(&character.id) {
            self.unindex(&previous);
        }
        self.index(&character, keep_dead);
        self.characters.insert(character.id, character);
    }

    /// Apply `mutate` to a stored character and re-index it.
    ///
    /// The closure must not change the record's `id` or `is_alive` flag;
    /// deaths go through [`CharacterRepository::mark_dead`]. Both fields are
    /// restored after the closure runs, and a changed `id` fails the call.
    pub fn modify<F, T>(&mut self, id: CharacterId, mutate: F) -> Result<T, PopulationError>
    where
        F: FnOnce(&mut Character) -> T,
    {
        let mut record = self
            .characters
            .remove(&id)
            .ok_or(PopulationError::CharacterNotFound(id))?;
        let retained_dead = self.dead.contains(&id);
        let was_alive = record.is_alive;
        self.unindex(&record);

        let output = mutate(&mut record);

        let found = record.id;
        record.id = id;
        record.is_alive = was_alive;
        self.index(&record, retained_dead);
        self.characters.insert(id, record);

        if found != id {
            return Err(PopulationError::IdentityChanged {
                expected: id,
                found,
            });
        }
        Ok(output)
    }

    /// Increment the age of every living character born on `(month, day)`.
    ///
    /// Returns the IDs aged, in ascending order.
    pub fn age_up_birthdays(&mut self, month: u32, day: u32) -> Vec<CharacterId> {
        let Some(ids) = self.by_birthdate.get(&(month, day)) else {
            return Vec::new();
        };
        let mut aged = Vec::new();
        for id in ids {
            match self.characters.get_mut(id) {
                Some(character) if character.is_alive => {
                    character.age = character.age.saturating_add(1);
                    aged.push(*id);
                }
                Some(_) => {}
                None => {
                    tracing::warn!(%id, index = "birthdate", "Stale index entry skipped");
                }
            }
        }
        aged
    }

    /// Mark a living character dead.
    ///
    /// Removes the record from the living and name indices and keeps it in
    /// the dead index when `keep_dead` is set. Returns `None` if the ID is
    /// unknown or the character is already dead.
    pub fn mark_dead(&mut self, id: CharacterId, keep_dead: bool) -> Option<&Character> {
        let character = self.characters.get_mut(&id)?;
        if !character.is_alive {
            return None;
        }
        character.is_alive = false;
        let keys = IndexKeys::of(character);

        self.living.remove(&id);
        remove_key(&mut self.by_name, keys.name.as_ref(), id);
        remove_key(&mut self.by_cognomen, keys.cognomen.as_ref(), id);
        remove_key(&mut self.by_branch, keys.branch.as_ref(), id);
        remove_key(&mut self.by_lineage, keys.lineage.as_ref(), id);
        if keep_dead {
            self.dead.insert(id);
        }
        self.characters.get(&id)
    }

    /// Reset living and dead membership in bulk and rebuild the name indices.
    ///
    /// Used when restoring persisted state. A character listed in
    /// `alive_ids` is made alive; one listed only in `dead_ids` is made dead
    /// and retained when `keep_dead` is set; a character in neither set was
    /// dead and not retained. Listed IDs unknown to the store are logged
    /// and ignored. Returns the number of unknown IDs.
    pub fn apply_life_state(
        &mut self,
        alive_ids: &BTreeSet<CharacterId>,
        dead_ids: &BTreeSet<CharacterId>,
        keep_dead: bool,
    ) -> usize {
        let mut unknown = 0_usize;
        for id in alive_ids.iter().chain(dead_ids) {
            if !self.characters.contains_key(id) {
                tracing::warn!(%id, "Life state references unknown character");
                unknown = unknown.saturating_add(1);
            }
        }
        for id in alive_ids.intersection(dead_ids) {
            tracing::warn!(%id, "Character listed as both alive and dead; treating as alive");
        }

        self.living.clear();
        self.dead.clear();
        self.by_name.clear();
        self.by_cognomen.clear();
        self.by_branch.clear();
        self.by_lineage.clear();

        for (id, character) in &mut self.characters {
            if alive_ids.contains(id) {
                character.is_alive = true;
                self.living.insert(*id);
            } else {
                character.is_alive = false;
                if keep_dead && dead_ids.contains(id) {
                    self.dead.insert(*id);
                }
            }
        }

        let living: Vec<CharacterId> = self.living.iter().copied().collect();
        for id in living {
            if let Some(character) = self.characters.get(&id) {
                let keys = IndexKeys::of(character);
                insert_key(&mut self.by_name, keys.name, id);
                insert_key(&mut self.by_cognomen, keys.cognomen, id);
                insert_key(&mut self.by_branch, keys.branch, id);
                insert_key(&mut self.by_lineage, keys.lineage, id);
            }
        }
        unknown
    }

    /// Drop every record and every index.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Look up a character by ID.
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Whether a record with this ID exists.
    pub fn contains(&self, id: CharacterId) -> bool {
        self.characters.contains_key(&id)
    }

    /// Every stored record, living or dead, in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Whether the repository is empty.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Number of living characters.
    pub fn living_count(&self) -> usize {
        self.living.len()
    }

    /// IDs of living characters in ascending order.
    pub fn living_ids(&self) -> Vec<CharacterId> {
        self.living.iter().copied().collect()
    }

    /// IDs retained in the dead index in ascending order.
    pub fn dead_ids(&self) -> Vec<CharacterId> {
        self.dead.iter().copied().collect()
    }

    /// All living characters.
    pub fn get_all_living(&self) -> Vec<&Character> {
        self.resolve(&self.living, "living")
    }

    /// Dead characters retained for history.
    pub fn get_dead(&self) -> Vec<&Character> {
        self.resolve(&self.dead, "dead")
    }

    /// Characters of a family (gens), living or dead.
    pub fn get_by_family(&self, family: &str) -> Vec<&Character> {
        self.resolve_keyed(&self.by_family, family, "family")
    }

    /// Characters of a social class, living or dead.
    pub fn get_by_class(&self, class: SocialClass) -> Vec<&Character> {
        self.by_class
            .get(&class)
            .map(|ids| self.resolve(ids, "class"))
            .unwrap_or_default()
    }

    /// Living characters whose full name matches, case-insensitively.
    pub fn get_by_name(&self, name: &str) -> Vec<&Character> {
        self.resolve_keyed(&self.by_name, name, "name")
    }

    /// Living characters with the given cognomen.
    pub fn get_by_cognomen(&self, cognomen: &str) -> Vec<&Character> {
        self.resolve_keyed(&self.by_cognomen, cognomen, "cognomen")
    }

    /// Living characters of a family branch.
    pub fn get_by_branch(&self, branch: &str) -> Vec<&Character> {
        self.resolve_keyed(&self.by_branch, branch, "branch")
    }

    /// Living characters of a lineage (family plus branch).
    pub fn get_by_lineage(&self, family: &str, branch: &str) -> Vec<&Character> {
        lineage_key(family, branch)
            .and_then(|key| self.by_lineage.get(&key))
            .map(|ids| self.resolve(ids, "lineage"))
            .unwrap_or_default()
    }

    /// Compare every secondary index against the primary map.
    ///
    /// Returns every disagreement found; an empty result means the indices
    /// are consistent.
    pub fn audit_indices(&self) -> Vec<IndexViolation> {
        let mut violations = Vec::new();
        let mut report = |id, index, problem| {
            violations.push(IndexViolation { id, index, problem });
        };

        for (id, character) in &self.characters {
            let keys = IndexKeys::of(character);
            if character.is_alive != self.living.contains(id) {
                report(*id, "living", "membership disagrees with alive flag");
            }
            if character.is_alive && self.dead.contains(id) {
                report(*id, "dead", "living character in dead index");
            }
            if !contains(&self.by_birthdate, Some(&keys.birthdate), *id) {
                report(*id, "birthdate", "missing entry");
            }
            if keys.family.is_some() && !contains(&self.by_family, keys.family.as_ref(), *id) {
                report(*id, "family", "missing entry");
            }
            if !contains(&self.by_class, Some(&keys.class), *id) {
                report(*id, "class", "missing entry");
            }
            let named = [
                ("name", &self.by_name, keys.name.as_ref()),
                ("cognomen", &self.by_cognomen, keys.cognomen.as_ref()),
                ("branch", &self.by_branch, keys.branch.as_ref()),
                ("lineage", &self.by_lineage, keys.lineage.as_ref()),
            ];
            for (index, map, key) in named {
                let expected = character.is_alive && key.is_some();
                let present = map.values().any(|ids| ids.contains(id));
                if expected != present || (present && !contains(map, key, *id)) {
                    report(*id, index, "membership disagrees with liveness or key");
                }
            }
        }

        let all_indexed = self
            .living
            .iter()
            .chain(&self.dead)
            .chain(self.by_birthdate.values().flatten())
            .chain(self.by_family.values().flatten())
            .chain(self.by_class.values().flatten())
            .chain(self.by_name.values().flatten())
            .chain(self.by_cognomen.values().flatten())
            .chain(self.by_branch.values().flatten())
            .chain(self.by_lineage.values().flatten());
        for id in all_indexed {
            if !self.characters.contains_key(id) {
                report(*id, "any", "references missing record");
            }
        }
        violations
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn index(&mut self, character: &Character, keep_dead: bool) {
        let id = character.id;
        let keys = IndexKeys::of(character);

        if character.is_alive {
            self.living.insert(id);
            insert_key(&mut self.by_name, keys.name, id);
            insert_key(&mut self.by_cognomen, keys.cognomen, id);
            insert_key(&mut self.by_branch, keys.branch, id);
            insert_key(&mut self.by_lineage, keys.lineage, id);
        } else if keep_dead {
            self.dead.insert(id);
        }
        insert_key(&mut self.by_birthdate, Some(keys.birthdate), id);
        insert_key(&mut self.by_family, keys.family, id);
        insert_key(&mut self.by_class, Some(keys.class), id);
    }

    fn unindex(&mut self, character: &Character) {
        let id = character.id;
        let keys = IndexKeys::of(character);

        self.living.remove(&id);
        self.dead.remove(&id);
        remove_key(&mut self.by_birthdate, Some(&keys.birthdate), id);
        remove_key(&mut self.by_family, keys.family.as_ref(), id);
        remove_key(&mut self.by_class, Some(&keys.class), id);
        remove_key(&mut self.by_name, keys.name.as_ref(), id);
        remove_key(&mut self.by_cognomen, keys.cognomen.as_ref(), id);
        remove_key(&mut self.by_branch, keys.branch.as_ref(), id);
        remove_key(&mut self.by_lineage, keys.lineage.as_ref(), id);
    }

    fn resolve_keyed(
        &self,
        map: &BTreeMap<String, IdSet>,
        raw_key: &str,
        index: &'static str,
    ) -> Vec<&Character> {
        normalize_key(raw_key)
            .and_then(|key| map.get(&key))
            .map(|ids| self.resolve(ids, index))
            .unwrap_or_default()
    }

    fn resolve(&self, ids: &IdSet, index: &'static str) -> Vec<&Character> {
        ids.iter()
            .filter_map(|id| {
                let found = self.characters.get(id);
                if found.is_none() {
                    tracing::warn!(%id, index, "Stale index entry skipped");
                }
                found
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn inject_stale_family_entry(&mut self, family: &str, id: CharacterId) {
        insert_key(&mut self.by_family, normalize_key(family), id);
    }
}

fn insert_key<K: Ord>(map: &mut BTreeMap<K, IdSet>, key: Option<K>, id: CharacterId) {
    if let Some(key) = key {
        map.entry(key).or_default().insert(id);
    }
}

fn remove_key<K: Ord>(map: &mut BTreeMap<K, IdSet>, key: Option<&K>, id: CharacterId) {
    let Some(key) = key else {
        return;
    };
    if let Some(ids) = map.get_mut(key) {
        ids.remove(&id);
        if ids.is_empty() {
            map.remove(key);
        }
    }
}

fn contains<K: Ord>(map: &BTreeMap<K, IdSet>, key: Option<&K>, id: CharacterId) -> bool {
    key.and_then(|key| map.get(key))
        .is_some_and(|ids| ids.contains(&id))
}
