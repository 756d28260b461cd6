//! Kinship queries over the repository.
//!
//! Relationship fields on a character are plain IDs. [`FamilyLookup`]
//! resolves them through the repository and answers grouped questions
//! (children, siblings, living relatives) without owning anything.

use civitas_types::{Character, CharacterId};

use crate::repository::CharacterRepository;

/// Read-only kinship view of a repository.
#[derive(Debug, Clone, Copy)]
pub struct FamilyLookup<'a> {
    repository: &'a CharacterRepository,
}

impl<'a> FamilyLookup<'a> {
    /// Wrap a repository.
    pub const fn new(repository: &'a CharacterRepository) -> Self {
        Self { repository }
    }

    /// The recorded spouse, if present in the store.
    pub fn spouse_of(&self, id: CharacterId) -> Option<&'a Character> {
        let spouse = self.repository.get(id)?.spouse_id?;
        self.repository.get(spouse)
    }

    /// Father and mother, each if present in the store.
    pub fn parents_of(&self, id: CharacterId) -> (Option<&'a Character>, Option<&'a Character>) {
        let Some(character) = self.repository.get(id) else {
            return (None, None);
        };
        (
            character.father_id.and_then(|father| self.repository.get(father)),
            character.mother_id.and_then(|mother| self.repository.get(mother)),
        )
    }

    /// Every character naming `id` as father or mother, in ID order.
    pub fn children_of(&self, id: CharacterId) -> Vec<&'a Character> {
        self.repository
            .iter()
            .filter(|child| child.father_id == Some(id) || child.mother_id == Some(id))
            .collect()
    }

    /// Characters sharing a parent with `id`, or linked to it as sibling,
    /// in ID order. The character itself is excluded.
    pub fn siblings_of(&self, id: CharacterId) -> Vec<&'a Character> {
        let Some(character) = self.repository.get(id) else {
            return Vec::new();
        };
        let shares = |a: Option<CharacterId>, b: Option<CharacterId>| a.is_some() && a == b;
        self.repository
            .iter()
            .filter(|other| other.id != id)
            .filter(|other| {
                shares(other.father_id, character.father_id)
                    || shares(other.mother_id, character.mother_id)
                    || other.sibling_id == Some(id)
                    || character.sibling_id == Some(other.id)
            })
            .collect()
    }

    /// The most recently born living child of `parent`, if any.
    pub fn youngest_living_child(&self, parent: CharacterId) -> Option<&'a Character> {
        self.children_of(parent)
            .into_iter()
            .filter(|child| child.is_alive)
            .max_by_key(|child| (child.birth_year, child.birth_month, child.birth_day, child.id))
    }

    /// Living members of a family (gens), in ID order.
    pub fn living_family_members(&self, family: &str) -> Vec<&'a Character> {
        self.repository
            .get_by_family(family)
            .into_iter()
            .filter(|member| member.is_alive)
            .collect()
    }

    /// Living members of one branch of a family, in ID order.
    pub fn lineage_members(&self, family: &str, branch: &str) -> Vec<&'a Character> {
        self.repository.get_by_lineage(family, branch)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civitas_types::{Gender, RomanName, SimDate, SocialClass};

    use super::*;

    fn member(id: u64, gender: Gender, birth_year: i32) -> Character {
        let name = RomanName::new(None, "Claudius", Some("Pulcher"), gender);
        let birth = SimDate::new(birth_year, 6, 1).unwrap();
        let mut character = Character::new(
            CharacterId::new(id),
            name,
            "Claudius",
            SocialClass::Patrician,
            birth,
            0,
        );
        character.branch = Some("Pulcher".to_owned());
        character
    }

    fn household() -> CharacterRepository {
        let mut repo = CharacterRepository::new();
        let mut father = member(1, Gender::Male, -287);
        let mut mother = member(2, Gender::Female, -291);
        father.spouse_id = Some(CharacterId::new(2));
        mother.spouse_id = Some(CharacterId::new(1));
        repo.add(father, true);
        repo.add(mother, true);
        for (id, year) in [(3, -269), (4, -267), (5, -264)] {
            let mut child = member(id, Gender::Male, year);
            child.father_id = Some(CharacterId::new(1));
            child.mother_id = Some(CharacterId::new(2));
            repo.add(child, true);
        }
        repo
    }

    #[test]
    fn resolves_spouse_and_parents() {
        let repo = household();
        let family = FamilyLookup::new(&repo);
        assert_eq!(family.spouse_of(CharacterId::new(1)).map(|c| c.id), Some(CharacterId::new(2)));
        let (father, mother) = family.parents_of(CharacterId::new(4));
        assert_eq!(father.map(|c| c.id), Some(CharacterId::new(1)));
        assert_eq!(mother.map(|c| c.id), Some(CharacterId::new(2)));
        assert_eq!(family.parents_of(CharacterId::new(1)), (None, None));
    }

    #[test]
    fn children_and_siblings() {
        let mut repo = household();
        let family = FamilyLookup::new(&repo);
        let children: Vec<u64> = family
            .children_of(CharacterId::new(2))
            .iter()
            .map(|c| c.id.into_inner())
            .collect();
        assert_eq!(children, vec![3, 4, 5]);

        let siblings: Vec<u64> = family
            .siblings_of(CharacterId::new(4))
            .iter()
            .map(|c| c.id.into_inner())
            .collect();
        assert_eq!(siblings, vec![3, 5]);

        assert_eq!(
            family.youngest_living_child(CharacterId::new(1)).map(|c| c.id),
            Some(CharacterId::new(5))
        );
        repo.mark_dead(CharacterId::new(5), true);
        let family = FamilyLookup::new(&repo);
        assert_eq!(
            family.youngest_living_child(CharacterId::new(1)).map(|c| c.id),
            Some(CharacterId::new(4))
        );
        assert_eq!(family.living_family_members("Claudius").len(), 4);
        assert_eq!(family.lineage_members("Claudius", "Pulcher").len(), 4);
    }
}
