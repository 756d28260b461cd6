//! Character validation in strict or normalizing mode.
//!
//! Deciding what is wrong is separated from reporting it: findings are
//! pushed into an [`IssueSink`], and only [`ValidationMode::Normalize`]
//! applies corrections. Strict mode reads the record and nothing else. Name
//! repairs draw from a generator seeded per character, so neither mode
//! touches the random sources that drive the simulation.

use civitas_types::{AmbitionProfile, Character, CharacterId, SimDate, days_in_month, sanitize_pool};

use crate::naming::NamingRules;
use crate::repository::CharacterRepository;
use crate::rng::SeededRng;

/// How a validation pass treats the records it inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Report issues; change nothing.
    Strict,
    /// Report issues and fix everything that has an unambiguous fix.
    Normalize,
}

/// Category of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueKind {
    /// A political attribute outside `[0, 20]`.
    StatOutOfRange,
    /// An influence pool that is negative, NaN, or infinite.
    InvalidInfluence,
    /// Ambition intensity above 100.
    IntensityOutOfRange,
    /// A trait record with level 0, bad experience, or a blank tag.
    InvalidTraitRecord,
    /// An office term ending before it started.
    OfficeHistoryInverted,
    /// Birth month or day outside the calendar.
    InvalidBirthDate,
    /// Missing or gender-mismatched name parts.
    NameIncomplete,
    /// The character is listed as its own relative.
    SelfReference,
}

/// One finding about one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Character concerned.
    pub id: CharacterId,
    /// Category.
    pub kind: IssueKind,
    /// Human-readable detail.
    pub detail: String,
    /// Whether the pass corrected it.
    pub corrected: bool,
}

/// Receiver of validation findings.
pub trait IssueSink {
    /// Accept one finding.
    fn report(&mut self, issue: ValidationIssue);
}

impl IssueSink for Vec<ValidationIssue> {
    fn report(&mut self, issue: ValidationIssue) {
        self.push(issue);
    }
}

/// Totals for one validation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Records inspected.
    pub checked: usize,
    /// Findings reported.
    pub issues: usize,
    /// Findings corrected.
    pub corrected: usize,
}

/// Checks and repairs character records.
pub struct CharacterValidator<'a> {
    naming: &'a dyn NamingRules,
    seed: u64,
}

impl<'a> CharacterValidator<'a> {
    /// Create a validator. `seed` feeds the per-character name generators.
    pub fn new(naming: &'a dyn NamingRules, seed: u64) -> Self {
        Self { naming, seed }
    }

    /// Report every issue on `character` without changing it.
    pub fn check(&self, character: &Character, sink: &mut dyn IssueSink) -> usize {
        let mut scratch = character.clone();
        self.inspect(&mut scratch, ValidationMode::Strict, sink)
    }

    /// Report and correct every fixable issue on `character`.
    pub fn normalize(&self, character: &mut Character, sink: &mut dyn IssueSink) -> usize {
        self.inspect(character, ValidationMode::Normalize, sink)
    }

    /// Validate every stored record, living or dead.
    ///
    /// In normalize mode the corrections go through the repository so its
    /// indices follow any repaired name, and a batched summary is logged.
    pub fn validate_repository(
        &self,
        repository: &mut CharacterRepository,
        mode: ValidationMode,
        sink: &mut dyn IssueSink,
    ) -> ValidationReport {
        let mut collected: Vec<ValidationIssue> = Vec::new();
        let ids: Vec<CharacterId> = repository.iter().map(|character| character.id).collect();
        for id in &ids {
            match mode {
                ValidationMode::Strict => {
                    if let Some(character) = repository.get(*id) {
                        self.check(character, &mut collected);
                    }
                }
                ValidationMode::Normalize => {
                    let outcome =
                        repository.modify(*id, |character| self.normalize(character, &mut collected));
                    if let Err(err) = outcome {
                        tracing::warn!(%id, error = %err, "Skipped record during normalization");
                    }
                }
            }
        }

        let report = ValidationReport {
            checked: ids.len(),
            issues: collected.len(),
            corrected: collected.iter().filter(|issue| issue.corrected).count(),
        };
        for issue in &collected {
            tracing::debug!(
                id = %issue.id,
                kind = ?issue.kind,
                corrected = issue.corrected,
                "{}",
                issue.detail
            );
        }
        if report.issues > 0 {
            tracing::warn!(
                checked = report.checked,
                issues = report.issues,
                corrected = report.corrected,
                ?mode,
                "Character validation found issues"
            );
        }
        for issue in collected {
            sink.report(issue);
        }
        report
    }

    fn inspect(
        &self,
        character: &mut Character,
        mode: ValidationMode,
        sink: &mut dyn IssueSink,
    ) -> usize {
        let fix = mode == ValidationMode::Normalize;
        let id = character.id;
        let mut count = 0_usize;
        let mut emit = |kind, detail: String, corrected: bool| {
            count = count.saturating_add(1);
            sink.report(ValidationIssue {
                id,
                kind,
                detail,
                corrected,
            });
        };

        if !character.stats.is_within_bounds() {
            emit(
                IssueKind::StatOutOfRange,
                format!("stats {:?} outside [0, 20]", character.stats.values()),
                fix,
            );
            if fix {
                character.stats = character.stats.clamped();
            }
        }

        if !character.pools.is_sane() {
            emit(
                IssueKind::InvalidInfluence,
                format!("influence pools {:?} not finite and non-negative", character.pools),
                fix,
            );
            if fix {
                character.pools = character.pools.sanitized();
            }
        }

        if character.ambition.intensity > AmbitionProfile::MAX_INTENSITY {
            emit(
                IssueKind::IntensityOutOfRange,
                format!("intensity {} above 100", character.ambition.intensity),
                fix,
            );
            if fix {
                character.ambition.intensity = AmbitionProfile::MAX_INTENSITY;
            }
        }

        for record in &character.trait_records {
            let bad_experience = !record.experience.is_finite() || record.experience < 0.0;
            if record.level == 0 || bad_experience || record.tag.trim().is_empty() {
                emit(
                    IssueKind::InvalidTraitRecord,
                    format!(
                        "trait '{}' has level {} and experience {}",
                        record.tag, record.level, record.experience
                    ),
                    fix,
                );
            }
        }
        if fix {
            character.trait_records.retain(|record| !record.tag.trim().is_empty());
            for record in &mut character.trait_records {
                record.level = record.level.max(1);
                record.experience = sanitize_pool(record.experience);
            }
        }

        for entry in &mut character.office_history {
            if !entry.is_consistent() {
                emit(
                    IssueKind::OfficeHistoryInverted,
                    format!(
                        "office '{}' ends {:?} before it starts {}",
                        entry.office_id, entry.end_year, entry.start_year
                    ),
                    fix,
                );
                if fix {
                    entry.end_year = Some(entry.start_year);
                }
            }
        }

        if SimDate::new(character.birth_year, character.birth_month, character.birth_day).is_none()
        {
            emit(
                IssueKind::InvalidBirthDate,
                format!(
                    "birth date {}-{}-{} is not on the calendar",
                    character.birth_year, character.birth_month, character.birth_day
                ),
                fix,
            );
            if fix {
                character.birth_month = character.birth_month.clamp(1, 12);
                let length = days_in_month(character.birth_month).unwrap_or(28);
                character.birth_day = character.birth_day.clamp(1, length);
            }
        }

        let mut name_rng = SeededRng::from_seed(SeededRng::derived_seed(self.seed, id.into_inner()));
        if let Some(repaired) = self.naming.repair(
            &character.name,
            &character.family,
            character.gender,
            &mut name_rng,
        ) {
            emit(
                IssueKind::NameIncomplete,
                format!("name '{}' repaired to '{}'", character.name.full_name(), repaired.full_name()),
                fix,
            );
            if fix {
                character.name = repaired;
            }
        }

        let relations = [
            ("father", character.father_id),
            ("mother", character.mother_id),
            ("spouse", character.spouse_id),
            ("sibling", character.sibling_id),
        ];
        for (relation, related) in relations {
            if related == Some(id) {
                emit(
                    IssueKind::SelfReference,
                    format!("listed as own {relation}"),
                    false,
                );
            }
        }

        count
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civitas_types::{
        Gender, InfluencePools, OfficeHistoryEntry, RomanName, SocialClass, TraitRecord,
    };

    use super::*;
    use crate::naming::RomanNamingRules;

    fn damaged() -> Character {
        let name = RomanName::new(None, "", None, Gender::Male);
        let birth = SimDate::new(-280, 4, 4).unwrap();
        let mut character = Character::new(
            CharacterId::new(8),
            name,
            "Papirius",
            SocialClass::Patrician,
            birth,
            32,
        );
        character.stats.oratory = 31;
        character.stats.courage = -2;
        character.pools = InfluencePools {
            senatorial: f64::NAN,
            popular: -1.0,
            military: 3.0,
            family: f64::INFINITY,
        };
        character.ambition.intensity = 140;
        character.trait_records = vec![
            TraitRecord {
                tag: "Energetic".to_owned(),
                level: 0,
                experience: -3.0,
                acquired_year: -260,
            },
            TraitRecord::new("  ", -260),
        ];
        character.office_history = vec![OfficeHistoryEntry {
            office_id: "praetor".to_owned(),
            seat_index: 0,
            start_year: -250,
            end_year: Some(-252),
            notes: String::new(),
        }];
        character.birth_day = 40;
        character.father_id = Some(character.id);
        character
    }

    /// Bit-exact fingerprint; `PartialEq` on `f64` cannot see a NaN survive.
    fn fingerprint(character: &Character) -> (String, [u64; 4]) {
        let pools = &character.pools;
        (
            format!("{character:?}"),
            [
                pools.senatorial.to_bits(),
                pools.popular.to_bits(),
                pools.military.to_bits(),
                pools.family.to_bits(),
            ],
        )
    }

    #[test]
    fn strict_reports_without_mutation() {
        let character = damaged();
        let before = fingerprint(&character);
        let validator = CharacterValidator::new(&RomanNamingRules, 1);
        let mut issues = Vec::new();

        let count = validator.check(&character, &mut issues);

        assert!(character.pools.senatorial.is_nan());
        assert_eq!(fingerprint(&character), before);
        assert_eq!(count, issues.len());
        assert!(issues.iter().all(|issue| !issue.corrected));
        let kinds: Vec<IssueKind> = issues.iter().map(|issue| issue.kind).collect();
        for kind in [
            IssueKind::StatOutOfRange,
            IssueKind::InvalidInfluence,
            IssueKind::IntensityOutOfRange,
            IssueKind::InvalidTraitRecord,
            IssueKind::OfficeHistoryInverted,
            IssueKind::InvalidBirthDate,
            IssueKind::NameIncomplete,
            IssueKind::SelfReference,
        ] {
            assert!(kinds.contains(&kind), "missing {kind:?}");
        }
    }

    #[test]
    fn normalize_fixes_everything_but_self_reference() {
        let mut character = damaged();
        let validator = CharacterValidator::new(&RomanNamingRules, 1);
        let mut issues = Vec::new();
        validator.normalize(&mut character, &mut issues);

        assert!(character.stats.is_within_bounds());
        assert!(character.pools.is_sane());
        assert_eq!(character.ambition.intensity, 100);
        assert_eq!(character.trait_records.len(), 1);
        assert_eq!(character.trait_records[0].level, 1);
        assert!(character.trait_records[0].experience.abs() < f64::EPSILON);
        assert!(character.office_history[0].is_consistent());
        assert_eq!(character.birth_day, 30);
        assert_eq!(character.name.nomen, "Papirius");
        assert!(character.name.praenomen.is_some());
        assert_eq!(character.father_id, Some(character.id));

        let self_ref = issues
            .iter()
            .find(|issue| issue.kind == IssueKind::SelfReference)
            .unwrap();
        assert!(!self_ref.corrected);

        let mut again = Vec::new();
        validator.normalize(&mut character, &mut again);
        assert!(again.iter().all(|issue| issue.kind == IssueKind::SelfReference));
    }

    #[test]
    fn name_repair_is_reproducible_per_character() {
        let validator = CharacterValidator::new(&RomanNamingRules, 99);
        let mut first = damaged();
        let mut second = damaged();
        validator.normalize(&mut first, &mut Vec::new());
        validator.normalize(&mut second, &mut Vec::new());
        assert_eq!(first.name, second.name);
    }

    #[test]
    fn repository_normalization_reindexes_names() {
        let mut repo = CharacterRepository::new();
        let mut character = damaged();
        character.father_id = None;
        repo.add(character, true);
        let validator = CharacterValidator::new(&RomanNamingRules, 5);

        let strict = validator.validate_repository(&mut repo, ValidationMode::Strict, &mut Vec::new());
        assert!(strict.issues > 0);
        assert_eq!(strict.corrected, 0);

        let report =
            validator.validate_repository(&mut repo, ValidationMode::Normalize, &mut Vec::new());
        assert_eq!(report.issues, report.corrected);
        let name = repo.get(CharacterId::new(8)).unwrap().full_name();
        assert_eq!(repo.get_by_name(&name).len(), 1);
        assert!(repo.audit_indices().is_empty());
    }
}
