//! Property and concurrency tests for the political scoring pipeline.

use civitas_politics::{SUM_TOLERANCE, assess, assess_all};
use civitas_types::{
    Character, CharacterId, Faction, Gender, InfluencePools, PoliticalStats, RomanName, SimDate,
    SocialClass,
};
use proptest::prelude::*;

fn character(id: u64, stats: PoliticalStats, pools: InfluencePools) -> Character {
    let name = RomanName::new(Some("Marcus"), "Porcius", Some("Cato"), Gender::Male);
    let birth = SimDate::new(-290, 9, 14).unwrap();
    let mut character = Character::new(
        CharacterId::new(id),
        name,
        "Porcius",
        SocialClass::Plebeian,
        birth,
        42,
    );
    character.stats = stats;
    character.pools = pools;
    character
}

fn pool() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => -50.0_f64..500.0,
        1 => Just(0.0),
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

proptest! {
    #[test]
    fn affinity_is_a_distribution(
        stats in prop::array::uniform8(-40_i32..60),
        pools in prop::array::uniform4(pool()),
    ) {
        let [oratory, ambition, courage, dignitas, administration, judgment, strategy, civic] = stats;
        let stats = PoliticalStats {
            oratory, ambition, courage, dignitas, administration, judgment, strategy, civic,
        };
        let [senatorial, popular, military, family] = pools;
        let pools = InfluencePools { senatorial, popular, military, family };

        let assessment = assess(&character(1, stats, pools));
        let affinity = assessment.affinity;
        for (_, score) in affinity.iter() {
            prop_assert!(score.is_finite());
            prop_assert!(score >= 0.0);
        }
        prop_assert!((affinity.total() - 1.0).abs() <= SUM_TOLERANCE);

        let top = affinity.score(affinity.primary());
        for faction in Faction::ALL {
            prop_assert!(affinity.score(faction) <= top);
            if faction < affinity.primary() {
                prop_assert!(affinity.score(faction) < top);
            }
        }

        for lean in assessment.profile.leans() {
            prop_assert!((0.0..=1.0).contains(&lean));
        }
        for value in assessment.behavior.values() {
            prop_assert!(value.is_finite());
            prop_assert!((0.0..=1.0).contains(&value));
        }
        prop_assert!(assessment.behavior.assertiveness >= 0.5);
        let shares: f64 = assessment.behavior.power_base.shares().iter().sum();
        prop_assert!((shares - 1.0).abs() < 1e-9);
    }
}

#[test]
fn assessment_is_safe_to_share_across_threads() {
    let roster: Vec<Character> = (1_u32..=64)
        .map(|id| {
            let pools = InfluencePools {
                senatorial: f64::from(id % 7) * 10.0,
                popular: f64::from(id % 5) * 12.0,
                military: f64::from(id % 3) * 20.0,
                family: 5.0,
            };
            let stats = PoliticalStats::uniform(i32::try_from(id % 21).unwrap());
            character(u64::from(id), stats, pools)
        })
        .collect();

    let expected = assess_all(&roster);
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = roster
            .chunks(16)
            .map(|chunk| scope.spawn(move || assess_all(chunk)))
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });
    assert_eq!(results, expected);
}
