//! 敌人注册表：名字到构造器的映射、随机抽取与兜底。

use std::collections::HashMap;

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::utils::console_warn;

use super::{tier1, tier2, tier3, tier4, Dummy, Enemy};

pub type EnemyCtor = fn() -> Box<dyn Enemy>;

static STANDARD_ROSTER: Lazy<Vec<(&'static str, EnemyCtor)>> = Lazy::new(|| {
    vec![
        (tier1::RustRat::NAME, || Box::new(tier1::RustRat::new())),
        (tier1::FogImp::NAME, || Box::new(tier1::FogImp::new())),
        (tier1::SlothSlug::NAME, || Box::new(tier1::SlothSlug::new())),
        (tier1::Magpie::NAME, || Box::new(tier1::Magpie::new())),
        (tier1::DustSprite::NAME, || Box::new(tier1::DustSprite::new())),
        (tier1::TinkerGremlin::NAME, || Box::new(tier1::TinkerGremlin::new())),
        (tier1::PebbleGolem::NAME, || Box::new(tier1::PebbleGolem::new())),
        (tier1::EchoWisp::NAME, || Box::new(tier1::EchoWisp::new())),
        (tier2::AshenCrow::NAME, || Box::new(tier2::AshenCrow::new())),
        (tier2::CardWarden::NAME, || Box::new(tier2::CardWarden::new())),
        (tier2::PowderKeg::NAME, || Box::new(tier2::PowderKeg::new())),
        (tier2::GreyLeech::NAME, || Box::new(tier2::GreyLeech::new())),
        (tier2::MistWeaver::NAME, || Box::new(tier2::MistWeaver::new())),
        (tier2::GluttonousToad::NAME, || Box::new(tier2::GluttonousToad::new())),
        (tier2::HexMoth::NAME, || Box::new(tier2::HexMoth::new())),
        (tier2::ClockThief::NAME, || Box::new(tier2::ClockThief::new())),
        (tier3::BoneCollector::NAME, || Box::new(tier3::BoneCollector::new())),
        (tier3::StormHarpy::NAME, || Box::new(tier3::StormHarpy::new())),
        (tier3::PyreFiend::NAME, || Box::new(tier3::PyreFiend::new())),
        (tier3::NullSiren::NAME, || Box::new(tier3::NullSiren::new())),
        (tier3::GraveChill::NAME, || Box::new(tier3::GraveChill::new())),
        (tier3::PrismThief::NAME, || Box::new(tier3::PrismThief::new())),
        (tier3::RotShambler::NAME, || Box::new(tier3::RotShambler::new())),
        (tier3::ChronoWraith::NAME, || Box::new(tier3::ChronoWraith::new())),
        (tier4::DukeOfDuds::NAME, || Box::new(tier4::DukeOfDuds::new())),
        (tier4::QueenOfEmbers::NAME, || Box::new(tier4::QueenOfEmbers::new())),
        (tier4::HollowKing::NAME, || Box::new(tier4::HollowKing::new())),
        (tier4::MirrorEmpress::NAME, || Box::new(tier4::MirrorEmpress::new())),
        (tier4::VoidMaw::NAME, || Box::new(tier4::VoidMaw::new())),
        (tier4::GrandSaboteur::NAME, || Box::new(tier4::GrandSaboteur::new())),
    ]
});

/// 名字到构造器的映射。注册表是显式持有的值，
/// 不是进程级全局状态。
pub struct EnemyRegistry {
    constructors: HashMap<String, EnemyCtor>,
}

impl EnemyRegistry {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// 装入全部标准敌人。
    pub fn with_standard_enemies() -> Self {
        let mut registry = Self::new();
        for (name, ctor) in STANDARD_ROSTER.iter() {
            registry.constructors.insert((*name).to_string(), *ctor);
        }
        registry
    }

    /// 注册构造器。重名时后写的覆盖先写的，并发出非致命警告。
    pub fn register(&mut self, name: impl Into<String>, ctor: EnemyCtor) {
        let name = name.into();
        if self.constructors.insert(name.clone(), ctor).is_some() {
            console_warn(&format!("enemy '{name}' re-registered; last registration wins"));
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// 构造指定名字的敌人。未知名字退化为木桩，
    /// 绝不因为错误引用而中断游戏。
    pub fn create(&self, name: &str) -> Box<dyn Enemy> {
        match self.constructors.get(name) {
            Some(ctor) => ctor(),
            None => {
                console_warn(&format!("unknown enemy '{name}'; substituting a dummy"));
                Box::new(Dummy::new())
            }
        }
    }

    /// 抽取 `n` 个互不相同的敌人，先按名字剔除排除集；
    /// 候选不足时用木桩补齐，不报错也不少给。
    pub fn sample(&self, n: usize, exclude: &[&str], rng: &mut impl Rng) -> Vec<Box<dyn Enemy>> {
        let mut pool: Vec<&str> = self
            .constructors
            .keys()
            .map(String::as_str)
            .filter(|name| !exclude.contains(name))
            .collect();
        pool.sort_unstable();

        let mut picked: Vec<Box<dyn Enemy>> = pool
            .choose_multiple(rng, n)
            .map(|name| self.create(name))
            .collect();
        while picked.len() < n {
            picked.push(Box::new(Dummy::new()));
        }
        picked
    }
}

impl Default for EnemyRegistry {
    fn default() -> Self {
        Self::with_standard_enemies()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::stats::RoundStats;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn standard_registry_holds_the_full_roster() {
        let registry = EnemyRegistry::with_standard_enemies();
        assert_eq!(registry.len(), 30);
        assert!(registry.contains(tier1::RustRat::NAME));
        assert!(registry.contains(tier4::GrandSaboteur::NAME));
    }

    #[test]
    fn unknown_name_falls_back_to_a_dummy() {
        let registry = EnemyRegistry::with_standard_enemies();
        let enemy = registry.create("No Such Enemy");
        assert_eq!(enemy.meta().name, Dummy::NAME);
        let stats = RoundStats::new(100, 0, 0);
        assert!(enemy.check_defeat_condition(&stats), "dummy is always defeated");
    }

    #[test]
    fn re_registration_overwrites_quietly() {
        let mut registry = EnemyRegistry::new();
        registry.register("Rival", || Box::new(tier1::RustRat::new()));
        registry.register("Rival", || Box::new(tier1::EchoWisp::new()));
        assert_eq!(registry.len(), 1);
        let enemy = registry.create("Rival");
        assert_eq!(enemy.meta().name, tier1::EchoWisp::NAME, "last registration wins");
    }

    #[test]
    fn sample_returns_distinct_enemies() {
        let registry = EnemyRegistry::with_standard_enemies();
        let mut rng = SmallRng::seed_from_u64(1);
        let picked = registry.sample(5, &[], &mut rng);
        assert_eq!(picked.len(), 5);
        let mut names: Vec<_> = picked.iter().map(|e| e.meta().name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5, "sampled enemies must be distinct");
    }

    #[test]
    fn sample_filters_the_exclusion_set_before_drawing() {
        let mut registry = EnemyRegistry::new();
        registry.register(tier1::RustRat::NAME, || Box::new(tier1::RustRat::new()));
        registry.register(tier1::EchoWisp::NAME, || Box::new(tier1::EchoWisp::new()));

        let mut rng = SmallRng::seed_from_u64(2);
        let picked = registry.sample(1, &[tier1::RustRat::NAME], &mut rng);
        assert_eq!(picked[0].meta().name, tier1::EchoWisp::NAME);
    }

    #[test]
    fn sample_pads_with_dummies_when_the_pool_runs_short() {
        let mut registry = EnemyRegistry::new();
        registry.register(tier1::RustRat::NAME, || Box::new(tier1::RustRat::new()));

        let mut rng = SmallRng::seed_from_u64(3);
        let picked = registry.sample(3, &[tier1::RustRat::NAME], &mut rng);
        assert_eq!(picked.len(), 3, "never fewer than requested");
        assert!(picked.iter().all(|e| e.meta().name == Dummy::NAME));
    }
}
