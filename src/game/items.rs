use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeaponRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl FromStr for WeaponRarity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "common" => Ok(WeaponRarity::Common),
            "rare" => Ok(WeaponRarity::Rare),
            "epic" => Ok(WeaponRarity::Epic),
            "legendary" => Ok(WeaponRarity::Legendary),
            _ => Err(()),
        }
    }
}

/// 触发桥接效果的游戏事件类型。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type")]
pub enum BridgeTrigger {
    OnExplosion,
    OnHealthLost,
    OnGraceUsed,
    OnHintUsed,
    OnTripleCleared,
    OnBombDefused,
}

/// 桥接效果产生的次级效果种类，同时也是回合统计里
/// 去重计数使用的键。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type")]
pub enum WeaponEffectKind {
    GainGrace,
    GainHint,
    RestoreHealth,
    AddTime,
    ScoreBurst,
    ShieldDamage,
}

/// 武器携带的固定属性加成，全部为可选：缺省表示该武器
/// 不影响对应属性。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatEffects {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explosion_chance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_spread_chance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_chance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_bonus_chance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_bonus_chance: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CappedStat {
    ExplosionChance,
    FireSpreadChance,
    GraceChance,
    TimeBonusChance,
    PointBonusChance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapIncrease {
    pub stat: CappedStat,
    pub amount: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeEffectSpec {
    pub trigger: BridgeTrigger,
    /// 触发概率，0 到 100，含两端：0 永不触发，100 必定触发。
    pub chance: u32,
    pub effect: WeaponEffectKind,
    pub magnitude: i32,
    /// 同时存在的该效果数量上限，由外层在应用时裁剪。
    pub max_count: u32,
}

/// 可装备的武器。所有作用字段均为可选，缺省即无影响。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Weapon {
    pub name: String,
    pub rarity: WeaponRarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<StatEffects>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_increase: Option<CapIncrease>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_effect: Option<BridgeEffectSpec>,
}

impl Weapon {
    pub fn new(name: impl Into<String>, rarity: WeaponRarity) -> Self {
        Self {
            name: name.into(),
            rarity,
            effects: None,
            cap_increase: None,
            bridge_effect: None,
        }
    }

    pub fn with_effects(mut self, effects: StatEffects) -> Self {
        self.effects = Some(effects);
        self
    }

    pub fn with_cap_increase(mut self, stat: CappedStat, amount: u32) -> Self {
        self.cap_increase = Some(CapIncrease { stat, amount });
        self
    }

    pub fn with_bridge_effect(mut self, bridge_effect: BridgeEffectSpec) -> Self {
        self.bridge_effect = Some(bridge_effect);
        self
    }
}

/// 一次成功的桥接效果判定结果。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeActivation {
    pub effect: WeaponEffectKind,
    pub magnitude: i32,
    pub max_count: u32,
    pub source_item: String,
}

/// 解析一次桥接效果。`is_cascade` 为真时直接返回空结果，
/// 这是唯一的级联保护，必须先于任何过滤与掷骰检查。
pub fn resolve_bridge_effects(
    trigger: BridgeTrigger,
    items: &[Weapon],
    is_cascade: bool,
    rng: &mut impl Rng,
) -> Vec<BridgeActivation> {
    if is_cascade {
        return Vec::new();
    }

    let mut activations = Vec::new();
    for item in items {
        let Some(spec) = &item.bridge_effect else {
            continue;
        };
        if spec.trigger != trigger {
            continue;
        }
        // 每件装备独立掷骰，结果互不影响。
        let chance = spec.chance.min(100);
        let roll_hits = chance >= 100 || (chance > 0 && rng.gen_range(0..100) < chance);
        if roll_hits {
            activations.push(BridgeActivation {
                effect: spec.effect,
                magnitude: spec.magnitude,
                max_count: spec.max_count,
                source_item: item.name.clone(),
            });
        }
    }
    activations
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn bridge_weapon(name: &str, trigger: BridgeTrigger, chance: u32) -> Weapon {
        Weapon::new(name, WeaponRarity::Rare).with_bridge_effect(BridgeEffectSpec {
            trigger,
            chance,
            effect: WeaponEffectKind::GainGrace,
            magnitude: 1,
            max_count: 3,
        })
    }

    #[test]
    fn cascade_resolution_is_always_empty() {
        let items = vec![bridge_weapon("Ember Charm", BridgeTrigger::OnExplosion, 100)];
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let result = resolve_bridge_effects(BridgeTrigger::OnExplosion, &items, true, &mut rng);
            assert!(result.is_empty(), "cascade resolution must never fire");
        }
    }

    #[test]
    fn certain_chance_always_fires_exactly_once_per_item() {
        let items = vec![bridge_weapon("Ember Charm", BridgeTrigger::OnExplosion, 100)];
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..50 {
            let result = resolve_bridge_effects(BridgeTrigger::OnExplosion, &items, false, &mut rng);
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].source_item, "Ember Charm");
        }
    }

    #[test]
    fn zero_chance_never_fires() {
        let items = vec![bridge_weapon("Dull Charm", BridgeTrigger::OnExplosion, 0)];
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            let result = resolve_bridge_effects(BridgeTrigger::OnExplosion, &items, false, &mut rng);
            assert!(result.is_empty(), "zero chance must never fire");
        }
    }

    #[test]
    fn only_matching_triggers_roll() {
        let items = vec![
            bridge_weapon("Ember Charm", BridgeTrigger::OnExplosion, 100),
            bridge_weapon("Tear Vial", BridgeTrigger::OnGraceUsed, 100),
            Weapon::new("Plain Blade", WeaponRarity::Common),
        ];
        let mut rng = SmallRng::seed_from_u64(4);
        let result = resolve_bridge_effects(BridgeTrigger::OnGraceUsed, &items, false, &mut rng);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source_item, "Tear Vial");
    }

    #[test]
    fn items_roll_independently() {
        // 两件必中装备各贡献一个结果，彼此不影响。
        let items = vec![
            bridge_weapon("Charm A", BridgeTrigger::OnHealthLost, 100),
            bridge_weapon("Charm B", BridgeTrigger::OnHealthLost, 100),
            bridge_weapon("Charm C", BridgeTrigger::OnHealthLost, 0),
        ];
        let mut rng = SmallRng::seed_from_u64(5);
        let result = resolve_bridge_effects(BridgeTrigger::OnHealthLost, &items, false, &mut rng);
        let names: Vec<&str> = result.iter().map(|a| a.source_item.as_str()).collect();
        assert_eq!(names, vec!["Charm A", "Charm B"]);
    }

    #[test]
    fn partial_chance_fires_sometimes_over_many_trials() {
        let items = vec![bridge_weapon("Fickle Charm", BridgeTrigger::OnHintUsed, 50)];
        let mut rng = SmallRng::seed_from_u64(6);
        let mut fired = 0;
        for _ in 0..200 {
            fired +=
                resolve_bridge_effects(BridgeTrigger::OnHintUsed, &items, false, &mut rng).len();
        }
        assert!(fired > 50 && fired < 150, "50% chance should fire roughly half the time, got {fired}");
    }
}
