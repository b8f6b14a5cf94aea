use serde::{Deserialize, Serialize};

use super::items::{CappedStat, Weapon};

/// 玩家的概率类属性，单位均为百分点。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStats {
    #[serde(default)]
    pub explosion_chance: u32,
    #[serde(default)]
    pub fire_spread_chance: u32,
    #[serde(default)]
    pub grace_chance: u32,
    #[serde(default)]
    pub time_bonus_chance: u32,
    #[serde(default)]
    pub point_bonus_chance: u32,
}

impl PlayerStats {
    /// 基础属性叠加所有装备的固定加成。
    pub fn accumulate(base: &PlayerStats, items: &[Weapon]) -> PlayerStats {
        let mut acc = *base;
        for item in items {
            let Some(effects) = &item.effects else {
                continue;
            };
            acc.explosion_chance += effects.explosion_chance.unwrap_or(0);
            acc.fire_spread_chance += effects.fire_spread_chance.unwrap_or(0);
            acc.grace_chance += effects.grace_chance.unwrap_or(0);
            acc.time_bonus_chance += effects.time_bonus_chance.unwrap_or(0);
            acc.point_bonus_chance += effects.point_bonus_chance.unwrap_or(0);
        }
        acc
    }
}

/// 敌人施加的属性压制。每个字段缺省表示不压制，
/// 数值只用于界面展示，不参与计算。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnemyStatModifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explosion_reduction: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_spread_reduction: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_reduction: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_bonus_reduction: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_bonus_reduction: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_multiplier: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_multiplier: Option<f32>,
}

impl EnemyStatModifiers {
    pub fn is_neutral(&self) -> bool {
        self == &EnemyStatModifiers::default()
    }
}

// 压制固定保留三分之一（四舍五入），与压制数值无关；零保持为零。
fn suppress(value: u32) -> u32 {
    if value == 0 {
        0
    } else {
        (value + 1) / 3
    }
}

/// 对每个被压制的属性独立应用三分之一保留规则。
pub fn apply_suppression(
    stats: &PlayerStats,
    modifiers: Option<&EnemyStatModifiers>,
) -> PlayerStats {
    let Some(modifiers) = modifiers else {
        return *stats;
    };

    let mut result = *stats;
    if modifiers.explosion_reduction.is_some() {
        result.explosion_chance = suppress(result.explosion_chance);
    }
    if modifiers.fire_spread_reduction.is_some() {
        result.fire_spread_chance = suppress(result.fire_spread_chance);
    }
    if modifiers.grace_reduction.is_some() {
        result.grace_chance = suppress(result.grace_chance);
    }
    if modifiers.time_bonus_reduction.is_some() {
        result.time_bonus_chance = suppress(result.time_bonus_chance);
    }
    if modifiers.point_bonus_reduction.is_some() {
        result.point_bonus_chance = suppress(result.point_bonus_chance);
    }
    result
}

pub fn default_cap(stat: CappedStat) -> u32 {
    match stat {
        CappedStat::ExplosionChance => 25,
        CappedStat::FireSpreadChance => 20,
        CappedStat::GraceChance => 30,
        CappedStat::TimeBonusChance => 25,
        CappedStat::PointBonusChance => 40,
    }
}

/// 上限 = 默认值 + 所有匹配装备的增量之和。同名装备叠加。
pub fn resolve_cap(stat: CappedStat, items: &[Weapon]) -> u32 {
    let increase: u32 = items
        .iter()
        .filter_map(|item| item.cap_increase.as_ref())
        .filter(|cap| cap.stat == stat)
        .map(|cap| cap.amount)
        .sum();
    default_cap(stat) + increase
}

pub fn effective_value(accumulated: u32, cap: u32) -> u32 {
    accumulated.min(cap)
}

/// 完整的回合属性解析：叠加装备、按上限封顶、再施加敌人压制。
pub fn resolve_effective_stats(
    base: &PlayerStats,
    items: &[Weapon],
    modifiers: Option<&EnemyStatModifiers>,
) -> PlayerStats {
    let accumulated = PlayerStats::accumulate(base, items);
    let capped = PlayerStats {
        explosion_chance: effective_value(
            accumulated.explosion_chance,
            resolve_cap(CappedStat::ExplosionChance, items),
        ),
        fire_spread_chance: effective_value(
            accumulated.fire_spread_chance,
            resolve_cap(CappedStat::FireSpreadChance, items),
        ),
        grace_chance: effective_value(
            accumulated.grace_chance,
            resolve_cap(CappedStat::GraceChance, items),
        ),
        time_bonus_chance: effective_value(
            accumulated.time_bonus_chance,
            resolve_cap(CappedStat::TimeBonusChance, items),
        ),
        point_bonus_chance: effective_value(
            accumulated.point_bonus_chance,
            resolve_cap(CappedStat::PointBonusChance, items),
        ),
    };
    apply_suppression(&capped, modifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::items::{StatEffects, WeaponRarity};

    fn capped_weapon(name: &str, stat: CappedStat, amount: u32) -> Weapon {
        Weapon::new(name, WeaponRarity::Epic).with_cap_increase(stat, amount)
    }

    #[test]
    fn suppression_retains_one_third_regardless_of_magnitude() {
        let base = PlayerStats {
            explosion_chance: 40,
            ..PlayerStats::default()
        };
        let weak = EnemyStatModifiers {
            explosion_reduction: Some(5),
            ..EnemyStatModifiers::default()
        };
        let strong = EnemyStatModifiers {
            explosion_reduction: Some(95),
            ..EnemyStatModifiers::default()
        };

        // round(40 / 3) = 13，与压制数值无关。
        assert_eq!(apply_suppression(&base, Some(&weak)).explosion_chance, 13);
        assert_eq!(apply_suppression(&base, Some(&strong)).explosion_chance, 13);
    }

    #[test]
    fn suppression_of_zero_stays_zero() {
        let base = PlayerStats::default();
        let modifiers = EnemyStatModifiers {
            explosion_reduction: Some(15),
            grace_reduction: Some(15),
            ..EnemyStatModifiers::default()
        };
        let result = apply_suppression(&base, Some(&modifiers));
        assert_eq!(result.explosion_chance, 0, "suppression cannot create a capability");
        assert_eq!(result.grace_chance, 0);
    }

    #[test]
    fn suppression_leaves_unlisted_stats_untouched() {
        let base = PlayerStats {
            explosion_chance: 40,
            grace_chance: 30,
            time_bonus_chance: 10,
            ..PlayerStats::default()
        };
        let modifiers = EnemyStatModifiers {
            grace_reduction: Some(20),
            ..EnemyStatModifiers::default()
        };
        let result = apply_suppression(&base, Some(&modifiers));
        assert_eq!(result.explosion_chance, 40);
        assert_eq!(result.grace_chance, 10);
        assert_eq!(result.time_bonus_chance, 10);
    }

    #[test]
    fn no_enemy_passes_stats_through() {
        let base = PlayerStats {
            explosion_chance: 40,
            ..PlayerStats::default()
        };
        assert_eq!(apply_suppression(&base, None), base);
    }

    #[test]
    fn suppression_rounds_to_nearest() {
        let mut base = PlayerStats::default();
        let modifiers = EnemyStatModifiers {
            explosion_reduction: Some(10),
            ..EnemyStatModifiers::default()
        };
        for (value, expected) in [(1, 0), (2, 1), (4, 1), (5, 2), (50, 17)] {
            base.explosion_chance = value;
            assert_eq!(
                apply_suppression(&base, Some(&modifiers)).explosion_chance,
                expected,
                "round({value} / 3)"
            );
        }
    }

    #[test]
    fn cap_increases_stack_additively_across_duplicates() {
        let items = vec![
            capped_weapon("Lens", CappedStat::ExplosionChance, 5),
            capped_weapon("Lens", CappedStat::ExplosionChance, 5),
            capped_weapon("Prism", CappedStat::GraceChance, 10),
        ];
        assert_eq!(resolve_cap(CappedStat::ExplosionChance, &items), 35);
        assert_eq!(resolve_cap(CappedStat::GraceChance, &items), 40);
        assert_eq!(resolve_cap(CappedStat::FireSpreadChance, &items), 20);
    }

    #[test]
    fn effective_value_is_min_of_accumulated_and_cap() {
        assert_eq!(effective_value(60, 35), 35);
        assert_eq!(effective_value(20, 35), 20);
    }

    #[test]
    fn full_resolution_accumulates_caps_then_suppresses() {
        let base = PlayerStats {
            explosion_chance: 20,
            ..PlayerStats::default()
        };
        let items = vec![Weapon::new("Torch", WeaponRarity::Common).with_effects(StatEffects {
            explosion_chance: Some(30),
            ..StatEffects::default()
        })];

        // 20 + 30 = 50，封顶到 25。
        let unsuppressed = resolve_effective_stats(&base, &items, None);
        assert_eq!(unsuppressed.explosion_chance, 25);

        let modifiers = EnemyStatModifiers {
            explosion_reduction: Some(15),
            ..EnemyStatModifiers::default()
        };
        let suppressed = resolve_effective_stats(&base, &items, Some(&modifiers));
        assert_eq!(suppressed.explosion_chance, (25 + 1) / 3);
    }
}
