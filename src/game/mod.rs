//! 冒险模式核心逻辑模块（敌人契约、回合统计、效果解析等）。

pub mod card;
pub mod enemy;
pub mod items;
pub mod modifiers;
pub mod stats;

pub use card::{
    Card,
    CardChange,
    CardColor,
    CardId,
    CardModification,
    CardShading,
    CardShape,
    ALL_COLORS,
    ALL_SHAPES,
};
pub use enemy::{
    CardRemovalReason,
    CounterBadge,
    Dummy,
    Enemy,
    EnemyCtor,
    EnemyEvent,
    EnemyMeta,
    EnemyRegistry,
    EnemyUiModifiers,
    InactivityUi,
    MatchOutcome,
    RoundStartOutcome,
    ScoreDecayUi,
    TickOutcome,
    MIN_BOARD_SIZE,
};
pub use items::{
    resolve_bridge_effects,
    BridgeActivation,
    BridgeEffectSpec,
    BridgeTrigger,
    CapIncrease,
    CappedStat,
    StatEffects,
    Weapon,
    WeaponEffectKind,
    WeaponRarity,
};
pub use modifiers::{
    apply_suppression,
    default_cap,
    effective_value,
    resolve_cap,
    resolve_effective_stats,
    EnemyStatModifiers,
    PlayerStats,
};
pub use stats::{MatchFlags, RoundStats};
