//! 敌人生命周期契约与各级实现（状态机、计时器、注册表等）。

pub mod registry;
pub mod tier1;
pub mod tier2;
pub mod tier3;
pub mod tier4;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::card::{Card, CardChange, CardId, CardModification};
use super::modifiers::EnemyStatModifiers;
use super::stats::RoundStats;

pub use registry::{EnemyCtor, EnemyRegistry};

/// 场上允许的最小卡牌数量。任何移除都不得击穿这个下限。
pub const MIN_BOARD_SIZE: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnemyMeta {
    pub name: String,
    pub icon: String,
    pub tier: u8,
    pub description: String,
    pub defeat_condition: String,
}

impl EnemyMeta {
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        tier: u8,
        description: impl Into<String>,
        defeat_condition: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            tier,
            description: description.into(),
            defeat_condition: defeat_condition.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardRemovalReason {
    Devoured,
    Exploded,
    Sacrificed,
}

/// 敌人产生的离散事件，仅供外层做日志与动画，
/// 不参与任何规则判定。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum EnemyEvent {
    CardBecameDud { card_id: CardId },
    CardFlipped { card_id: CardId, face_down: bool },
    CardAttributeChanged { card_id: CardId, change: CardChange },
    CardRemoved { card_id: CardId, reason: CardRemovalReason },
    PositionsShuffled,
    InactivityWarning { idle_ms: u64 },
    InactivityPenalty { health_delta: i32 },
    CountdownWarning { card_id: CardId, remaining_ms: u64 },
    CountdownExpired { card_id: CardId },
    BombPlaced { card_id: CardId, timer_ms: u64 },
    BombExploded { card_id: CardId },
    TimeStolen { amount_ms: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InactivityUi {
    pub limit_ms: u64,
    pub idle_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreDecayUi {
    pub period_ms: u64,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CounterBadge {
    pub label: String,
    pub current: u32,
    pub target: u32,
}

/// 敌人内部状态的界面投影。纯展示用途，
/// 不得用来驱动规则逻辑。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnemyUiModifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactivity: Option<InactivityUi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_decay: Option<ScoreDecayUi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_speed: Option<f32>,
    #[serde(default)]
    pub hints_disabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub countdown_cards: Vec<CardId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bomb_cards: Vec<CardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_badge: Option<CounterBadge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoundStartOutcome {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub card_modifications: Vec<CardModification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EnemyEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TickOutcome {
    #[serde(default)]
    pub score_delta: i32,
    #[serde(default)]
    pub health_delta: i32,
    #[serde(default)]
    pub time_delta_ms: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards_to_remove: Vec<CardId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub card_modifications: Vec<CardModification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards_to_flip: Vec<CardId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EnemyEvent>,
    /// 终结信号，与 health_delta 相互独立；同一结果里的
    /// 其余字段仍需由外层先行结算。
    #[serde(default)]
    pub instant_death: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchOutcome {
    #[serde(default)]
    pub time_delta_ms: i64,
    /// 乘法系数，默认 1。与装备侧的系数相乘叠加。
    pub points_multiplier: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards_to_remove: Vec<CardId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards_to_flip: Vec<CardId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EnemyEvent>,
}

impl Default for MatchOutcome {
    fn default() -> Self {
        Self {
            time_delta_ms: 0,
            points_multiplier: 1.0,
            cards_to_remove: Vec::new(),
            cards_to_flip: Vec::new(),
            events: Vec::new(),
        }
    }
}

/// 每回合恰好一个敌人处于激活状态。默认实现全部中性，
/// 每个变体只覆盖自己用到的能力。
pub trait Enemy {
    fn meta(&self) -> &EnemyMeta;

    fn on_round_start(&mut self, _board: &[Card]) -> RoundStartOutcome {
        RoundStartOutcome::default()
    }

    fn on_tick(&mut self, _delta_ms: u64, _board: &[Card]) -> TickOutcome {
        TickOutcome::default()
    }

    fn on_valid_match(&mut self, _matched: &[Card], _board: &[Card]) -> MatchOutcome {
        MatchOutcome::default()
    }

    fn on_invalid_match(&mut self, _matched: &[Card], _board: &[Card]) -> MatchOutcome {
        MatchOutcome::default()
    }

    fn on_card_draw(&mut self, card: Card) -> Card {
        card
    }

    fn on_round_end(&mut self) {}

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool;

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers::default()
    }

    fn stat_modifiers(&self) -> EnemyStatModifiers {
        EnemyStatModifiers::default()
    }
}

/// 未知敌人名的兜底实现：所有操作都是空操作，
/// 击败条件恒真。
pub struct Dummy {
    meta: EnemyMeta,
}

impl Dummy {
    pub const NAME: &'static str = "Dummy";

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(Self::NAME, "🪵", 1, "A harmless stand-in.", "Always satisfied."),
        }
    }
}

impl Default for Dummy {
    fn default() -> Self {
        Self::new()
    }
}

impl Enemy for Dummy {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn check_defeat_condition(&self, _stats: &RoundStats) -> bool {
        true
    }
}

pub(crate) fn eligible_card_ids(board: &[Card]) -> Vec<CardId> {
    board
        .iter()
        .filter(|card| card.is_matchable())
        .map(|card| card.id)
        .collect()
}

pub(crate) fn pick_eligible_excluding(
    board: &[Card],
    rng: &mut impl Rng,
    exclude: Option<CardId>,
) -> Option<CardId> {
    let mut candidates = eligible_card_ids(board);
    if let Some(exclude) = exclude {
        candidates.retain(|id| *id != exclude);
    }
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}

/// 批量移除时保留尽可能多的候选，但不得让场上
/// 少于 [`MIN_BOARD_SIZE`] 张。
pub(crate) fn clamp_removals(board_len: usize, mut candidates: Vec<CardId>) -> Vec<CardId> {
    let allowed = board_len.saturating_sub(MIN_BOARD_SIZE);
    candidates.truncate(allowed);
    candidates
}

/// 周期计时器：累积毫秒数，跨过阈值时触发。单次超大增量
/// 会触发所有被跨过的阈值，剩余量保留到下一次。
#[derive(Debug, Clone)]
pub(crate) struct IntervalTimer {
    period_ms: u64,
    elapsed_ms: u64,
}

impl IntervalTimer {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            elapsed_ms: 0,
        }
    }

    pub fn advance(&mut self, delta_ms: u64) -> u32 {
        self.elapsed_ms += delta_ms;
        let mut fires = 0;
        while self.elapsed_ms >= self.period_ms {
            self.elapsed_ms -= self.period_ms;
            fires += 1;
        }
        fires
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

/// 挂在单张卡上的倒计时（倒数牌与炸弹牌共用的子协议）。
#[derive(Debug, Clone)]
pub(crate) struct ArmedCardTimer {
    duration_ms: u64,
    warn_threshold_ms: u64,
    card: Option<CardId>,
    remaining_ms: u64,
    warned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimerSignal {
    Armed { card: CardId },
    Warning { card: CardId, remaining_ms: u64 },
    Expired { card: CardId },
}

impl ArmedCardTimer {
    pub fn new(duration_ms: u64, warn_threshold_ms: u64) -> Self {
        Self {
            duration_ms,
            warn_threshold_ms,
            card: None,
            remaining_ms: 0,
            warned: false,
        }
    }

    pub fn card(&self) -> Option<CardId> {
        self.card
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// 在合适的卡上挂载计时器。没有合格卡时保持未挂载。
    pub fn arm(&mut self, board: &[Card], rng: &mut impl Rng) -> Option<CardId> {
        self.arm_excluding(board, rng, None)
    }

    /// 挂载到指定的卡上（由调用方保证其合格性）。
    pub fn arm_on(&mut self, card: CardId) {
        self.card = Some(card);
        self.remaining_ms = self.duration_ms;
        self.warned = false;
    }

    fn arm_excluding(
        &mut self,
        board: &[Card],
        rng: &mut impl Rng,
        exclude: Option<CardId>,
    ) -> Option<CardId> {
        let picked = pick_eligible_excluding(board, rng, exclude)?;
        self.card = Some(picked);
        self.remaining_ms = self.duration_ms;
        self.warned = false;
        Some(picked)
    }

    /// 推进计时器。载体被外部移除时立即换卡重挂，不触发
    /// 到期惩罚；单次超大增量会循环触发多次到期。
    pub fn tick(&mut self, delta_ms: u64, board: &[Card], rng: &mut impl Rng) -> Vec<TimerSignal> {
        let mut signals = Vec::new();

        match self.card {
            None => {
                if let Some(card) = self.arm(board, rng) {
                    signals.push(TimerSignal::Armed { card });
                }
                return signals;
            }
            Some(card) => {
                if !board.iter().any(|c| c.id == card) {
                    self.card = None;
                    if let Some(new_card) = self.arm(board, rng) {
                        signals.push(TimerSignal::Armed { card: new_card });
                    }
                    return signals;
                }
            }
        }

        let mut delta = delta_ms;
        loop {
            let Some(card) = self.card else {
                break;
            };
            if delta < self.remaining_ms {
                self.remaining_ms -= delta;
                if !self.warned && self.remaining_ms <= self.warn_threshold_ms {
                    self.warned = true;
                    signals.push(TimerSignal::Warning {
                        card,
                        remaining_ms: self.remaining_ms,
                    });
                }
                break;
            }

            delta -= self.remaining_ms;
            signals.push(TimerSignal::Expired { card });
            self.card = None;
            self.warned = false;
            if let Some(new_card) = self.arm_excluding(board, rng, Some(card)) {
                signals.push(TimerSignal::Armed { card: new_card });
            } else {
                break;
            }
        }

        signals
    }
}
