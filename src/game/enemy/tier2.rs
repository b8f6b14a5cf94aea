//! 二级敌人：倒计时、炸弹与更重的资源压力。

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::game::card::{Card, CardChange, CardModification};
use crate::game::modifiers::EnemyStatModifiers;
use crate::game::stats::RoundStats;

use super::{
    clamp_removals, ArmedCardTimer, CardRemovalReason, CounterBadge, Enemy,
    EnemyEvent, EnemyMeta, EnemyUiModifiers, IntervalTimer, MatchOutcome, RoundStartOutcome,
    ScoreDecayUi, TickOutcome, TimerSignal,
};

/// 倒数牌协议的标准实现：20 秒倒计时，5 秒警告，
/// 到期扣一点血并换卡重挂。
pub struct AshenCrow {
    meta: EnemyMeta,
    timer: ArmedCardTimer,
    rng: SmallRng,
}

impl AshenCrow {
    pub const NAME: &'static str = "Ashen Crow";
    const DURATION_MS: u64 = 20_000;
    const WARN_MS: u64 = 5000;

    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🐦‍⬛",
                2,
                "Perches a countdown on one card; let it run out and it pecks.",
                "Resolve 2 countdown cards before they expire.",
            ),
            timer: ArmedCardTimer::new(Self::DURATION_MS, Self::WARN_MS),
            rng,
        }
    }
}

impl Enemy for AshenCrow {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_round_start(&mut self, board: &[Card]) -> RoundStartOutcome {
        let mut outcome = RoundStartOutcome::default();
        if let Some(card) = self.timer.arm(board, &mut self.rng) {
            outcome.card_modifications.push(CardModification::new(
                card,
                CardChange::ArmCountdown {
                    timer_ms: Self::DURATION_MS as u32,
                },
            ));
        }
        outcome
    }

    fn on_tick(&mut self, delta_ms: u64, board: &[Card]) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        for signal in self.timer.tick(delta_ms, board, &mut self.rng) {
            match signal {
                TimerSignal::Armed { card } => {
                    outcome.card_modifications.push(CardModification::new(
                        card,
                        CardChange::ArmCountdown {
                            timer_ms: Self::DURATION_MS as u32,
                        },
                    ));
                }
                TimerSignal::Warning { card, remaining_ms } => {
                    outcome.events.push(EnemyEvent::CountdownWarning {
                        card_id: card,
                        remaining_ms,
                    });
                }
                TimerSignal::Expired { card } => {
                    outcome.health_delta -= 1;
                    outcome.events.push(EnemyEvent::CountdownExpired { card_id: card });
                    outcome
                        .card_modifications
                        .push(CardModification::new(card, CardChange::DisarmCountdown));
                }
            }
        }
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.countdown_cards_resolved >= 2
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            countdown_cards: self.timer.card().into_iter().collect(),
            ..EnemyUiModifiers::default()
        }
    }
}

/// 开局盖住三张牌，之后抽到的牌也有一成五概率盖住。
pub struct CardWarden {
    meta: EnemyMeta,
    rng: SmallRng,
}

impl CardWarden {
    pub const NAME: &'static str = "Card Warden";
    const START_FLIPS: usize = 3;
    const FACE_DOWN_CHANCE: u32 = 15;

    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🛡️",
                2,
                "Locks cards away face-down, at the start and as you draw.",
                "Flip and resolve 4 face-down cards.",
            ),
            rng,
        }
    }
}

impl Enemy for CardWarden {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_round_start(&mut self, board: &[Card]) -> RoundStartOutcome {
        let mut outcome = RoundStartOutcome::default();
        let mut chosen = Vec::new();
        for _ in 0..Self::START_FLIPS {
            let candidates: Vec<_> = board
                .iter()
                .filter(|card| card.is_matchable() && !chosen.contains(&card.id))
                .map(|card| card.id)
                .collect();
            if candidates.is_empty() {
                break;
            }
            let picked = candidates[self.rng.gen_range(0..candidates.len())];
            chosen.push(picked);
            outcome.card_modifications.push(CardModification::new(
                picked,
                CardChange::SetFaceDown { face_down: true },
            ));
            outcome.events.push(EnemyEvent::CardFlipped {
                card_id: picked,
                face_down: true,
            });
        }
        outcome
    }

    fn on_card_draw(&mut self, mut card: Card) -> Card {
        if self.rng.gen_range(0..100) < Self::FACE_DOWN_CHANCE {
            card.is_face_down = true;
        }
        card
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.face_down_resolved >= 4
    }
}

/// 炸弹牌协议的标准实现：15 秒引信，爆炸移除载体并扣血。
pub struct PowderKeg {
    meta: EnemyMeta,
    timer: ArmedCardTimer,
    rng: SmallRng,
}

impl PowderKeg {
    pub const NAME: &'static str = "Powder Keg";
    const FUSE_MS: u64 = 15_000;

    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🧨",
                2,
                "Straps a bomb to one card. Match it before the fuse burns down.",
                "Defuse 1 bomb by matching its card.",
            ),
            // 阈值为零即不发警告，炸弹只有放置与爆炸两个事件。
            timer: ArmedCardTimer::new(Self::FUSE_MS, 0),
            rng,
        }
    }

    fn arm_modification(card: crate::game::card::CardId) -> CardModification {
        CardModification::new(
            card,
            CardChange::ArmBomb {
                timer_ms: Self::FUSE_MS as u32,
            },
        )
    }
}

impl Enemy for PowderKeg {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_round_start(&mut self, board: &[Card]) -> RoundStartOutcome {
        let mut outcome = RoundStartOutcome::default();
        if let Some(card) = self.timer.arm(board, &mut self.rng) {
            outcome.card_modifications.push(Self::arm_modification(card));
            outcome.events.push(EnemyEvent::BombPlaced {
                card_id: card,
                timer_ms: Self::FUSE_MS,
            });
        }
        outcome
    }

    fn on_tick(&mut self, delta_ms: u64, board: &[Card]) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let mut exploded = Vec::new();
        for signal in self.timer.tick(delta_ms, board, &mut self.rng) {
            match signal {
                TimerSignal::Armed { card } => {
                    outcome.card_modifications.push(Self::arm_modification(card));
                    outcome.events.push(EnemyEvent::BombPlaced {
                        card_id: card,
                        timer_ms: Self::FUSE_MS,
                    });
                }
                TimerSignal::Warning { .. } => {}
                TimerSignal::Expired { card } => {
                    outcome.health_delta -= 1;
                    outcome.events.push(EnemyEvent::BombExploded { card_id: card });
                    exploded.push(card);
                }
            }
        }
        outcome.cards_to_remove = clamp_removals(board.len(), exploded);
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.bomb_cards_resolved >= 1
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            bomb_cards: self.timer.card().into_iter().collect(),
            ..EnemyUiModifiers::default()
        }
    }
}

/// 每 4 秒吸走 8 分，并压制加分概率。
pub struct GreyLeech {
    meta: EnemyMeta,
    drain: IntervalTimer,
}

impl GreyLeech {
    pub const NAME: &'static str = "Grey Leech";
    const PERIOD_MS: u64 = 4000;
    const DRAIN: i32 = 8;

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🪱",
                2,
                "Siphons score steadily and dampens point bonuses.",
                "Make 10 valid matches.",
            ),
            drain: IntervalTimer::new(Self::PERIOD_MS),
        }
    }
}

impl Enemy for GreyLeech {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, _board: &[Card]) -> TickOutcome {
        let fires = self.drain.advance(delta_ms);
        TickOutcome {
            score_delta: -(Self::DRAIN * fires as i32),
            ..TickOutcome::default()
        }
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.total_matches >= 10
    }

    fn stat_modifiers(&self) -> EnemyStatModifiers {
        EnemyStatModifiers {
            point_bonus_reduction: Some(20),
            ..EnemyStatModifiers::default()
        }
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            score_decay: Some(ScoreDecayUi {
                period_ms: Self::PERIOD_MS,
                amount: -Self::DRAIN,
            }),
            ..EnemyUiModifiers::default()
        }
    }
}

/// 每 15 秒打乱场上卡牌的位置。
pub struct MistWeaver {
    meta: EnemyMeta,
    shuffle: IntervalTimer,
}

impl MistWeaver {
    pub const NAME: &'static str = "Mist Weaver";
    const PERIOD_MS: u64 = 15_000;

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🕸️",
                2,
                "Rearranges the board just as you learn it.",
                "Reach a streak of 4 valid matches.",
            ),
            shuffle: IntervalTimer::new(Self::PERIOD_MS),
        }
    }
}

impl Enemy for MistWeaver {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, _board: &[Card]) -> TickOutcome {
        let fires = self.shuffle.advance(delta_ms);
        let mut outcome = TickOutcome::default();
        for _ in 0..fires {
            outcome.events.push(EnemyEvent::PositionsShuffled);
        }
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.max_streak >= 4
    }
}

/// 每 12 秒吞掉一张牌，但绝不让场上少于下限。
pub struct GluttonousToad {
    meta: EnemyMeta,
    hunger: IntervalTimer,
    devoured: u32,
    rng: SmallRng,
}

impl GluttonousToad {
    pub const NAME: &'static str = "Gluttonous Toad";
    const PERIOD_MS: u64 = 12_000;

    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🐸",
                2,
                "Swallows a card whole every twelve seconds.",
                "Make 9 valid matches.",
            ),
            hunger: IntervalTimer::new(Self::PERIOD_MS),
            devoured: 0,
            rng,
        }
    }
}

impl Enemy for GluttonousToad {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, board: &[Card]) -> TickOutcome {
        let fires = self.hunger.advance(delta_ms);
        let mut outcome = TickOutcome::default();
        let mut picked = Vec::new();
        for _ in 0..fires {
            let candidates: Vec<_> = board
                .iter()
                .filter(|card| card.is_matchable() && !picked.contains(&card.id))
                .map(|card| card.id)
                .collect();
            if candidates.is_empty() {
                break;
            }
            picked.push(candidates[self.rng.gen_range(0..candidates.len())]);
        }
        let kept = clamp_removals(board.len(), picked);
        self.devoured += kept.len() as u32;
        for card_id in &kept {
            outcome.events.push(EnemyEvent::CardRemoved {
                card_id: *card_id,
                reason: CardRemovalReason::Devoured,
            });
        }
        outcome.cards_to_remove = kept;
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.total_matches >= 9
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            counter_badge: Some(CounterBadge {
                label: "Cards devoured".into(),
                current: self.devoured,
                target: 0,
            }),
            ..EnemyUiModifiers::default()
        }
    }
}

/// 抽牌有一成五概率变废牌，同时压制宽恕概率。
pub struct HexMoth {
    meta: EnemyMeta,
    rng: SmallRng,
}

impl HexMoth {
    pub const NAME: &'static str = "Hex Moth";
    const DUD_CHANCE: u32 = 15;

    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🦋",
                2,
                "Its dust curses fresh cards and smothers grace.",
                "Use no graces this round.",
            ),
            rng,
        }
    }
}

impl Enemy for HexMoth {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_card_draw(&mut self, mut card: Card) -> Card {
        if self.rng.gen_range(0..100) < Self::DUD_CHANCE {
            card.is_dud = true;
        }
        card
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.graces_used == 0
    }

    fn stat_modifiers(&self) -> EnemyStatModifiers {
        EnemyStatModifiers {
            grace_reduction: Some(25),
            ..EnemyStatModifiers::default()
        }
    }
}

/// 加速沙漏并在每次有效配对时抽走一秒时间奖励。
pub struct ClockThief {
    meta: EnemyMeta,
}

impl ClockThief {
    pub const NAME: &'static str = "Clock Thief";
    const MATCH_TAX_MS: i64 = 1000;
    const RUN_COUNT: usize = 3;
    const RUN_WINDOW_MS: u64 = 10_000;

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "⏰",
                2,
                "Speeds the hourglass and skims your time rewards.",
                "Make 3 valid matches within 10 seconds.",
            ),
        }
    }
}

impl Enemy for ClockThief {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_valid_match(&mut self, _matched: &[Card], _board: &[Card]) -> MatchOutcome {
        MatchOutcome {
            time_delta_ms: -Self::MATCH_TAX_MS,
            ..MatchOutcome::default()
        }
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.has_rapid_match_run(Self::RUN_COUNT, Self::RUN_WINDOW_MS)
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            timer_speed: Some(1.25),
            ..EnemyUiModifiers::default()
        }
    }
}
