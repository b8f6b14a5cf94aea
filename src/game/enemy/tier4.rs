//! 四级敌人：多重机制叠加的回合头目。

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::game::card::{Card, CardChange, CardModification};
use crate::game::modifiers::EnemyStatModifiers;
use crate::game::stats::RoundStats;

use super::{
    clamp_removals, pick_eligible_excluding, ArmedCardTimer, CardRemovalReason, CounterBadge,
    Enemy, EnemyEvent, EnemyMeta, EnemyUiModifiers, IntervalTimer, MatchOutcome,
    RoundStartOutcome, TickOutcome, TimerSignal,
};

/// 开局两张废牌，抽牌三成概率再变废牌，且配对得分打八折。
pub struct DukeOfDuds {
    meta: EnemyMeta,
    rng: SmallRng,
}

impl DukeOfDuds {
    pub const NAME: &'static str = "Duke of Duds";
    const START_DUDS: usize = 2;
    const DUD_CHANCE: u32 = 30;
    const POINTS_MULTIPLIER: f32 = 0.8;

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
                "🎩",
                4,
                "A court of worthless cards, and your matches are worth less too.",
                "Make 10 valid matches without a single mistake.",
            ),
            rng,
        }
    }
}

impl Enemy for DukeOfDuds {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_round_start(&mut self, board: &[Card]) -> RoundStartOutcome {
        let mut outcome = RoundStartOutcome::default();
        let mut chosen = Vec::new();
        for _ in 0..Self::START_DUDS {
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
            outcome
                .card_modifications
                .push(CardModification::new(picked, CardChange::MakeDud));
            outcome.events.push(EnemyEvent::CardBecameDud { card_id: picked });
        }
        outcome
    }

    fn on_card_draw(&mut self, mut card: Card) -> Card {
        if self.rng.gen_range(0..100) < Self::DUD_CHANCE {
            card.is_dud = true;
        }
        card
    }

    fn on_valid_match(&mut self, _matched: &[Card], _board: &[Card]) -> MatchOutcome {
        MatchOutcome {
            points_multiplier: Self::POINTS_MULTIPLIER,
            ..MatchOutcome::default()
        }
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.total_matches >= 10 && stats.invalid_matches == 0
    }
}

/// 倒数牌与炸弹牌同时存在。
pub struct QueenOfEmbers {
    meta: EnemyMeta,
    countdown: ArmedCardTimer,
    bomb: ArmedCardTimer,
    rng: SmallRng,
}

impl QueenOfEmbers {
    pub const NAME: &'static str = "Queen of Embers";
    const COUNTDOWN_MS: u64 = 15_000;
    const COUNTDOWN_WARN_MS: u64 = 4000;
    const FUSE_MS: u64 = 18_000;

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
                "👑",
                4,
                "Rules with a countdown in one hand and a bomb in the other.",
                "Resolve 3 countdown or bomb cards in total.",
            ),
            countdown: ArmedCardTimer::new(Self::COUNTDOWN_MS, Self::COUNTDOWN_WARN_MS),
            bomb: ArmedCardTimer::new(Self::FUSE_MS, 0),
            rng,
        }
    }
}

impl Enemy for QueenOfEmbers {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_round_start(&mut self, board: &[Card]) -> RoundStartOutcome {
        let mut outcome = RoundStartOutcome::default();
        if let Some(card) = pick_eligible_excluding(board, &mut self.rng, None) {
            self.countdown.arm_on(card);
            outcome.card_modifications.push(CardModification::new(
                card,
                CardChange::ArmCountdown {
                    timer_ms: Self::COUNTDOWN_MS as u32,
                },
            ));
        }
        if let Some(card) =
            pick_eligible_excluding(board, &mut self.rng, self.countdown.card())
        {
            self.bomb.arm_on(card);
            outcome.card_modifications.push(CardModification::new(
                card,
                CardChange::ArmBomb {
                    timer_ms: Self::FUSE_MS as u32,
                },
            ));
            outcome.events.push(EnemyEvent::BombPlaced {
                card_id: card,
                timer_ms: Self::FUSE_MS,
            });
        }
        outcome
    }

    fn on_tick(&mut self, delta_ms: u64, board: &[Card]) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        for signal in self.countdown.tick(delta_ms, board, &mut self.rng) {
            match signal {
                TimerSignal::Armed { card } => {
                    outcome.card_modifications.push(CardModification::new(
                        card,
                        CardChange::ArmCountdown {
                            timer_ms: Self::COUNTDOWN_MS as u32,
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

        let mut exploded = Vec::new();
        for signal in self.bomb.tick(delta_ms, board, &mut self.rng) {
            match signal {
                TimerSignal::Armed { card } => {
                    outcome.card_modifications.push(CardModification::new(
                        card,
                        CardChange::ArmBomb {
                            timer_ms: Self::FUSE_MS as u32,
                        },
                    ));
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
        stats.countdown_cards_resolved + stats.bomb_cards_resolved >= 3
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            countdown_cards: self.countdown.card().into_iter().collect(),
            bomb_cards: self.bomb.card().into_iter().collect(),
            ..EnemyUiModifiers::default()
        }
    }
}

/// 每 30 秒一点伤害；两分钟后狂暴，直接终结回合。
pub struct HollowKing {
    meta: EnemyMeta,
    drain: IntervalTimer,
    elapsed_ms: u64,
    enraged: bool,
}

impl HollowKing {
    pub const NAME: &'static str = "Hollow King";
    const DRAIN_PERIOD_MS: u64 = 30_000;
    const ENRAGE_MS: u64 = 120_000;

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🫅",
                4,
                "Patient, inevitable. Outlast him and he ends you outright.",
                "Reach a streak of 5 valid matches.",
            ),
            drain: IntervalTimer::new(Self::DRAIN_PERIOD_MS),
            elapsed_ms: 0,
            enraged: false,
        }
    }
}

impl Enemy for HollowKing {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, _board: &[Card]) -> TickOutcome {
        let fires = self.drain.advance(delta_ms);
        self.elapsed_ms += delta_ms;

        let mut outcome = TickOutcome {
            health_delta: -(fires as i32),
            ..TickOutcome::default()
        };
        if !self.enraged && self.elapsed_ms >= Self::ENRAGE_MS {
            self.enraged = true;
            outcome.instant_death = true;
        }
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.max_streak >= 5
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            counter_badge: Some(CounterBadge {
                label: "Enrage".into(),
                current: (self.elapsed_ms / 1000) as u32,
                target: (Self::ENRAGE_MS / 1000) as u32,
            }),
            ..EnemyUiModifiers::default()
        }
    }
}

/// 抽牌两成概率盖住；配错还会再盖住两张场上的牌。
pub struct MirrorEmpress {
    meta: EnemyMeta,
    rng: SmallRng,
}

impl MirrorEmpress {
    pub const NAME: &'static str = "Mirror Empress";
    const FACE_DOWN_CHANCE: u32 = 20;
    const PUNISH_FLIPS: usize = 2;

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
                "🪞",
                4,
                "Turns the board against you, one reflection at a time.",
                "Flip and resolve 6 face-down cards.",
            ),
            rng,
        }
    }
}

impl Enemy for MirrorEmpress {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_card_draw(&mut self, mut card: Card) -> Card {
        if self.rng.gen_range(0..100) < Self::FACE_DOWN_CHANCE {
            card.is_face_down = true;
        }
        card
    }

    fn on_invalid_match(&mut self, _matched: &[Card], board: &[Card]) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();
        let mut flipped = Vec::new();
        for _ in 0..Self::PUNISH_FLIPS {
            let candidates: Vec<_> = board
                .iter()
                .filter(|card| card.is_matchable() && !flipped.contains(&card.id))
                .map(|card| card.id)
                .collect();
            if candidates.is_empty() {
                break;
            }
            let picked = candidates[self.rng.gen_range(0..candidates.len())];
            flipped.push(picked);
            outcome.events.push(EnemyEvent::CardFlipped {
                card_id: picked,
                face_down: true,
            });
        }
        outcome.cards_to_flip = flipped;
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.face_down_resolved >= 6
    }
}

/// 每 8 秒吞一张牌，每 20 秒偷两秒。
pub struct VoidMaw {
    meta: EnemyMeta,
    hunger: IntervalTimer,
    theft: IntervalTimer,
    devoured: u32,
    rng: SmallRng,
}

impl VoidMaw {
    pub const NAME: &'static str = "Void Maw";
    const HUNGER_MS: u64 = 8000;
    const THEFT_MS: u64 = 20_000;
    const STEAL_MS: u64 = 2000;

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
                "🕳️",
                4,
                "An appetite for cards and seconds alike.",
                "Make 14 valid matches.",
            ),
            hunger: IntervalTimer::new(Self::HUNGER_MS),
            theft: IntervalTimer::new(Self::THEFT_MS),
            devoured: 0,
            rng,
        }
    }
}

impl Enemy for VoidMaw {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, board: &[Card]) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        let bites = self.hunger.advance(delta_ms);
        let mut picked = Vec::new();
        for _ in 0..bites {
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

        let thefts = self.theft.advance(delta_ms) as u64;
        if thefts > 0 {
            let stolen = Self::STEAL_MS * thefts;
            outcome.time_delta_ms = -(stolen as i64);
            outcome.events.push(EnemyEvent::TimeStolen { amount_ms: stolen });
        }
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.total_matches >= 14
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

/// 压制所有概率属性，并以固定系数削减得分。
pub struct GrandSaboteur {
    meta: EnemyMeta,
}

impl GrandSaboteur {
    pub const NAME: &'static str = "Grand Saboteur";

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🗝️",
                4,
                "Every trinket you carry works at a third of its strength.",
                "Trigger 3 distinct weapon effects.",
            ),
        }
    }
}

impl Enemy for GrandSaboteur {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.distinct_weapon_effects() >= 3
    }

    fn stat_modifiers(&self) -> EnemyStatModifiers {
        EnemyStatModifiers {
            explosion_reduction: Some(20),
            fire_spread_reduction: Some(20),
            grace_reduction: Some(20),
            time_bonus_reduction: Some(20),
            point_bonus_reduction: Some(20),
            points_multiplier: Some(0.75),
            ..EnemyStatModifiers::default()
        }
    }
}
