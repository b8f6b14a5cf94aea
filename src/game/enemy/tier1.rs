//! 一级敌人：单一、温和的干扰。

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::game::card::{Card, CardChange, CardModification};
use crate::game::modifiers::EnemyStatModifiers;
use crate::game::stats::RoundStats;

use super::{
    pick_eligible_excluding, Enemy, EnemyEvent, EnemyMeta, EnemyUiModifiers, InactivityUi,
    IntervalTimer, MatchOutcome, RoundStartOutcome, ScoreDecayUi, TickOutcome,
};

/// 每 6 秒啃走一点分数。
pub struct RustRat {
    meta: EnemyMeta,
    gnaw: IntervalTimer,
}

impl RustRat {
    pub const NAME: &'static str = "Rust Rat";
    const PERIOD_MS: u64 = 6000;
    const SCORE_BITE: i32 = 5;

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🐀",
                1,
                "Gnaws away a few points every six seconds.",
                "Reach a streak of 3 valid matches.",
            ),
            gnaw: IntervalTimer::new(Self::PERIOD_MS),
        }
    }
}

impl Enemy for RustRat {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, _board: &[Card]) -> TickOutcome {
        let fires = self.gnaw.advance(delta_ms);
        TickOutcome {
            score_delta: -(Self::SCORE_BITE * fires as i32),
            ..TickOutcome::default()
        }
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.max_streak >= 3
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            score_decay: Some(ScoreDecayUi {
                period_ms: Self::PERIOD_MS,
                amount: -Self::SCORE_BITE,
            }),
            ..EnemyUiModifiers::default()
        }
    }
}

/// 新抽的牌有两成概率盖住。
pub struct FogImp {
    meta: EnemyMeta,
    rng: SmallRng,
}

impl FogImp {
    pub const NAME: &'static str = "Fog Imp";
    const FACE_DOWN_CHANCE: u32 = 20;

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
                "🌫️",
                1,
                "Shrouds some freshly drawn cards face-down.",
                "Flip and resolve 3 face-down cards.",
            ),
            rng,
        }
    }
}

impl Enemy for FogImp {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_card_draw(&mut self, mut card: Card) -> Card {
        if self.rng.gen_range(0..100) < Self::FACE_DOWN_CHANCE {
            card.is_face_down = true;
        }
        card
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.face_down_resolved >= 3
    }
}

/// 闲置惩罚：8 秒警告，12 秒扣血。配对（无论有效与否）
/// 都会重置闲置时钟。
pub struct SlothSlug {
    meta: EnemyMeta,
    idle_ms: u64,
    warned: bool,
}

impl SlothSlug {
    pub const NAME: &'static str = "Sloth Slug";
    const WARN_MS: u64 = 8000;
    const LIMIT_MS: u64 = 12_000;

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🐌",
                1,
                "Punishes idleness with creeping damage.",
                "Make 6 valid matches.",
            ),
            idle_ms: 0,
            warned: false,
        }
    }

    fn reset_idle(&mut self) {
        self.idle_ms = 0;
        self.warned = false;
    }
}

impl Enemy for SlothSlug {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, _board: &[Card]) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        self.idle_ms += delta_ms;

        if !self.warned && self.idle_ms >= Self::WARN_MS && self.idle_ms < Self::LIMIT_MS {
            self.warned = true;
            outcome.events.push(EnemyEvent::InactivityWarning {
                idle_ms: self.idle_ms,
            });
        }

        while self.idle_ms >= Self::LIMIT_MS {
            self.idle_ms -= Self::LIMIT_MS;
            self.warned = false;
            outcome.health_delta -= 1;
            outcome
                .events
                .push(EnemyEvent::InactivityPenalty { health_delta: -1 });
        }

        outcome
    }

    fn on_valid_match(&mut self, _matched: &[Card], _board: &[Card]) -> MatchOutcome {
        self.reset_idle();
        MatchOutcome::default()
    }

    fn on_invalid_match(&mut self, _matched: &[Card], _board: &[Card]) -> MatchOutcome {
        self.reset_idle();
        MatchOutcome::default()
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.total_matches >= 6
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            inactivity: Some(InactivityUi {
                limit_ms: Self::LIMIT_MS,
                idle_ms: self.idle_ms,
            }),
            ..EnemyUiModifiers::default()
        }
    }
}

/// 每 10 秒偷走 2 秒时间。
pub struct Magpie {
    meta: EnemyMeta,
    theft: IntervalTimer,
}

impl Magpie {
    pub const NAME: &'static str = "Magpie";
    const PERIOD_MS: u64 = 10_000;
    const STEAL_MS: u64 = 2000;

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🐦",
                1,
                "Pilfers two seconds of your clock, again and again.",
                "Finish the round with at least 30 seconds left.",
            ),
            theft: IntervalTimer::new(Self::PERIOD_MS),
        }
    }
}

impl Enemy for Magpie {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, _board: &[Card]) -> TickOutcome {
        let fires = self.theft.advance(delta_ms) as u64;
        let mut outcome = TickOutcome::default();
        if fires > 0 {
            let stolen = Self::STEAL_MS * fires;
            outcome.time_delta_ms = -(stolen as i64);
            outcome.events.push(EnemyEvent::TimeStolen { amount_ms: stolen });
        }
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.time_remaining_ms >= 30_000
    }
}

/// 开局将两张牌变成废牌。
pub struct DustSprite {
    meta: EnemyMeta,
    rng: SmallRng,
}

impl DustSprite {
    pub const NAME: &'static str = "Dust Sprite";
    const DUDS: usize = 2;

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
                "💨",
                1,
                "Coats two cards in dust, making them unmatchable.",
                "Make 8 valid matches.",
            ),
            rng,
        }
    }
}

impl Enemy for DustSprite {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_round_start(&mut self, board: &[Card]) -> RoundStartOutcome {
        let mut outcome = RoundStartOutcome::default();
        let mut chosen = Vec::new();
        for _ in 0..Self::DUDS {
            let mut candidates: Vec<_> = board
                .iter()
                .filter(|card| card.is_matchable() && !chosen.contains(&card.id))
                .map(|card| card.id)
                .collect();
            if candidates.is_empty() {
                break;
            }
            let picked = candidates.swap_remove(self.rng.gen_range(0..candidates.len()));
            chosen.push(picked);
            outcome
                .card_modifications
                .push(CardModification::new(picked, CardChange::MakeDud));
            outcome.events.push(EnemyEvent::CardBecameDud { card_id: picked });
        }
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.total_matches >= 8
    }
}

/// 压制爆炸与火焰蔓延概率。
pub struct TinkerGremlin {
    meta: EnemyMeta,
}

impl TinkerGremlin {
    pub const NAME: &'static str = "Tinker Gremlin";

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🔧",
                1,
                "Jams explosive and fire-spreading trinkets.",
                "Trigger 2 distinct weapon effects.",
            ),
        }
    }
}

impl Enemy for TinkerGremlin {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.distinct_weapon_effects() >= 2
    }

    fn stat_modifiers(&self) -> EnemyStatModifiers {
        EnemyStatModifiers {
            explosion_reduction: Some(15),
            fire_spread_reduction: Some(15),
            ..EnemyStatModifiers::default()
        }
    }
}

/// 开局放置一张三击牌。
pub struct PebbleGolem {
    meta: EnemyMeta,
    rng: SmallRng,
}

impl PebbleGolem {
    pub const NAME: &'static str = "Pebble Golem";
    const TRIPLE_HEALTH: u8 = 3;

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
                "🪨",
                1,
                "Hardens one card so it takes three hits to clear.",
                "Clear 1 hardened card.",
            ),
            rng,
        }
    }
}

impl Enemy for PebbleGolem {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_round_start(&mut self, board: &[Card]) -> RoundStartOutcome {
        let mut outcome = RoundStartOutcome::default();
        if let Some(picked) = pick_eligible_excluding(board, &mut self.rng, None) {
            outcome.card_modifications.push(CardModification::new(
                picked,
                CardChange::SetHealth {
                    health: Self::TRIPLE_HEALTH,
                },
            ));
        }
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.triple_cards_cleared >= 1
    }
}

/// 配错一次，罚三秒。
pub struct EchoWisp {
    meta: EnemyMeta,
}

impl EchoWisp {
    pub const NAME: &'static str = "Echo Wisp";
    const PENALTY_MS: i64 = 3000;

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "👻",
                1,
                "Every mistake echoes back as lost time.",
                "Make 5 valid matches with at most 1 mistake.",
            ),
        }
    }
}

impl Enemy for EchoWisp {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_invalid_match(&mut self, _matched: &[Card], _board: &[Card]) -> MatchOutcome {
        MatchOutcome {
            time_delta_ms: -Self::PENALTY_MS,
            ..MatchOutcome::default()
        }
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.total_matches >= 5 && stats.invalid_matches <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::{CardColor, CardShading, CardShape};
    use crate::game::stats::MatchFlags;

    fn board_of(size: usize) -> Vec<Card> {
        (0..size as u32)
            .map(|id| Card::new(id, CardShape::Oval, CardColor::Red, 1, CardShading::Solid))
            .collect()
    }

    #[test]
    fn rust_rat_gnaws_on_schedule() {
        let mut rat = RustRat::new();
        let board = board_of(9);

        assert_eq!(rat.on_tick(5999, &board).score_delta, 0);
        assert_eq!(rat.on_tick(1, &board).score_delta, -5);
        // 单次大增量补齐两次啃噬。
        assert_eq!(rat.on_tick(12_000, &board).score_delta, -10);
    }

    #[test]
    fn fog_imp_sometimes_hides_drawn_cards() {
        let mut imp = FogImp::with_seed(42);
        let mut hidden = 0;
        for id in 0..200 {
            let card = Card::new(id, CardShape::Oval, CardColor::Red, 1, CardShading::Solid);
            if imp.on_card_draw(card).is_face_down {
                hidden += 1;
            }
        }
        assert!(hidden > 10 && hidden < 80, "roughly 20% of draws, got {hidden}");
    }

    #[test]
    fn sloth_slug_warns_then_punishes() {
        let mut slug = SlothSlug::new();
        let board = board_of(9);

        let outcome = slug.on_tick(8000, &board);
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, EnemyEvent::InactivityWarning { .. })));
        assert_eq!(outcome.health_delta, 0);

        let outcome = slug.on_tick(4000, &board);
        assert_eq!(outcome.health_delta, -1);
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, EnemyEvent::InactivityPenalty { .. })));
    }

    #[test]
    fn sloth_slug_idle_clock_resets_on_match() {
        let mut slug = SlothSlug::new();
        let board = board_of(9);

        slug.on_tick(7000, &board);
        slug.on_valid_match(&board[0..3], &board);
        let outcome = slug.on_tick(7000, &board);
        assert!(
            outcome.events.is_empty(),
            "warning clock restarts after a match"
        );
    }

    #[test]
    fn magpie_steals_time_and_reports_it() {
        let mut magpie = Magpie::new();
        let board = board_of(9);

        let outcome = magpie.on_tick(10_000, &board);
        assert_eq!(outcome.time_delta_ms, -2000);
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, EnemyEvent::TimeStolen { amount_ms: 2000 })));
    }

    #[test]
    fn dust_sprite_marks_two_distinct_duds() {
        let mut sprite = DustSprite::with_seed(3);
        let board = board_of(9);
        let outcome = sprite.on_round_start(&board);
        assert_eq!(outcome.card_modifications.len(), 2);
        let first = outcome.card_modifications[0].card_id;
        let second = outcome.card_modifications[1].card_id;
        assert_ne!(first, second, "the two duds must be different cards");
    }

    #[test]
    fn dust_sprite_handles_an_empty_board() {
        let mut sprite = DustSprite::with_seed(3);
        let outcome = sprite.on_round_start(&[]);
        assert!(outcome.card_modifications.is_empty());
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn pebble_golem_hardens_exactly_one_card() {
        let mut golem = PebbleGolem::with_seed(4);
        let board = board_of(9);
        let outcome = golem.on_round_start(&board);
        assert_eq!(outcome.card_modifications.len(), 1);
        assert!(matches!(
            outcome.card_modifications[0].change,
            CardChange::SetHealth { health: 3 }
        ));
    }

    #[test]
    fn tinker_gremlin_suppresses_only_its_two_stats() {
        let gremlin = TinkerGremlin::new();
        let modifiers = gremlin.stat_modifiers();
        assert_eq!(modifiers.explosion_reduction, Some(15));
        assert_eq!(modifiers.fire_spread_reduction, Some(15));
        assert_eq!(modifiers.grace_reduction, None);
    }

    #[test]
    fn echo_wisp_taxes_invalid_matches_only() {
        let mut wisp = EchoWisp::new();
        let board = board_of(9);
        assert_eq!(wisp.on_valid_match(&board[0..3], &board).time_delta_ms, 0);
        assert_eq!(wisp.on_invalid_match(&board[0..3], &board).time_delta_ms, -3000);
    }

    #[test]
    fn tier1_defeat_conditions_read_stats_purely() {
        let mut stats = RoundStats::new(300, 3, 2);
        let card = Card::new(1, CardShape::Oval, CardColor::Red, 1, CardShading::Solid);
        for _ in 0..3 {
            stats.record_valid_match(std::slice::from_ref(&card), 1000, MatchFlags::default());
        }

        let rat = RustRat::new();
        assert!(rat.check_defeat_condition(&stats));
        assert!(rat.check_defeat_condition(&stats), "same stats, same verdict");

        let slug = SlothSlug::new();
        assert!(!slug.check_defeat_condition(&stats));
    }
}
