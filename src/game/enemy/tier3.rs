//! 三级敌人：组合式干扰与更严苛的击败条件。

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::game::card::{Card, CardChange, CardColor, CardModification, ALL_COLORS};
use crate::game::modifiers::EnemyStatModifiers;
use crate::game::stats::RoundStats;

use super::{
    clamp_removals, pick_eligible_excluding, ArmedCardTimer, Enemy, EnemyEvent, EnemyMeta,
    EnemyUiModifiers, IntervalTimer, RoundStartOutcome, TickOutcome, TimerSignal,
};

/// 开局放置两张三击牌。
pub struct BoneCollector {
    meta: EnemyMeta,
    rng: SmallRng,
}

impl BoneCollector {
    pub const NAME: &'static str = "Bone Collector";
    const TRIPLES: usize = 2;
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
                "💀",
                3,
                "Fossilizes two cards into three-hit husks.",
                "Clear 2 hardened cards.",
            ),
            rng,
        }
    }
}

impl Enemy for BoneCollector {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_round_start(&mut self, board: &[Card]) -> RoundStartOutcome {
        let mut outcome = RoundStartOutcome::default();
        let mut chosen = Vec::new();
        for _ in 0..Self::TRIPLES {
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
                CardChange::SetHealth {
                    health: Self::TRIPLE_HEALTH,
                },
            ));
        }
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.triple_cards_cleared >= 2
    }
}

/// 每 20 秒盖住两张牌并打乱位置。
pub struct StormHarpy {
    meta: EnemyMeta,
    gale: IntervalTimer,
    rng: SmallRng,
}

impl StormHarpy {
    pub const NAME: &'static str = "Storm Harpy";
    const PERIOD_MS: u64 = 20_000;
    const FLIPS: usize = 2;

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
                "🦅",
                3,
                "Its gales flip cards over and scatter the board.",
                "Flip and resolve 5 face-down cards.",
            ),
            gale: IntervalTimer::new(Self::PERIOD_MS),
            rng,
        }
    }
}

impl Enemy for StormHarpy {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, board: &[Card]) -> TickOutcome {
        let fires = self.gale.advance(delta_ms);
        let mut outcome = TickOutcome::default();
        for _ in 0..fires {
            let mut flipped = Vec::new();
            for _ in 0..Self::FLIPS {
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
            outcome.cards_to_flip.extend(flipped);
            outcome.events.push(EnemyEvent::PositionsShuffled);
        }
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.face_down_resolved >= 5
    }
}

/// 同时维护两颗 12 秒引信的炸弹。
pub struct PyreFiend {
    meta: EnemyMeta,
    fuses: [ArmedCardTimer; 2],
    rng: SmallRng,
}

impl PyreFiend {
    pub const NAME: &'static str = "Pyre Fiend";
    const FUSE_MS: u64 = 12_000;

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
                "🔥",
                3,
                "Keeps two bombs burning at once.",
                "Defuse 2 bombs by matching their cards.",
            ),
            fuses: [
                ArmedCardTimer::new(Self::FUSE_MS, 0),
                ArmedCardTimer::new(Self::FUSE_MS, 0),
            ],
            rng,
        }
    }
}

impl Enemy for PyreFiend {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_round_start(&mut self, board: &[Card]) -> RoundStartOutcome {
        let mut outcome = RoundStartOutcome::default();
        let mut taken = None;
        for fuse in &mut self.fuses {
            // 避免两颗炸弹落在同一张牌上。
            let picked = pick_eligible_excluding(board, &mut self.rng, taken);
            let Some(card) = picked else {
                break;
            };
            fuse.arm_on(card);
            taken = Some(card);
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
        let mut exploded = Vec::new();
        for fuse in &mut self.fuses {
            for signal in fuse.tick(delta_ms, board, &mut self.rng) {
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
        }
        outcome.cards_to_remove = clamp_removals(board.len(), exploded);
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.bomb_cards_resolved >= 2
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            bomb_cards: self.fuses.iter().filter_map(|f| f.card()).collect(),
            ..EnemyUiModifiers::default()
        }
    }
}

/// 禁用提示并压制宽恕与爆炸。
pub struct NullSiren {
    meta: EnemyMeta,
}

impl NullSiren {
    pub const NAME: &'static str = "Null Siren";

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🎭",
                3,
                "Her song silences hints, grace and sparks alike.",
                "Use no hints this round.",
            ),
        }
    }
}

impl Enemy for NullSiren {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.hints_used == 0
    }

    fn stat_modifiers(&self) -> EnemyStatModifiers {
        EnemyStatModifiers {
            explosion_reduction: Some(30),
            grace_reduction: Some(30),
            ..EnemyStatModifiers::default()
        }
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            hints_disabled: true,
            ..EnemyUiModifiers::default()
        }
    }
}

/// 每 25 秒造成一点伤害，且受到的伤害被放大。
pub struct GraveChill {
    meta: EnemyMeta,
    chill: IntervalTimer,
}

impl GraveChill {
    pub const NAME: &'static str = "Grave Chill";
    const PERIOD_MS: u64 = 25_000;

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "🥶",
                3,
                "A creeping cold that bites harder the longer you linger.",
                "Make 6 valid matches while taking at most 2 damage.",
            ),
            chill: IntervalTimer::new(Self::PERIOD_MS),
        }
    }
}

impl Enemy for GraveChill {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, _board: &[Card]) -> TickOutcome {
        let fires = self.chill.advance(delta_ms);
        TickOutcome {
            health_delta: -(fires as i32),
            ..TickOutcome::default()
        }
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.total_matches >= 6 && stats.damage_received <= 2
    }

    fn stat_modifiers(&self) -> EnemyStatModifiers {
        EnemyStatModifiers {
            damage_multiplier: Some(1.5),
            ..EnemyStatModifiers::default()
        }
    }
}

/// 抽到的牌有四分之一概率被染成红色，场上的牌也会
/// 被定期偷走颜色。
pub struct PrismThief {
    meta: EnemyMeta,
    bleach: IntervalTimer,
    rng: SmallRng,
}

impl PrismThief {
    pub const NAME: &'static str = "Prism Thief";
    const CONVERT_CHANCE: u32 = 25;
    const PERIOD_MS: u64 = 18_000;

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
                "🌈",
                3,
                "Steals colors from cards old and new, bleaching them red.",
                "Match cards of every color.",
            ),
            bleach: IntervalTimer::new(Self::PERIOD_MS),
            rng,
        }
    }
}

impl Enemy for PrismThief {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, board: &[Card]) -> TickOutcome {
        let fires = self.bleach.advance(delta_ms);
        let mut outcome = TickOutcome::default();
        for _ in 0..fires {
            let candidates: Vec<_> = board
                .iter()
                .filter(|card| card.is_matchable() && card.color != CardColor::Red)
                .map(|card| card.id)
                .collect();
            if candidates.is_empty() {
                break;
            }
            let picked = candidates[self.rng.gen_range(0..candidates.len())];
            let change = CardChange::SetColor {
                color: CardColor::Red,
            };
            outcome
                .card_modifications
                .push(CardModification::new(picked, change.clone()));
            outcome.events.push(EnemyEvent::CardAttributeChanged {
                card_id: picked,
                change,
            });
        }
        outcome
    }

    fn on_card_draw(&mut self, mut card: Card) -> Card {
        if self.rng.gen_range(0..100) < Self::CONVERT_CHANCE {
            card.color = CardColor::Red;
        }
        card
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        ALL_COLORS.iter().all(|color| stats.colors_seen.contains(color))
    }
}

/// 每 10 秒腐蚀一张牌为废牌。
pub struct RotShambler {
    meta: EnemyMeta,
    rot: IntervalTimer,
    rng: SmallRng,
}

impl RotShambler {
    pub const NAME: &'static str = "Rot Shambler";
    const PERIOD_MS: u64 = 10_000;

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
                "🧟",
                3,
                "Everything it touches rots into an unmatchable husk.",
                "Make 12 valid matches.",
            ),
            rot: IntervalTimer::new(Self::PERIOD_MS),
            rng,
        }
    }
}

impl Enemy for RotShambler {
    fn meta(&self) -> &EnemyMeta {
        &self.meta
    }

    fn on_tick(&mut self, delta_ms: u64, board: &[Card]) -> TickOutcome {
        let fires = self.rot.advance(delta_ms);
        let mut outcome = TickOutcome::default();
        let mut rotted = Vec::new();
        for _ in 0..fires {
            let candidates: Vec<_> = board
                .iter()
                .filter(|card| card.is_matchable() && !rotted.contains(&card.id))
                .map(|card| card.id)
                .collect();
            if candidates.is_empty() {
                break;
            }
            let picked = candidates[self.rng.gen_range(0..candidates.len())];
            rotted.push(picked);
            outcome
                .card_modifications
                .push(CardModification::new(picked, CardChange::MakeDud));
            outcome.events.push(EnemyEvent::CardBecameDud { card_id: picked });
        }
        outcome
    }

    fn check_defeat_condition(&self, stats: &RoundStats) -> bool {
        stats.total_matches >= 12
    }
}

/// 沙漏跑得飞快，还会定期偷走三秒。
pub struct ChronoWraith {
    meta: EnemyMeta,
    theft: IntervalTimer,
}

impl ChronoWraith {
    pub const NAME: &'static str = "Chrono Wraith";
    const PERIOD_MS: u64 = 15_000;
    const STEAL_MS: u64 = 3000;

    pub fn new() -> Self {
        Self {
            meta: EnemyMeta::new(
                Self::NAME,
                "⏳",
                3,
                "Time itself drains faster in its presence.",
                "Finish the round with at least 20 seconds left.",
            ),
            theft: IntervalTimer::new(Self::PERIOD_MS),
        }
    }
}

impl Enemy for ChronoWraith {
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
        stats.time_remaining_ms >= 20_000
    }

    fn ui_modifiers(&self) -> EnemyUiModifiers {
        EnemyUiModifiers {
            timer_speed: Some(1.5),
            ..EnemyUiModifiers::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::{CardShading, CardShape};
    use crate::game::stats::MatchFlags;

    fn board_of(size: usize) -> Vec<Card> {
        (0..size as u32)
            .map(|id| Card::new(id, CardShape::Oval, CardColor::Green, 1, CardShading::Solid))
            .collect()
    }

    #[test]
    fn bone_collector_hardens_two_distinct_cards() {
        let mut collector = BoneCollector::with_seed(1);
        let board = board_of(9);
        let outcome = collector.on_round_start(&board);
        assert_eq!(outcome.card_modifications.len(), 2);
        assert_ne!(
            outcome.card_modifications[0].card_id,
            outcome.card_modifications[1].card_id
        );
    }

    #[test]
    fn pyre_fiend_places_two_bombs_on_different_cards() {
        let mut fiend = PyreFiend::with_seed(2);
        let board = board_of(9);
        let outcome = fiend.on_round_start(&board);
        assert_eq!(outcome.card_modifications.len(), 2);
        assert_ne!(
            outcome.card_modifications[0].card_id,
            outcome.card_modifications[1].card_id,
            "both bombs on one card would be a single bomb"
        );
        assert_eq!(fiend.ui_modifiers().bomb_cards.len(), 2);
    }

    #[test]
    fn pyre_fiend_double_explosion_respects_the_floor() {
        let mut fiend = PyreFiend::with_seed(3);
        let board = board_of(7);
        fiend.on_round_start(&board);
        let outcome = fiend.on_tick(12_000, &board);
        assert_eq!(outcome.health_delta, -2, "both fuses expire");
        assert_eq!(
            outcome.cards_to_remove.len(),
            1,
            "only one removal fits above the six-card floor"
        );
    }

    #[test]
    fn storm_harpy_flips_and_shuffles_per_gale() {
        let mut harpy = StormHarpy::with_seed(4);
        let board = board_of(9);
        let outcome = harpy.on_tick(20_000, &board);
        assert_eq!(outcome.cards_to_flip.len(), 2);
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, EnemyEvent::PositionsShuffled)));
    }

    #[test]
    fn prism_thief_defeat_needs_every_color() {
        let thief = PrismThief::with_seed(5);
        let mut stats = RoundStats::new(300, 3, 2);

        let red = Card::new(1, CardShape::Oval, CardColor::Red, 1, CardShading::Solid);
        let green = Card::new(2, CardShape::Oval, CardColor::Green, 1, CardShading::Solid);
        let purple = Card::new(3, CardShape::Oval, CardColor::Purple, 1, CardShading::Solid);

        stats.record_valid_match(&[red.clone(), green.clone()], 1000, MatchFlags::default());
        assert!(!thief.check_defeat_condition(&stats));

        stats.record_valid_match(&[purple], 1000, MatchFlags::default());
        assert!(thief.check_defeat_condition(&stats));
    }

    #[test]
    fn prism_thief_bleaches_a_board_card_on_schedule() {
        let mut thief = PrismThief::with_seed(7);
        let board = board_of(9);
        let outcome = thief.on_tick(18_000, &board);
        assert_eq!(outcome.card_modifications.len(), 1);
        assert!(matches!(
            outcome.card_modifications[0].change,
            CardChange::SetColor {
                color: CardColor::Red
            }
        ));
        assert!(matches!(
            outcome.events[0],
            EnemyEvent::CardAttributeChanged { .. }
        ));
    }

    #[test]
    fn rot_shambler_duds_skip_already_rotted_cards() {
        let mut shambler = RotShambler::with_seed(6);
        let board = board_of(9);
        let outcome = shambler.on_tick(30_000, &board);
        assert_eq!(outcome.card_modifications.len(), 3);
        let mut ids: Vec<_> = outcome
            .card_modifications
            .iter()
            .map(|m| m.card_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3, "each firing rots a different card");
    }

    #[test]
    fn grave_chill_defeat_tolerates_two_damage() {
        let chill = GraveChill::new();
        let mut stats = RoundStats::new(300, 3, 2);
        let card = Card::new(1, CardShape::Oval, CardColor::Red, 1, CardShading::Solid);
        for _ in 0..6 {
            stats.record_valid_match(std::slice::from_ref(&card), 1000, MatchFlags::default());
        }
        stats.record_damage(2);
        assert!(chill.check_defeat_condition(&stats));
        stats.record_damage(1);
        assert!(!chill.check_defeat_condition(&stats));
    }

    #[test]
    fn null_siren_disables_hints_in_the_ui_projection() {
        let siren = NullSiren::new();
        assert!(siren.ui_modifiers().hints_disabled);
        let modifiers = siren.stat_modifiers();
        assert_eq!(modifiers.explosion_reduction, Some(30));
        assert_eq!(modifiers.grace_reduction, Some(30));
        assert_eq!(modifiers.point_bonus_reduction, None);
    }
}
