use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::card::{Card, CardColor, CardShape};
use super::items::WeaponEffectKind;

/// 配对时由外层判定好的特殊标记，统计器只负责计数。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchFlags {
    #[serde(default)]
    pub all_attributes_differ: bool,
    #[serde(default)]
    pub all_same_color: bool,
}

/// 当前回合发生过的一切。由外层独占持有，
/// 只能通过下面的记录方法修改。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundStats {
    pub target_score: u32,

    // 配对计数
    pub total_matches: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    pub invalid_matches: u32,

    // 时间
    pub match_intervals_ms: Vec<u64>,
    pub time_remaining_ms: u64,

    // 卡牌状态计数
    pub cards_remaining: u32,
    pub triple_cards_cleared: u32,
    pub face_down_resolved: u32,
    pub bomb_cards_resolved: u32,
    pub countdown_cards_resolved: u32,

    // 属性覆盖
    pub shapes_seen: HashSet<CardShape>,
    pub colors_seen: HashSet<CardColor>,
    pub color_counts: HashMap<CardColor, u32>,
    pub all_different_matches: u32,
    pub same_color_matches: u32,

    // 资源
    pub hints_used: u32,
    pub hints_remaining: u32,
    pub graces_used: u32,
    pub graces_remaining: u32,
    pub damage_received: u32,
    pub weapon_effects_triggered: HashSet<WeaponEffectKind>,
}

impl RoundStats {
    pub fn new(target_score: u32, starting_hints: u32, starting_graces: u32) -> Self {
        Self {
            target_score,
            total_matches: 0,
            current_streak: 0,
            max_streak: 0,
            invalid_matches: 0,
            match_intervals_ms: Vec::new(),
            time_remaining_ms: 0,
            cards_remaining: 0,
            triple_cards_cleared: 0,
            face_down_resolved: 0,
            bomb_cards_resolved: 0,
            countdown_cards_resolved: 0,
            shapes_seen: HashSet::new(),
            colors_seen: HashSet::new(),
            color_counts: HashMap::new(),
            all_different_matches: 0,
            same_color_matches: 0,
            hints_used: 0,
            hints_remaining: starting_hints,
            graces_used: 0,
            graces_remaining: starting_graces,
            damage_received: 0,
            weapon_effects_triggered: HashSet::new(),
        }
    }

    pub fn record_valid_match(&mut self, cards: &[Card], interval_ms: u64, flags: MatchFlags) {
        self.total_matches += 1;
        self.current_streak += 1;
        self.max_streak = self.max_streak.max(self.current_streak);
        self.match_intervals_ms.push(interval_ms);

        for card in cards {
            self.shapes_seen.insert(card.shape);
            self.colors_seen.insert(card.color);
            *self.color_counts.entry(card.color).or_insert(0) += 1;
        }

        if flags.all_attributes_differ {
            self.all_different_matches += 1;
        }
        if flags.all_same_color {
            self.same_color_matches += 1;
        }
    }

    /// 无效配对：连击归零，历史最大值保持不变。
    pub fn record_invalid_match(&mut self) {
        self.invalid_matches += 1;
        self.current_streak = 0;
    }

    pub fn use_hint(&mut self) {
        self.hints_remaining = self.hints_remaining.saturating_sub(1);
        self.hints_used += 1;
    }

    pub fn use_grace(&mut self) {
        self.graces_remaining = self.graces_remaining.saturating_sub(1);
        self.graces_used += 1;
    }

    pub fn gain_hint(&mut self, amount: u32) {
        self.hints_remaining += amount;
    }

    pub fn gain_grace(&mut self, amount: u32) {
        self.graces_remaining += amount;
    }

    pub fn record_damage(&mut self, amount: u32) {
        self.damage_received += amount;
    }

    pub fn record_weapon_effect(&mut self, kind: WeaponEffectKind) {
        self.weapon_effects_triggered.insert(kind);
    }

    pub fn record_triple_cleared(&mut self) {
        self.triple_cards_cleared += 1;
    }

    pub fn record_face_down_resolved(&mut self) {
        self.face_down_resolved += 1;
    }

    pub fn record_bomb_resolved(&mut self) {
        self.bomb_cards_resolved += 1;
    }

    pub fn record_countdown_resolved(&mut self) {
        self.countdown_cards_resolved += 1;
    }

    pub fn set_time_remaining(&mut self, ms: u64) {
        self.time_remaining_ms = ms;
    }

    pub fn set_cards_remaining(&mut self, count: u32) {
        self.cards_remaining = count;
    }

    pub fn distinct_weapon_effects(&self) -> usize {
        self.weapon_effects_triggered.len()
    }

    /// 是否存在 `count` 次连续配对，其跨越的时间间隔之和
    /// 不超过 `window_ms`。首次配对前的间隔不计入窗口。
    pub fn has_rapid_match_run(&self, count: usize, window_ms: u64) -> bool {
        if count <= 1 {
            return self.total_matches as usize >= count;
        }
        let span = count - 1;
        let intervals = &self.match_intervals_ms;
        if intervals.len() < count {
            return false;
        }
        intervals[1..]
            .windows(span)
            .any(|window| window.iter().sum::<u64>() <= window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::{CardShading, CardShape};

    fn card(id: u32, color: CardColor, shape: CardShape) -> Card {
        Card::new(id, shape, color, 1, CardShading::Solid)
    }

    fn stats() -> RoundStats {
        RoundStats::new(500, 3, 2)
    }

    #[test]
    fn streak_resets_on_invalid_and_max_never_decreases() {
        let mut stats = stats();
        let cards = [card(1, CardColor::Red, CardShape::Oval)];

        stats.record_valid_match(&cards, 1000, MatchFlags::default());
        stats.record_valid_match(&cards, 1000, MatchFlags::default());
        stats.record_valid_match(&cards, 1000, MatchFlags::default());
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.max_streak, 3);

        stats.record_invalid_match();
        assert_eq!(stats.current_streak, 0, "invalid match must reset the streak");
        assert_eq!(stats.max_streak, 3, "max streak must survive the reset");

        stats.record_valid_match(&cards, 1000, MatchFlags::default());
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.max_streak, 3);
    }

    #[test]
    fn attribute_coverage_folds_matched_cards() {
        let mut stats = stats();
        let cards = [
            card(1, CardColor::Red, CardShape::Oval),
            card(2, CardColor::Green, CardShape::Diamond),
            card(3, CardColor::Red, CardShape::Squiggle),
        ];
        stats.record_valid_match(&cards, 2000, MatchFlags::default());

        assert_eq!(stats.colors_seen.len(), 2);
        assert_eq!(stats.shapes_seen.len(), 3);
        assert_eq!(stats.color_counts[&CardColor::Red], 2);
        assert_eq!(stats.color_counts[&CardColor::Green], 1);
    }

    #[test]
    fn specialty_flags_increment_their_counters() {
        let mut stats = stats();
        let cards = [card(1, CardColor::Red, CardShape::Oval)];
        stats.record_valid_match(
            &cards,
            1000,
            MatchFlags {
                all_attributes_differ: true,
                all_same_color: false,
            },
        );
        stats.record_valid_match(
            &cards,
            1000,
            MatchFlags {
                all_attributes_differ: false,
                all_same_color: true,
            },
        );
        assert_eq!(stats.all_different_matches, 1);
        assert_eq!(stats.same_color_matches, 1);
    }

    #[test]
    fn resource_counters_clamp_at_zero() {
        let mut stats = RoundStats::new(500, 1, 0);
        stats.use_hint();
        stats.use_hint();
        assert_eq!(stats.hints_remaining, 0, "remaining hints clamp at zero");
        assert_eq!(stats.hints_used, 2);

        stats.use_grace();
        assert_eq!(stats.graces_remaining, 0);
        assert_eq!(stats.graces_used, 1);

        stats.gain_grace(2);
        assert_eq!(stats.graces_remaining, 2);
    }

    #[test]
    fn weapon_effects_deduplicate_by_kind() {
        let mut stats = stats();
        stats.record_weapon_effect(WeaponEffectKind::GainGrace);
        stats.record_weapon_effect(WeaponEffectKind::GainGrace);
        stats.record_weapon_effect(WeaponEffectKind::AddTime);
        assert_eq!(stats.distinct_weapon_effects(), 2, "kinds count once each");
    }

    #[test]
    fn rapid_match_run_uses_spanning_intervals_only() {
        let mut stats = stats();
        let cards = [card(1, CardColor::Red, CardShape::Oval)];
        for interval in [5000, 3000, 5000] {
            stats.record_valid_match(&cards, interval, MatchFlags::default());
        }
        assert!(
            stats.has_rapid_match_run(3, 10_000),
            "3000 + 5000 = 8000 fits inside the 10s window"
        );

        let mut slow = RoundStats::new(500, 3, 2);
        for interval in [5000, 8000, 7000] {
            slow.record_valid_match(&cards, interval, MatchFlags::default());
        }
        assert!(
            !slow.has_rapid_match_run(3, 10_000),
            "8000 + 7000 = 15000 exceeds the 10s window"
        );
    }

    #[test]
    fn rapid_match_run_needs_enough_matches() {
        let mut stats = stats();
        let cards = [card(1, CardColor::Red, CardShape::Oval)];
        stats.record_valid_match(&cards, 100, MatchFlags::default());
        stats.record_valid_match(&cards, 100, MatchFlags::default());
        assert!(!stats.has_rapid_match_run(3, 10_000));
        assert!(stats.has_rapid_match_run(2, 10_000));
    }

    #[test]
    fn damage_accumulates_monotonically() {
        let mut stats = stats();
        stats.record_damage(1);
        stats.record_damage(2);
        assert_eq!(stats.damage_received, 3);
    }
}
