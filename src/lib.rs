pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use game::{
    apply_suppression, default_cap, effective_value, resolve_bridge_effects, resolve_cap,
    resolve_effective_stats, BridgeActivation, BridgeEffectSpec, BridgeTrigger, CapIncrease,
    CappedStat, Card, CardChange, CardColor, CardId, CardModification, CardRemovalReason, CardShading,
    CardShape, CounterBadge, Dummy, Enemy, EnemyCtor, EnemyEvent, EnemyMeta, EnemyRegistry,
    EnemyStatModifiers, EnemyUiModifiers, InactivityUi, MatchFlags, MatchOutcome, PlayerStats,
    RoundStartOutcome, RoundStats, ScoreDecayUi, StatEffects, TickOutcome, Weapon,
    WeaponEffectKind, WeaponRarity, MIN_BOARD_SIZE,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_board(board_json: &str) -> Result<Vec<Card>, JsValue> {
    serde_json::from_str(board_json).map_err(serde_to_js_error)
}

fn parse_items(items: JsValue) -> Result<Vec<Weapon>, JsValue> {
    from_value(items).map_err(JsValue::from)
}

fn rng_from(seed: Option<u32>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed as u64),
        None => SmallRng::from_entropy(),
    }
}

/// 一个回合的冒险模式引擎：持有回合统计与当前敌人，
/// 向 JS 外层暴露生命周期入口。
#[wasm_bindgen]
pub struct AdventureEngine {
    stats: RoundStats,
    enemy: Box<dyn Enemy>,
    round_over: bool,
}

#[wasm_bindgen]
impl AdventureEngine {
    /// 未知的敌人名会落到木桩敌人上，构造永不失败。
    #[wasm_bindgen(constructor)]
    pub fn new(
        enemy_name: &str,
        target_score: u32,
        starting_hints: u32,
        starting_graces: u32,
    ) -> AdventureEngine {
        let registry = EnemyRegistry::with_standard_enemies();
        AdventureEngine {
            stats: RoundStats::new(target_score, starting_hints, starting_graces),
            enemy: registry.create(enemy_name),
            round_over: false,
        }
    }

    pub fn enemy_meta_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.enemy.meta()).map_err(serde_to_js_error)
    }

    pub fn stats_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.stats).map_err(serde_to_js_error)
    }

    pub fn round_start_json(&mut self, board_json: &str) -> Result<String, JsValue> {
        let board = parse_board(board_json)?;
        let outcome = self.enemy.on_round_start(&board);
        serde_json::to_string(&outcome).map_err(serde_to_js_error)
    }

    pub fn tick_json(&mut self, delta_ms: u32, board_json: &str) -> Result<String, JsValue> {
        let board = parse_board(board_json)?;
        let outcome = self.enemy.on_tick(delta_ms as u64, &board);
        serde_json::to_string(&outcome).map_err(serde_to_js_error)
    }

    pub fn valid_match_json(
        &mut self,
        matched_json: &str,
        board_json: &str,
        interval_ms: u32,
        flags: JsValue,
    ) -> Result<String, JsValue> {
        let matched: Vec<Card> = serde_json::from_str(matched_json).map_err(serde_to_js_error)?;
        let board = parse_board(board_json)?;
        let flags: MatchFlags = if flags.is_undefined() || flags.is_null() {
            MatchFlags::default()
        } else {
            from_value(flags).map_err(JsValue::from)?
        };

        self.stats
            .record_valid_match(&matched, interval_ms as u64, flags);
        let outcome = self.enemy.on_valid_match(&matched, &board);
        serde_json::to_string(&outcome).map_err(serde_to_js_error)
    }

    pub fn invalid_match_json(
        &mut self,
        matched_json: &str,
        board_json: &str,
    ) -> Result<String, JsValue> {
        let matched: Vec<Card> = serde_json::from_str(matched_json).map_err(serde_to_js_error)?;
        let board = parse_board(board_json)?;

        self.stats.record_invalid_match();
        let outcome = self.enemy.on_invalid_match(&matched, &board);
        serde_json::to_string(&outcome).map_err(serde_to_js_error)
    }

    pub fn card_draw_json(&mut self, card_json: &str) -> Result<String, JsValue> {
        let card: Card = serde_json::from_str(card_json).map_err(serde_to_js_error)?;
        let transformed = self.enemy.on_card_draw(card);
        serde_json::to_string(&transformed).map_err(serde_to_js_error)
    }

    pub fn check_defeat(&self) -> bool {
        self.enemy.check_defeat_condition(&self.stats)
    }

    pub fn ui_modifiers_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.enemy.ui_modifiers()).map_err(serde_to_js_error)
    }

    pub fn stat_modifiers_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.enemy.stat_modifiers()).map_err(serde_to_js_error)
    }

    /// 回合结束钩子只会真正执行一次，提前结束也一样。
    pub fn end_round(&mut self) {
        if !self.round_over {
            self.round_over = true;
            self.enemy.on_round_end();
        }
    }

    // ---- 统计记录透传 ----

    pub fn use_hint(&mut self) {
        self.stats.use_hint();
    }

    pub fn use_grace(&mut self) {
        self.stats.use_grace();
    }

    pub fn gain_hint(&mut self, amount: u32) {
        self.stats.gain_hint(amount);
    }

    pub fn gain_grace(&mut self, amount: u32) {
        self.stats.gain_grace(amount);
    }

    pub fn record_damage(&mut self, amount: u32) {
        self.stats.record_damage(amount);
    }

    pub fn record_weapon_effect(&mut self, kind: JsValue) -> Result<(), JsValue> {
        let kind: WeaponEffectKind = from_value(kind).map_err(JsValue::from)?;
        self.stats.record_weapon_effect(kind);
        Ok(())
    }

    pub fn record_triple_cleared(&mut self) {
        self.stats.record_triple_cleared();
    }

    pub fn record_face_down_resolved(&mut self) {
        self.stats.record_face_down_resolved();
    }

    pub fn record_bomb_resolved(&mut self) {
        self.stats.record_bomb_resolved();
    }

    pub fn record_countdown_resolved(&mut self) {
        self.stats.record_countdown_resolved();
    }

    pub fn set_time_remaining(&mut self, ms: u32) {
        self.stats.set_time_remaining(ms as u64);
    }

    pub fn set_cards_remaining(&mut self, count: u32) {
        self.stats.set_cards_remaining(count);
    }
}

/// 返回一个新的回合统计，方便前端初始化或调试。
#[wasm_bindgen(js_name = "createRoundStats")]
pub fn create_round_stats(
    target_score: u32,
    starting_hints: u32,
    starting_graces: u32,
) -> Result<JsValue, JsValue> {
    to_value(&RoundStats::new(target_score, starting_hints, starting_graces)).map_err(JsValue::from)
}

/// 解析一次桥接效果。次级效果必须由调用方以
/// `is_cascade = true` 再次解析，保证最多一跳。
#[wasm_bindgen(js_name = "resolveBridgeEffects")]
pub fn resolve_bridge_effects_js(
    trigger: JsValue,
    items: JsValue,
    is_cascade: bool,
    seed: Option<u32>,
) -> Result<JsValue, JsValue> {
    let trigger: BridgeTrigger = from_value(trigger).map_err(JsValue::from)?;
    let items = parse_items(items)?;
    let mut rng = rng_from(seed);
    let activations = resolve_bridge_effects(trigger, &items, is_cascade, &mut rng);
    to_value(&activations).map_err(JsValue::from)
}

/// 对玩家属性施加敌人压制。
#[wasm_bindgen(js_name = "applySuppression")]
pub fn apply_suppression_js(stats: JsValue, modifiers: JsValue) -> Result<JsValue, JsValue> {
    let stats: PlayerStats = from_value(stats).map_err(JsValue::from)?;
    let modifiers: Option<EnemyStatModifiers> = if modifiers.is_undefined() || modifiers.is_null() {
        None
    } else {
        Some(from_value(modifiers).map_err(JsValue::from)?)
    };
    to_value(&apply_suppression(&stats, modifiers.as_ref())).map_err(JsValue::from)
}

/// 解析某个受限属性在当前装备下的上限。
#[wasm_bindgen(js_name = "resolveCap")]
pub fn resolve_cap_js(stat: JsValue, items: JsValue) -> Result<u32, JsValue> {
    let stat = from_value(stat).map_err(JsValue::from)?;
    let items = parse_items(items)?;
    Ok(resolve_cap(stat, &items))
}

/// 完整的回合属性解析：装备叠加、封顶、敌人压制。
#[wasm_bindgen(js_name = "resolveEffectiveStats")]
pub fn resolve_effective_stats_js(
    base: JsValue,
    items: JsValue,
    modifiers: JsValue,
) -> Result<JsValue, JsValue> {
    let base: PlayerStats = from_value(base).map_err(JsValue::from)?;
    let items = parse_items(items)?;
    let modifiers: Option<EnemyStatModifiers> = if modifiers.is_undefined() || modifiers.is_null() {
        None
    } else {
        Some(from_value(modifiers).map_err(JsValue::from)?)
    };
    to_value(&resolve_effective_stats(&base, &items, modifiers.as_ref())).map_err(JsValue::from)
}

/// 全部标准敌人的元数据，按名字排序。
#[wasm_bindgen(js_name = "enemyRoster")]
pub fn enemy_roster() -> Result<JsValue, JsValue> {
    let registry = EnemyRegistry::with_standard_enemies();
    let mut names = registry.names();
    names.sort_unstable();
    let metas: Vec<EnemyMeta> = names
        .iter()
        .map(|name| registry.create(name).meta().clone())
        .collect();
    to_value(&metas).map_err(JsValue::from)
}

fn sample_names(count: u32, exclude: JsValue, seed: Option<u32>) -> Result<Vec<String>, JsValue> {
    let exclude: Vec<String> = if exclude.is_undefined() || exclude.is_null() {
        Vec::new()
    } else {
        from_value(exclude).map_err(JsValue::from)?
    };
    let exclude_refs: Vec<&str> = exclude.iter().map(String::as_str).collect();
    let registry = EnemyRegistry::with_standard_enemies();
    let mut rng = rng_from(seed);
    Ok(registry
        .sample(count as usize, &exclude_refs, &mut rng)
        .iter()
        .map(|enemy| enemy.meta().name.clone())
        .collect())
}

/// 随机抽取互不相同的敌人名，候选不足时用木桩补齐。
#[wasm_bindgen(js_name = "sampleEnemyNames")]
pub fn sample_enemy_names(
    count: u32,
    exclude: JsValue,
    seed: Option<u32>,
) -> Result<JsValue, JsValue> {
    let names = sample_names(count, exclude, seed)?;
    to_value(&names).map_err(JsValue::from)
}

/// 延迟版本的敌人抽取，配合前端的选怪动画使用。
#[wasm_bindgen(js_name = "sampleEnemyNamesDelayed")]
pub fn sample_enemy_names_delayed(count: u32, exclude: JsValue, delay_ms: Option<u32>) -> Promise {
    let delay = delay_ms.unwrap_or(0);
    let names = sample_names(count, exclude, None);

    future_to_promise(async move {
        if delay > 0 {
            TimeoutFuture::new(delay).await;
        }
        let names = names?;
        let json = serde_json::to_string(&names).map_err(serde_to_js_error)?;
        Ok(JsValue::from_str(&json))
    })
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
