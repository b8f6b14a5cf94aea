use serde::{Deserialize, Serialize};

/// 全局唯一的卡牌标识。
pub type CardId = u32;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardShape {
    Oval,
    Diamond,
    Squiggle,
}

pub const ALL_SHAPES: [CardShape; 3] = [CardShape::Oval, CardShape::Diamond, CardShape::Squiggle];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardColor {
    Red,
    Green,
    Purple,
}

pub const ALL_COLORS: [CardColor; 3] = [CardColor::Red, CardColor::Green, CardColor::Purple];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardShading {
    Solid,
    Striped,
    Open,
}

/// 场上使用的卡牌数据。属性字段在发牌后不变，
/// 状态标记只能通过 [`CardModification`] 修改。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub shape: CardShape,
    pub color: CardColor,
    pub count: u8,
    pub shading: CardShading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<CardColor>,
    #[serde(default)]
    pub is_dud: bool,
    #[serde(default)]
    pub is_face_down: bool,
    #[serde(default)]
    pub health: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bomb_timer_ms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_timer_ms: Option<u32>,
}

impl Card {
    pub fn new(id: CardId, shape: CardShape, color: CardColor, count: u8, shading: CardShading) -> Self {
        Self {
            id,
            shape,
            color,
            count,
            shading,
            background: None,
            is_dud: false,
            is_face_down: false,
            health: 0,
            bomb_timer_ms: None,
            countdown_timer_ms: None,
        }
    }

    pub fn with_background(mut self, background: CardColor) -> Self {
        self.background = Some(background);
        self
    }

    /// 可被选中参与配对的卡牌：既不是废牌也没有盖住。
    pub fn is_matchable(&self) -> bool {
        !self.is_dud && !self.is_face_down
    }

    pub fn is_triple(&self) -> bool {
        self.health > 0
    }

    pub fn apply(&mut self, change: &CardChange) {
        match change {
            CardChange::MakeDud => self.is_dud = true,
            CardChange::SetFaceDown { face_down } => self.is_face_down = *face_down,
            CardChange::SetHealth { health } => self.health = *health,
            CardChange::ArmBomb { timer_ms } => self.bomb_timer_ms = Some(*timer_ms),
            CardChange::DisarmBomb => self.bomb_timer_ms = None,
            CardChange::ArmCountdown { timer_ms } => self.countdown_timer_ms = Some(*timer_ms),
            CardChange::DisarmCountdown => self.countdown_timer_ms = None,
            CardChange::SetColor { color } => self.color = *color,
            CardChange::SetShape { shape } => self.shape = *shape,
        }
    }
}

/// 卡牌状态的修改指令。敌人只能通过这些记录改动卡牌，
/// 不允许整体替换字段。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum CardChange {
    MakeDud,
    SetFaceDown { face_down: bool },
    SetHealth { health: u8 },
    ArmBomb { timer_ms: u32 },
    DisarmBomb,
    ArmCountdown { timer_ms: u32 },
    DisarmCountdown,
    SetColor { color: CardColor },
    SetShape { shape: CardShape },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardModification {
    pub card_id: CardId,
    pub change: CardChange,
}

impl CardModification {
    pub fn new(card_id: CardId, change: CardChange) -> Self {
        Self { card_id, change }
    }
}
