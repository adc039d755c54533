//! Element Kinds and Rule Table
//!
//! Every cave element is a plain enum variant. Its behaviour is looked up
//! in a static policy table instead of being dispatched through traits,
//! so each rule can be read (and tested) in one place.

use serde::{Serialize, Deserialize};
use sha2::Sha256;

use crate::core::hash::HashField;
use crate::game::config::ConfigError;

// =============================================================================
// ELEMENT KIND
// =============================================================================

/// Identity of the element occupying a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum ElementKind {
    /// Open space
    #[default]
    Empty = 0,
    /// Diggable earth
    Dirt = 1,
    /// Brick wall (round: things roll off it)
    BrickWall = 2,
    /// Indestructible wall; also what lies beyond the grid edge
    SteelWall = 3,
    /// Falling, rolling, pushable rock
    Boulder = 4,
    /// Falling, rolling collectible
    Diamond = 5,
    /// Left-turning monster, explodes to empty space
    Firefly = 6,
    /// Right-turning monster, explodes to diamonds
    Butterfly = 7,
    /// Spreading growth
    Amoeba = 8,
    /// Converts boulders and diamonds while active
    MagicWall = 9,
    /// Lets falling elements seep through at random
    Slime = 10,
    /// Explosion fragment that resolves to empty space
    Explosion = 11,
    /// Explosion fragment that resolves to a diamond
    DiamondBirth = 12,
    /// The player
    Player = 13,
    /// Wall that grows left and right into empty space
    HorizontalGrowingWall = 14,
    /// Wall that grows up and down into empty space
    VerticalGrowingWall = 15,
    /// Player's stand-in: catches falling diamonds, its death is the player's
    Voodoo = 16,
    /// What an exploded voodoo doll leaves behind
    Gravestone = 17,
}

impl ElementKind {
    /// Number of element kinds (size of the rule table).
    pub const COUNT: usize = 18;

    /// All kinds in code order.
    pub const ALL: [ElementKind; Self::COUNT] = [
        ElementKind::Empty,
        ElementKind::Dirt,
        ElementKind::BrickWall,
        ElementKind::SteelWall,
        ElementKind::Boulder,
        ElementKind::Diamond,
        ElementKind::Firefly,
        ElementKind::Butterfly,
        ElementKind::Amoeba,
        ElementKind::MagicWall,
        ElementKind::Slime,
        ElementKind::Explosion,
        ElementKind::DiamondBirth,
        ElementKind::Player,
        ElementKind::HorizontalGrowingWall,
        ElementKind::VerticalGrowingWall,
        ElementKind::Voodoo,
        ElementKind::Gravestone,
    ];

    /// Numeric code used by level loaders.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Get kind from its loader code.
    pub fn from_code(code: u8) -> Option<ElementKind> {
        Self::ALL.get(code as usize).copied()
    }

    /// Behaviour policy for this kind.
    #[inline]
    pub fn rules(self) -> &'static ElementRules {
        // Index is in range: COUNT matches the enum and the table length.
        &RULES[self as usize]
    }

    /// Firefly or butterfly.
    #[inline]
    pub const fn is_monster(self) -> bool {
        matches!(self, ElementKind::Firefly | ElementKind::Butterfly)
    }

    /// Explosion fragment of either flavour.
    #[inline]
    pub const fn is_fragment(self) -> bool {
        matches!(self, ElementKind::Explosion | ElementKind::DiamondBirth)
    }
}

impl HashField for ElementKind {
    #[inline]
    fn feed(&self, digest: &mut Sha256) {
        self.code().feed(digest);
    }
}

// =============================================================================
// RULE TABLE
// =============================================================================

/// What an element does when its cell is visited by the scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanBehavior {
    /// Nothing happens during the scan
    Inert,
    /// Gravity: fall, roll, impact
    Fallable,
    /// Monster turning left first
    Firefly,
    /// Monster turning right first
    Butterfly,
    /// Counted, checked for room, may grow
    Amoeba,
    /// Position recorded for the player phase
    Player,
    /// Grows left/right
    GrowHorizontal,
    /// Grows up/down
    GrowVertical,
}

/// What an explosion leaves behind once its fragments time out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlastKind {
    /// Fragments clear to empty space
    Empty,
    /// Fragments become diamonds
    Diamonds,
}

impl BlastKind {
    /// Fragment element that carries this outcome.
    pub const fn fragment(self) -> ElementKind {
        match self {
            BlastKind::Empty => ElementKind::Explosion,
            BlastKind::Diamonds => ElementKind::DiamondBirth,
        }
    }
}

/// Behaviour policy of one element kind.
#[derive(Clone, Copy, Debug)]
pub struct ElementRules {
    /// Kind this entry describes (must equal its table index)
    pub kind: ElementKind,
    /// Subject to gravity
    pub fallable: bool,
    /// Fallables roll off it
    pub rounded: bool,
    /// Explodes when a falling element lands on it
    pub crushable: bool,
    /// Replaced by fragments when caught in an explosion
    pub consumable: bool,
    /// Player walks through it, clearing it
    pub diggable: bool,
    /// Player collects it
    pub collectable: bool,
    /// Player can push it horizontally
    pub pushable: bool,
    /// Animation phase advances every tick
    pub animated: bool,
    /// Scan-phase state machine
    pub scan: ScanBehavior,
    /// What leaves the bottom of an active magic wall
    pub magic_output: Option<ElementKind>,
    /// Explosion outcome when this element is destroyed at the centre
    pub blast: BlastKind,
}

const INERT: ElementRules = ElementRules {
    kind: ElementKind::Empty,
    fallable: false,
    rounded: false,
    crushable: false,
    consumable: true,
    diggable: false,
    collectable: false,
    pushable: false,
    animated: false,
    scan: ScanBehavior::Inert,
    magic_output: None,
    blast: BlastKind::Empty,
};

/// Static rule table indexed by `ElementKind` code.
pub static RULES: [ElementRules; ElementKind::COUNT] = [
    ElementRules { kind: ElementKind::Empty, ..INERT },
    ElementRules { kind: ElementKind::Dirt, diggable: true, ..INERT },
    ElementRules { kind: ElementKind::BrickWall, rounded: true, ..INERT },
    ElementRules { kind: ElementKind::SteelWall, consumable: false, ..INERT },
    ElementRules {
        kind: ElementKind::Boulder,
        fallable: true,
        rounded: true,
        pushable: true,
        scan: ScanBehavior::Fallable,
        magic_output: Some(ElementKind::Diamond),
        ..INERT
    },
    ElementRules {
        kind: ElementKind::Diamond,
        fallable: true,
        rounded: true,
        collectable: true,
        animated: true,
        scan: ScanBehavior::Fallable,
        magic_output: Some(ElementKind::Boulder),
        ..INERT
    },
    ElementRules {
        kind: ElementKind::Firefly,
        crushable: true,
        animated: true,
        scan: ScanBehavior::Firefly,
        ..INERT
    },
    ElementRules {
        kind: ElementKind::Butterfly,
        crushable: true,
        animated: true,
        scan: ScanBehavior::Butterfly,
        blast: BlastKind::Diamonds,
        ..INERT
    },
    ElementRules { kind: ElementKind::Amoeba, animated: true, scan: ScanBehavior::Amoeba, ..INERT },
    ElementRules { kind: ElementKind::MagicWall, animated: true, ..INERT },
    ElementRules { kind: ElementKind::Slime, animated: true, ..INERT },
    ElementRules { kind: ElementKind::Explosion, consumable: false, ..INERT },
    ElementRules { kind: ElementKind::DiamondBirth, consumable: false, ..INERT },
    ElementRules {
        kind: ElementKind::Player,
        crushable: true,
        animated: true,
        scan: ScanBehavior::Player,
        ..INERT
    },
    ElementRules { kind: ElementKind::HorizontalGrowingWall, scan: ScanBehavior::GrowHorizontal, ..INERT },
    ElementRules { kind: ElementKind::VerticalGrowingWall, scan: ScanBehavior::GrowVertical, ..INERT },
    ElementRules { kind: ElementKind::Voodoo, rounded: true, crushable: true, ..INERT },
    ElementRules { kind: ElementKind::Gravestone, rounded: true, consumable: false, ..INERT },
];

/// Check that every kind has exactly its own rule-table entry.
///
/// Run before a cave is built; a mismatch is a configuration error.
pub fn validate_rule_table() -> Result<(), ConfigError> {
    for (index, kind) in ElementKind::ALL.iter().enumerate() {
        let entry = RULES.get(index).ok_or(ConfigError::MissingRule(*kind))?;
        if entry.kind != *kind || kind.code() as usize != index {
            return Err(ConfigError::MissingRule(*kind));
        }
    }
    Ok(())
}
