use gameini::{Color, SourceLocation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Record kinds with a typed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Object,
    Weapon,
    Armor,
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "object" => Ok(RecordKind::Object),
            "weapon" => Ok(RecordKind::Weapon),
            "armor" => Ok(RecordKind::Armor),
            _ => Err(Error::UnknownRecordKind(s.to_string())),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Object => f.write_str("object"),
            RecordKind::Weapon => f.write_str("weapon"),
            RecordKind::Armor => f.write_str("armor"),
        }
    }
}

/// Collision shape tag plus its extents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub shape: String,
    pub major_radius: f64,
    pub minor_radius: f64,
    pub height: f64,
}

/// Module payload names, one list per category, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleLists {
    pub behavior: Vec<String>,
    pub draw: Vec<String>,
    pub body: Vec<String>,
    pub client_update: Vec<String>,
    pub locomotor: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioCues {
    pub voice_select: String,
    pub voice_move: String,
    pub voice_attack: String,
    pub sound_die: String,
}

/// An object template (unit, structure, prop) built from an `Object` or
/// `ObjectReskin` block.
///
/// Weapons, armor and the parent template are referenced by id only and
/// resolved through the [`crate::Repository`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub display_name: String,
    pub side: String,
    pub category: String,

    pub build_cost: i64,
    pub build_time: f64,
    pub buildable: bool,
    pub prerequisites: Vec<String>,

    pub max_health: f64,
    pub armor_set: String,
    pub weapon_set: String,

    pub vision_range: f64,
    pub shroud_clearing_range: f64,

    pub geometry: Geometry,

    pub display_color: Option<Color>,
    pub button_image: String,
    pub select_portrait: String,

    /// Uppercase capability tags, e.g. `INFANTRY`, `CAN_ATTACK`.
    pub kind_of: Vec<String>,

    /// Experience needed to reach each veterancy level.
    pub experience_required: Vec<i64>,
    /// Experience granted to the killer, per veterancy level.
    pub experience_value: Vec<i64>,

    pub modules: ModuleLists,
    pub audio: AudioCues,

    pub location: Option<SourceLocation>,
}

impl ObjectRecord {
    pub fn has_kind_of(&self, flag: &str) -> bool {
        self.kind_of.iter().any(|k| k.eq_ignore_ascii_case(flag))
    }

    /// Veterancy level reached with `experience` points (0 = rookie).
    pub fn veterancy_level(&self, experience: i64) -> usize {
        self.experience_required
            .iter()
            .skip(1)
            .take_while(|&&needed| experience >= needed)
            .count()
    }
}

/// A weapon template built from a `Weapon` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponRecord {
    pub id: String,
    pub primary_damage: f64,
    pub damage_type: String,
    pub primary_damage_radius: f64,
    pub attack_range: f64,
    pub minimum_attack_range: f64,
    pub delay_between_shots: f64,
    pub pre_attack_delay: f64,
    pub clip_size: i64,
    pub clip_reload_time: f64,
    pub projectile: String,
    pub fire_sound: String,

    pub anti_infantry: bool,
    pub anti_vehicle: bool,
    pub anti_structure: bool,
    pub anti_air: bool,

    pub veterancy_damage_multiplier: f64,
    pub veterancy_range_multiplier: f64,

    pub location: Option<SourceLocation>,
}

impl Default for WeaponRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            primary_damage: 0.0,
            damage_type: String::new(),
            primary_damage_radius: 0.0,
            attack_range: 0.0,
            minimum_attack_range: 0.0,
            delay_between_shots: 0.0,
            pre_attack_delay: 0.0,
            clip_size: 0,
            clip_reload_time: 0.0,
            projectile: String::new(),
            fire_sound: String::new(),
            anti_infantry: true,
            anti_vehicle: true,
            anti_structure: true,
            anti_air: false,
            veterancy_damage_multiplier: 1.0,
            veterancy_range_multiplier: 1.0,
            location: None,
        }
    }
}

/// Damage modifiers per damage type, built from an `Armor` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorRecord {
    pub id: String,
    pub default_modifier: f64,
    /// Keyed by uppercase damage type.
    pub modifiers: BTreeMap<String, f64>,
    pub location: Option<SourceLocation>,
}

impl Default for ArmorRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            default_modifier: 1.0,
            modifiers: BTreeMap::new(),
            location: None,
        }
    }
}

impl ArmorRecord {
    pub fn modifier_for(&self, damage_type: &str) -> f64 {
        self.modifiers
            .get(&damage_type.to_ascii_uppercase())
            .copied()
            .unwrap_or(self.default_modifier)
    }
}

/// Borrowed view of any stored record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordRef<'a> {
    Object(&'a ObjectRecord),
    Weapon(&'a WeaponRecord),
    Armor(&'a ArmorRecord),
}

impl RecordRef<'_> {
    pub fn id(&self) -> &str {
        match self {
            RecordRef::Object(r) => &r.id,
            RecordRef::Weapon(r) => &r.id,
            RecordRef::Armor(r) => &r.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            RecordRef::Object(_) => RecordKind::Object,
            RecordRef::Weapon(_) => RecordKind::Weapon,
            RecordRef::Armor(_) => RecordKind::Armor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_from_str() {
        assert_eq!("Object".parse::<RecordKind>().unwrap(), RecordKind::Object);
        assert_eq!("WEAPON".parse::<RecordKind>().unwrap(), RecordKind::Weapon);
        assert!(matches!(
            "locomotor".parse::<RecordKind>(),
            Err(Error::UnknownRecordKind(_))
        ));
    }

    #[test]
    fn test_veterancy_level() {
        let record = ObjectRecord {
            experience_required: vec![0, 50, 100, 200],
            ..Default::default()
        };
        assert_eq!(record.veterancy_level(0), 0);
        assert_eq!(record.veterancy_level(75), 1);
        assert_eq!(record.veterancy_level(200), 3);
        assert_eq!(ObjectRecord::default().veterancy_level(1000), 0);
    }

    #[test]
    fn test_armor_modifier_fallback() {
        let mut armor = ArmorRecord::default();
        armor.modifiers.insert("SMALL_ARMS".to_string(), 0.5);
        assert_eq!(armor.modifier_for("small_arms"), 0.5);
        assert_eq!(armor.modifier_for("FLAME"), 1.0);
    }
}
