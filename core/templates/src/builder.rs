use gameini::{Block, BlockKind, Color, ModuleCategory, Properties, Value, parse_bool, parse_float};

use crate::types::{ArmorRecord, AudioCues, Geometry, ModuleLists, ObjectRecord, WeaponRecord};

/// What a block turns into. Kinds without a typed schema stay generic.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltRecord {
    Object(ObjectRecord),
    Weapon(WeaponRecord),
    Armor(ArmorRecord),
    Generic(Block),
}

pub fn build_record(block: Block) -> BuiltRecord {
    match block.kind {
        BlockKind::Object | BlockKind::ObjectReskin => BuiltRecord::Object(build_object(&block)),
        BlockKind::Weapon => BuiltRecord::Weapon(build_weapon(&block)),
        BlockKind::Armor => BuiltRecord::Armor(build_armor(&block)),
        _ => BuiltRecord::Generic(block),
    }
}

/// Typed reads over a property map. Each read takes alias keys in priority
/// order: the first key present decides, and if its value does not convert
/// the default is used (later aliases are not consulted).
///
/// A value of the wrong variant is converted only by rendering it to text and
/// parsing that text as the wanted type.
struct Fields<'a> {
    props: &'a Properties,
}

impl<'a> Fields<'a> {
    fn new(props: &'a Properties) -> Self {
        Self { props }
    }

    fn first(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter().find_map(|key| self.props.get(key))
    }

    fn string(&self, keys: &[&str]) -> String {
        self.first(keys).map(Value::to_string).unwrap_or_default()
    }

    fn int(&self, keys: &[&str], default: i64) -> i64 {
        match self.first(keys) {
            Some(Value::Int(v)) => *v,
            Some(other) => reparse_int(&other.to_string()).unwrap_or(default),
            None => default,
        }
    }

    fn float(&self, keys: &[&str], default: f64) -> f64 {
        match self.first(keys) {
            Some(Value::Float(v)) => *v,
            Some(other) => parse_float(other.to_string().trim()).unwrap_or(default),
            None => default,
        }
    }

    fn boolean(&self, keys: &[&str], default: bool) -> bool {
        match self.first(keys) {
            Some(Value::Bool(v)) => *v,
            Some(other) => reparse_bool(&other.to_string()).unwrap_or(default),
            None => default,
        }
    }

    fn color(&self, keys: &[&str]) -> Option<Color> {
        self.first(keys).and_then(Value::as_color)
    }

    /// A list or a single space-separated string, as uppercase tags.
    fn tags(&self, keys: &[&str]) -> Vec<String> {
        match self.first(keys) {
            Some(Value::List(items)) => items
                .iter()
                .flat_map(|item| split_tags(&item.to_string()))
                .collect(),
            Some(other) => split_tags(&other.to_string()),
            None => Vec::new(),
        }
    }

    /// One bare number or a list of them.
    fn ints(&self, keys: &[&str]) -> Vec<i64> {
        match self.first(keys) {
            Some(Value::Int(v)) => vec![*v],
            Some(Value::List(items)) => items
                .iter()
                .filter_map(|item| reparse_int(&item.to_string()))
                .collect(),
            Some(other) => reparse_int(&other.to_string()).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

fn split_tags(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|tag| tag.to_ascii_uppercase())
        .collect()
}

fn reparse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| parse_float(text).map(|v| v.trunc() as i64))
}

fn reparse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "1" => Some(true),
        "0" => Some(false),
        other => parse_bool(other),
    }
}

fn module_names(block: &Block, category: ModuleCategory) -> Vec<String> {
    block
        .modules_of(category)
        .map(|m| m.payload.clone())
        .collect()
}

pub fn build_object(block: &Block) -> ObjectRecord {
    let f = Fields::new(&block.properties);

    // `Buildable` also takes words like `Only_By_AI`; only an explicit no
    // turns it off.
    let buildable = match f.first(&["Buildable"]) {
        Some(Value::Bool(v)) => *v,
        Some(other) => reparse_bool(&other.to_string()).unwrap_or(true),
        None => true,
    };

    ObjectRecord {
        id: block.name.clone(),
        parent_id: block.parent_name.clone(),
        display_name: f.string(&["DisplayName"]),
        side: f.string(&["Side"]),
        category: f.string(&["EditorSorting", "Category"]),

        build_cost: f.int(&["BuildCost", "Cost"], 0),
        build_time: f.float(&["BuildTime"], 0.0),
        buildable,
        prerequisites: f.tags(&["Prerequisites", "Prerequisite"]),

        max_health: f.float(&["MaxHealth", "Health"], 0.0),
        armor_set: f.string(&["ArmorSet", "Armor"]),
        weapon_set: f.string(&["WeaponSet", "Weapon"]),

        vision_range: f.float(&["VisionRange"], 0.0),
        shroud_clearing_range: f.float(&["ShroudClearingRange"], 0.0),

        geometry: Geometry {
            shape: f.string(&["Geometry"]).to_ascii_uppercase(),
            major_radius: f.float(&["GeometryMajorRadius"], 0.0),
            minor_radius: f.float(&["GeometryMinorRadius"], 0.0),
            height: f.float(&["GeometryHeight"], 0.0),
        },

        display_color: f.color(&["DisplayColor", "Color"]),
        button_image: f.string(&["ButtonImage"]),
        select_portrait: f.string(&["SelectPortrait"]),

        kind_of: f.tags(&["KindOf"]),
        experience_required: f.ints(&["ExperienceRequired"]),
        experience_value: f.ints(&["ExperienceValue"]),

        modules: ModuleLists {
            behavior: module_names(block, ModuleCategory::Behavior),
            draw: module_names(block, ModuleCategory::Draw),
            body: module_names(block, ModuleCategory::Body),
            client_update: module_names(block, ModuleCategory::ClientUpdate),
            locomotor: module_names(block, ModuleCategory::Locomotor),
        },
        audio: AudioCues {
            voice_select: f.string(&["VoiceSelect"]),
            voice_move: f.string(&["VoiceMove"]),
            voice_attack: f.string(&["VoiceAttack"]),
            sound_die: f.string(&["SoundDie"]),
        },

        location: Some(block.location.clone()),
    }
}

pub fn build_weapon(block: &Block) -> WeaponRecord {
    let f = Fields::new(&block.properties);
    let defaults = WeaponRecord::default();

    WeaponRecord {
        id: block.name.clone(),
        primary_damage: f.float(&["PrimaryDamage", "Damage"], 0.0),
        damage_type: f.string(&["DamageType"]).to_ascii_uppercase(),
        primary_damage_radius: f.float(&["PrimaryDamageRadius", "Radius"], 0.0),
        attack_range: f.float(&["AttackRange", "Range"], 0.0),
        minimum_attack_range: f.float(&["MinimumAttackRange", "MinRange"], 0.0),
        delay_between_shots: f.float(&["DelayBetweenShots", "FireDelay"], 0.0),
        pre_attack_delay: f.float(&["PreAttackDelay"], 0.0),
        clip_size: f.int(&["ClipSize", "Clip"], 0),
        clip_reload_time: f.float(&["ClipReloadTime", "ReloadTime"], 0.0),
        projectile: f.string(&["ProjectileObject"]),
        fire_sound: f.string(&["FireSound"]),

        anti_infantry: f.boolean(&["AntiInfantry", "CanTargetInfantry"], defaults.anti_infantry),
        anti_vehicle: f.boolean(&["AntiVehicle", "CanTargetVehicle"], defaults.anti_vehicle),
        anti_structure: f.boolean(
            &["AntiStructure", "CanTargetStructure"],
            defaults.anti_structure,
        ),
        anti_air: f.boolean(&["AntiAir", "CanTargetAir"], defaults.anti_air),

        veterancy_damage_multiplier: f.float(
            &["VeterancyDamageMultiplier"],
            defaults.veterancy_damage_multiplier,
        ),
        veterancy_range_multiplier: f.float(
            &["VeterancyRangeMultiplier"],
            defaults.veterancy_range_multiplier,
        ),

        location: Some(block.location.clone()),
    }
}

/// Every property is `<DAMAGE_TYPE> = <modifier>`; `Default` sets the fallback.
pub fn build_armor(block: &Block) -> ArmorRecord {
    let mut armor = ArmorRecord {
        id: block.name.clone(),
        location: Some(block.location.clone()),
        ..Default::default()
    };

    for (key, value) in block.properties.iter() {
        let modifier = match value {
            Value::Float(v) => Some(*v),
            other => parse_float(other.to_string().trim()),
        };
        let Some(modifier) = modifier else {
            log::warn!(
                "{}: armor {} has a non-numeric modifier for {}: {}",
                block.location,
                block.name,
                key,
                value
            );
            continue;
        };
        if key.eq_ignore_ascii_case("default") {
            armor.default_modifier = modifier;
        } else {
            armor.modifiers.insert(key.to_ascii_uppercase(), modifier);
        }
    }
    armor
}
