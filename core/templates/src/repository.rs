use gameini::{Block, BlockKind};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::builder::BuiltRecord;
use crate::types::{ArmorRecord, ObjectRecord, RecordKind, RecordRef, WeaponRecord};

/// In-memory store of everything one load session produced, one map per
/// record kind. Ids are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Repository {
    objects: BTreeMap<String, ObjectRecord>,
    weapons: BTreeMap<String, WeaponRecord>,
    armors: BTreeMap<String, ArmorRecord>,
    /// Blocks of kinds that have no typed record.
    blocks: BTreeMap<BlockKind, BTreeMap<String, Block>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryCounts {
    pub objects: usize,
    pub weapons: usize,
    pub armors: usize,
    pub generic_blocks: usize,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.weapons.clear();
        self.armors.clear();
        self.blocks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
            && self.weapons.is_empty()
            && self.armors.is_empty()
            && self.blocks.is_empty()
    }

    pub fn counts(&self) -> RepositoryCounts {
        RepositoryCounts {
            objects: self.objects.len(),
            weapons: self.weapons.len(),
            armors: self.armors.len(),
            generic_blocks: self.blocks.values().map(BTreeMap::len).sum(),
        }
    }

    /// Stores a built record, replacing any record with the same kind and id.
    pub fn insert(&mut self, record: BuiltRecord) {
        match record {
            BuiltRecord::Object(r) => {
                self.insert_object(r);
            }
            BuiltRecord::Weapon(r) => {
                self.insert_weapon(r);
            }
            BuiltRecord::Armor(r) => {
                self.insert_armor(r);
            }
            BuiltRecord::Generic(b) => {
                self.insert_block(b);
            }
        }
    }

    pub fn insert_object(&mut self, record: ObjectRecord) -> Option<ObjectRecord> {
        self.objects.insert(record.id.clone(), record)
    }

    pub fn insert_weapon(&mut self, record: WeaponRecord) -> Option<WeaponRecord> {
        self.weapons.insert(record.id.clone(), record)
    }

    pub fn insert_armor(&mut self, record: ArmorRecord) -> Option<ArmorRecord> {
        self.armors.insert(record.id.clone(), record)
    }

    pub fn insert_block(&mut self, block: Block) -> Option<Block> {
        self.blocks
            .entry(block.kind)
            .or_default()
            .insert(block.name.clone(), block)
    }

    pub fn object(&self, id: &str) -> Option<&ObjectRecord> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: &str) -> Option<&mut ObjectRecord> {
        self.objects.get_mut(id)
    }

    pub fn weapon(&self, id: &str) -> Option<&WeaponRecord> {
        self.weapons.get(id)
    }

    pub fn armor(&self, id: &str) -> Option<&ArmorRecord> {
        self.armors.get(id)
    }

    pub fn block(&self, kind: BlockKind, name: &str) -> Option<&Block> {
        self.blocks.get(&kind).and_then(|blocks| blocks.get(name))
    }

    pub fn blocks(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.blocks.get(&kind).into_iter().flat_map(BTreeMap::values)
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.objects.values()
    }

    pub fn weapons(&self) -> impl Iterator<Item = &WeaponRecord> {
        self.weapons.values()
    }

    pub fn armors(&self) -> impl Iterator<Item = &ArmorRecord> {
        self.armors.values()
    }

    pub fn lookup(&self, kind: RecordKind, id: &str) -> Option<RecordRef<'_>> {
        match kind {
            RecordKind::Object => self.object(id).map(RecordRef::Object),
            RecordKind::Weapon => self.weapon(id).map(RecordRef::Weapon),
            RecordKind::Armor => self.armor(id).map(RecordRef::Armor),
        }
    }

    /// All records of `kind` accepted by `predicate`, in id order.
    pub fn enumerate<F>(&self, kind: RecordKind, predicate: F) -> Vec<RecordRef<'_>>
    where
        F: Fn(&RecordRef<'_>) -> bool,
    {
        let all: Box<dyn Iterator<Item = RecordRef<'_>> + '_> = match kind {
            RecordKind::Object => Box::new(self.objects.values().map(RecordRef::Object)),
            RecordKind::Weapon => Box::new(self.weapons.values().map(RecordRef::Weapon)),
            RecordKind::Armor => Box::new(self.armors.values().map(RecordRef::Armor)),
        };
        all.filter(|r| predicate(r)).collect()
    }

    pub fn objects_where<F>(&self, predicate: F) -> Vec<&ObjectRecord>
    where
        F: Fn(&ObjectRecord) -> bool,
    {
        self.objects.values().filter(|r| predicate(r)).collect()
    }

    pub fn objects_by_side(&self, side: &str) -> Vec<&ObjectRecord> {
        self.objects_where(|r| r.side.eq_ignore_ascii_case(side))
    }

    pub fn objects_with_kind_of(&self, flag: &str) -> Vec<&ObjectRecord> {
        self.objects_where(|r| r.has_kind_of(flag))
    }

    /// Objects a player could produce: buildable and not free.
    pub fn buildable_objects(&self) -> Vec<&ObjectRecord> {
        self.objects_where(|r| r.buildable && r.build_cost > 0)
    }

    pub fn weapon_for(&self, object: &ObjectRecord) -> Option<&WeaponRecord> {
        self.weapon(&object.weapon_set)
    }

    pub fn armor_for(&self, object: &ObjectRecord) -> Option<&ArmorRecord> {
        self.armor(&object.armor_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(id: &str, side: &str, cost: i64, kind_of: &[&str]) -> ObjectRecord {
        ObjectRecord {
            id: id.to_string(),
            side: side.to_string(),
            build_cost: cost,
            buildable: true,
            kind_of: kind_of.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sample() -> Repository {
        let mut repo = Repository::new();
        repo.insert_object(object("Ranger", "America", 225, &["INFANTRY"]));
        repo.insert_object(object("Rebel", "GLA", 150, &["INFANTRY"]));
        repo.insert_object(object("Crusader", "America", 900, &["VEHICLE"]));
        repo.insert_object(object("Tree", "", 0, &[]));
        let mut tank = object("Scorpion", "GLA", 600, &["VEHICLE"]);
        tank.buildable = false;
        tank.weapon_set = "ScorpionGun".to_string();
        tank.armor_set = "TankArmor".to_string();
        repo.insert_object(tank);
        repo.insert_weapon(WeaponRecord {
            id: "ScorpionGun".to_string(),
            ..Default::default()
        });
        repo
    }

    #[test]
    fn test_lookup_and_counts() {
        let repo = sample();
        assert_eq!(repo.counts().objects, 5);
        assert_eq!(repo.counts().weapons, 1);
        assert!(repo.lookup(RecordKind::Object, "Ranger").is_some());
        assert!(repo.lookup(RecordKind::Object, "ranger").is_none());
        assert_eq!(
            repo.lookup(RecordKind::Weapon, "ScorpionGun").map(|r| r.kind()),
            Some(RecordKind::Weapon)
        );
        assert!(repo.lookup(RecordKind::Armor, "TankArmor").is_none());
    }

    #[test]
    fn test_predicates() {
        let repo = sample();
        let ids = |v: Vec<&ObjectRecord>| v.into_iter().map(|r| r.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(repo.objects_by_side("america")), vec!["Crusader", "Ranger"]);
        assert_eq!(ids(repo.objects_with_kind_of("infantry")), vec!["Ranger", "Rebel"]);
        assert_eq!(ids(repo.buildable_objects()), vec!["Crusader", "Ranger", "Rebel"]);

        let cheap = repo.enumerate(RecordKind::Object, |r| match r {
            RecordRef::Object(o) => o.build_cost > 0 && o.build_cost < 300,
            _ => false,
        });
        let cheap: Vec<_> = cheap.iter().map(|r| r.id()).collect();
        assert_eq!(cheap, vec!["Ranger", "Rebel"]);
    }

    #[test]
    fn test_references_resolve_by_lookup() {
        let repo = sample();
        let tank = repo.object("Scorpion").unwrap();
        assert_eq!(repo.weapon_for(tank).map(|w| w.id.as_str()), Some("ScorpionGun"));
        assert!(repo.armor_for(tank).is_none());
    }

    #[test]
    fn test_replace_and_clear() {
        let mut repo = sample();
        let old = repo.insert_object(object("Ranger", "America", 300, &[]));
        assert_eq!(old.map(|r| r.build_cost), Some(225));
        assert_eq!(repo.object("Ranger").map(|r| r.build_cost), Some(300));

        repo.clear();
        assert!(repo.is_empty());
        assert_eq!(repo.counts(), RepositoryCounts::default());
    }
}
