use std::fs;
use std::path::Path;

use gameini::DiagnosticKind;
use templates::{LoadOptions, RecordKind, RecordRef, Repository, TemplateDatabase};

fn write(root: &Path, rel: &str, content: &str) -> std::io::Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// A small data tree: the child lives in a file discovered before its parent.
fn build_tree(root: &Path) -> std::io::Result<()> {
    write(
        root,
        "a_reskins/Reskins.ini",
        r#"
ObjectReskin AmericaTankCrusaderGold AmericaTankCrusader
  BuildCost = 1200 ; gold plating
End
"#,
    )?;
    write(
        root,
        "b_objects/America.ini",
        r#"
Object AmericaTankCrusader
  DisplayName = "Crusader"
  Side = America
  BuildCost = 900
  BuildTime = 10
  ArmorSet = TankArmor
  WeaponSet = CrusaderGun
  VisionRange = 150
  KindOf = VEHICLE SELECTABLE CAN_ATTACK
  Behavior = AIUpdateInterface ModuleTag_01
  Draw = W3DTankDraw ModuleTag_02
End

Object AmericaInfantryRanger
  DisplayName = "Ranger"
  Side = America
  BuildCost = 225
  KindOf = INFANTRY SELECTABLE
End
"#,
    )?;
    write(
        root,
        "c_weapons/Weapon.ini",
        r#"
Weapon CrusaderGun
  PrimaryDamage = 60
  AttackRange = 150
End

Armor TankArmor
  Default = 100%
  SMALL_ARMS = 25%
End
"#,
    )?;
    write(
        root,
        "z_patch/Patch.ini",
        r#"
; Later files win on shared keys.
Object AmericaInfantryRanger
  BuildCost = 250
  Behavior = AIUpdateInterface
End
"#,
    )?;
    write(root, "notes.txt", "Object NotLoaded\nEnd\n")?;
    Ok(())
}

#[test]
fn test_load_directory_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    build_tree(temp_dir.path())?;

    let mut db = TemplateDatabase::new(LoadOptions::default());
    let mut seen = Vec::new();
    let report = db.load_directory_with_progress(temp_dir.path(), |p| {
        seen.push((p.index, p.total, p.blocks));
    })?;

    assert_eq!(seen, vec![(1, 4, 1), (2, 4, 2), (3, 4, 2), (4, 4, 1)]);
    assert_eq!(report.sources.len(), 4);
    assert_eq!(report.objects, 3);
    assert_eq!(report.weapons, 1);
    assert_eq!(report.armors, 1);
    assert!(report.diagnostics.is_empty());

    let repo = db.repository();
    assert!(repo.object("NotLoaded").is_none());

    // Parent was parsed after the child and still resolves.
    let gold = repo.object("AmericaTankCrusaderGold").unwrap();
    assert_eq!(gold.display_name, "Crusader");
    assert_eq!(gold.build_cost, 1200);
    assert_eq!(gold.modules.behavior, vec!["AIUpdateInterface"]);
    assert_eq!(gold.modules.draw, vec!["W3DTankDraw"]);
    assert_eq!(repo.weapon_for(gold).map(|w| w.attack_range), Some(150.0));
    assert_eq!(repo.armor_for(gold).map(|a| a.modifier_for("SMALL_ARMS")), Some(0.25));

    // Merged across files: patch cost wins, first file's name stays, modules append.
    let ranger = repo.object("AmericaInfantryRanger").unwrap();
    assert_eq!(ranger.build_cost, 250);
    assert_eq!(ranger.display_name, "Ranger");
    assert_eq!(ranger.modules.behavior, vec!["AIUpdateInterface"]);

    let vehicles = repo.enumerate(RecordKind::Object, |r| {
        matches!(r, RecordRef::Object(o) if o.has_kind_of("VEHICLE"))
    });
    assert_eq!(vehicles.len(), 2);
    assert_eq!(repo.buildable_objects().len(), 3);
    Ok(())
}

#[test]
fn test_max_depth_and_extension_options() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    build_tree(temp_dir.path())?;
    write(temp_dir.path(), "top.ini", "Weapon TopGun\nEnd\n")?;

    let options = LoadOptions {
        max_depth: Some(1),
        ..Default::default()
    };
    let files = templates::discover_files(temp_dir.path(), &options)?;
    assert_eq!(files.len(), 1);

    let options = LoadOptions {
        extension: "txt".to_string(),
        ..Default::default()
    };
    let mut repo = Repository::new();
    templates::load_directory(&mut repo, temp_dir.path(), &options)?;
    assert!(repo.object("NotLoaded").is_some());
    Ok(())
}

#[test]
fn test_unterminated_block_then_next_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    write(temp_dir.path(), "a.ini", "Object Cut\n  BuildCost = 5\n")?;
    write(temp_dir.path(), "b.ini", "Object Whole\n  BuildCost = 7\nEnd\n")?;

    let mut repo = Repository::new();
    let report = templates::load_directory(&mut repo, temp_dir.path(), &LoadOptions::default())?;

    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::UnterminatedBlock);
    assert_eq!(repo.object("Cut").map(|o| o.build_cost), Some(5));
    assert_eq!(repo.object("Whole").map(|o| o.build_cost), Some(7));
    Ok(())
}

#[test]
fn test_options_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("options.json");
    fs::write(&path, r#"{ "extension": "cfg", "follow_links": true }"#)?;
    let options = LoadOptions::from_json_file(&path)?;
    assert_eq!(options.extension, "cfg");
    assert!(options.follow_links);
    assert!(options.resolve_inheritance);

    fs::write(&path, "not json")?;
    assert!(matches!(
        LoadOptions::from_json_file(&path),
        Err(templates::Error::Options(_))
    ));
    Ok(())
}

#[test]
fn test_repository_serializes() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TemplateDatabase::default();
    db.load_text(
        "Object A\n  DisplayColor = R:1 G:2 B:3\nEnd\nUpgrade U\nEnd\n",
        "inline",
    );
    let json = serde_json::to_value(db.repository())?;
    assert_eq!(json["objects"]["A"]["display_color"]["g"], 2);
    assert!(json["blocks"]["Upgrade"]["U"].is_object());
    Ok(())
}
