use gameini::{Diagnostic, DiagnosticKind};

use crate::repository::Repository;
use crate::types::ObjectRecord;

/// "Still at its type default" test for an inheritable field.
trait Unset {
    fn is_unset(&self) -> bool;
}

impl Unset for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Unset for i64 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl Unset for f64 {
    fn is_unset(&self) -> bool {
        *self == 0.0
    }
}

impl<T> Unset for Vec<T> {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

/// One row of the inheritance table.
pub struct InheritedField {
    pub name: &'static str,
    pub is_unset: fn(&ObjectRecord) -> bool,
    pub copy: fn(&mut ObjectRecord, &ObjectRecord),
}

macro_rules! inherited {
    ($name:literal, $($field:ident).+) => {
        InheritedField {
            name: $name,
            is_unset: |r: &ObjectRecord| r.$($field).+.is_unset(),
            copy: |child: &mut ObjectRecord, parent: &ObjectRecord| {
                child.$($field).+ = parent.$($field).+.clone()
            },
        }
    };
}

/// Fields a child takes from its parent while its own value is unset.
/// Lists are replaced whole, never merged entry by entry.
pub const INHERITED_FIELDS: &[InheritedField] = &[
    inherited!("display_name", display_name),
    inherited!("side", side),
    inherited!("category", category),
    inherited!("build_cost", build_cost),
    inherited!("build_time", build_time),
    inherited!("max_health", max_health),
    inherited!("armor_set", armor_set),
    inherited!("weapon_set", weapon_set),
    inherited!("vision_range", vision_range),
    inherited!("shroud_clearing_range", shroud_clearing_range),
    inherited!("button_image", button_image),
    inherited!("kind_of", kind_of),
    inherited!("prerequisites", prerequisites),
    inherited!("modules.behavior", modules.behavior),
    inherited!("modules.draw", modules.draw),
];

/// Copies every unset field of `child` from `parent`. Returns how many
/// fields were filled.
pub fn inherit_from(child: &mut ObjectRecord, parent: &ObjectRecord) -> usize {
    let mut filled = 0;
    for field in INHERITED_FIELDS {
        if (field.is_unset)(child) && !(field.is_unset)(parent) {
            (field.copy)(child, parent);
            filled += 1;
        }
    }
    filled
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub inherited_fields: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolves parents for the objects named in `ids`.
///
/// Parents are read as they were before this pass started, so a field a
/// parent only gets from its own parent in the same pass does not reach the
/// grandchild. Propagation is one level deep.
pub fn resolve<'a>(
    repo: &mut Repository,
    ids: impl IntoIterator<Item = &'a str>,
) -> Resolution {
    let mut resolution = Resolution::default();
    let mut pending: Vec<(String, ObjectRecord)> = Vec::new();

    for id in ids {
        let Some(child) = repo.object(id) else {
            continue;
        };
        let Some(parent_id) = child.parent_id.as_deref() else {
            continue;
        };
        if parent_id == child.id {
            continue;
        }
        match repo.object(parent_id) {
            Some(parent) => pending.push((id.to_string(), parent.clone())),
            None => {
                let message = format!("{} names missing parent {}", child.id, parent_id);
                resolution.diagnostics.push(
                    Diagnostic::new(DiagnosticKind::MissingParent, child.location.clone(), message)
                        .emit(),
                );
            }
        }
    }

    for (id, parent) in pending {
        if let Some(child) = repo.object_mut(&id) {
            let filled = inherit_from(child, &parent);
            log::debug!("{} inherited {} fields from {}", id, filled, parent.id);
            resolution.inherited_fields += filled;
        }
    }
    resolution
}
