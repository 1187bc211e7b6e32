//! Mode/Model reconciliation.
//!
//! A pure decision: given the operating mode, the registry snapshot and the
//! currently selected model, which model (if any) should be switched to.
//! The controller calls it at exactly two points: a mode change and a
//! registry refresh.

use crate::model_registry::{is_sugar_model, Mode, ModelRegistrySnapshot, TRUCK_MODEL};

pub fn reconcile(
    mode: Mode,
    snapshot: &ModelRegistrySnapshot,
    selected: Option<&str>,
) -> Option<String> {
    match mode {
        Mode::Truck => {
            if snapshot.contains(TRUCK_MODEL) && selected != Some(TRUCK_MODEL) {
                Some(TRUCK_MODEL.to_string())
            } else {
                None
            }
        }
        Mode::Sugar => {
            if selected.is_some_and(is_sugar_model) {
                return None;
            }
            snapshot.sugar_models().next().map(str::to_string)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registries() -> Vec<ModelRegistrySnapshot> {
        vec![
            ModelRegistrySnapshot::new(&["best_dec20", "sugar_bag_a", "sugar_bag_b"], "best_dec20"),
            ModelRegistrySnapshot::new(&["sugar_bag_final", "best_dec20"], "sugar_bag_final"),
            ModelRegistrySnapshot::new(&["best_dec20"], "best_dec20"),
            ModelRegistrySnapshot::new(&["sugar_bag_improved"], "sugar_bag_improved"),
            ModelRegistrySnapshot::new(&[], ""),
        ]
    }

    #[test]
    fn test_plant_scenario() {
        let registry = registries().remove(0);

        assert_eq!(reconcile(Mode::Truck, &registry, Some("best_dec20")), None);
        assert_eq!(
            reconcile(Mode::Sugar, &registry, Some("best_dec20")),
            Some("sugar_bag_a".to_string())
        );
    }

    #[test]
    fn test_truck_requires_canonical_model() {
        let sugar_only = ModelRegistrySnapshot::new(&["sugar_bag_improved"], "sugar_bag_improved");
        assert_eq!(reconcile(Mode::Truck, &sugar_only, Some("sugar_bag_improved")), None);

        let registry = registries().remove(1);
        assert_eq!(
            reconcile(Mode::Truck, &registry, Some("sugar_bag_final")),
            Some("best_dec20".to_string())
        );
        assert_eq!(reconcile(Mode::Truck, &registry, None), Some("best_dec20".to_string()));
    }

    #[test]
    fn test_sugar_keeps_any_sugar_selection() {
        let registry = registries().remove(0);
        // Already on a sugar model, even one that is not first in the list.
        assert_eq!(reconcile(Mode::Sugar, &registry, Some("sugar_bag_b")), None);
    }

    #[test]
    fn test_sugar_without_sugar_models() {
        let registry = registries().remove(2);
        assert_eq!(reconcile(Mode::Sugar, &registry, Some("best_dec20")), None);
        assert_eq!(reconcile(Mode::Sugar, &registry, None), None);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let selections = [None, Some("best_dec20"), Some("sugar_bag_a"), Some("sugar_bag_final"), Some("other")];
        for registry in registries() {
            for mode in [Mode::Truck, Mode::Sugar] {
                for selected in selections {
                    if let Some(first) = reconcile(mode, &registry, selected) {
                        assert!(registry.contains(&first));
                        assert_eq!(
                            reconcile(mode, &registry, Some(&first)),
                            None,
                            "mode {:?} registry {:?} selected {:?}",
                            mode,
                            registry.available,
                            selected
                        );
                    }
                }
            }
        }
    }
}
