//! Execution Planner
//!
//! Partitions the document's remaining work into ascending order levels,
//! each holding loose-serial items and parallel batches. Batches are a
//! scheduling recommendation for external actors; the engine never executes
//! anything itself.
//!
//! The plan is fully deterministic for a fixed document: levels ascend,
//! loose-serial items keep schema declaration order, and batch membership
//! follows the grouping key (declared parallel tag, else role) in first
//! declaration order. Recomputing after answers yields a strictly smaller
//! plan; a plan with no levels means no remaining work.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::inspect::semantic_violations;
use crate::models::document::Document;
use crate::models::response::FieldResponse;
use crate::models::schema::Role;

/// A unit of work: one actor's remaining fields within one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub group: String,
    pub role: Role,
    /// Grouping key: declared parallel tag, else the role name
    pub actor: String,
    /// Field ids still needing work, in declaration order
    pub remaining_fields: Vec<String>,
}

/// Items that different actors can work at the same time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanBatch {
    pub key: String,
    pub items: Vec<PlanItem>,
}

/// All work at one order level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLevel {
    pub order: i64,
    /// Items handled one at a time by a single primary actor
    pub loose_serial: Vec<PlanItem>,
    /// One batch per disjoint actor key
    pub parallel_batches: Vec<PlanBatch>,
}

/// The computed execution plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub levels: Vec<PlanLevel>,
}

impl ExecutionPlan {
    /// No remaining work at all
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Total count of fields across every item
    pub fn remaining_field_count(&self) -> usize {
        self.levels
            .iter()
            .map(|level| {
                level
                    .loose_serial
                    .iter()
                    .chain(level.parallel_batches.iter().flat_map(|b| b.items.iter()))
                    .map(|item| item.remaining_fields.len())
                    .sum::<usize>()
            })
            .sum()
    }

    /// Loose-serial items across all levels, levels ascending
    pub fn loose_serial(&self) -> impl Iterator<Item = &PlanItem> {
        self.levels.iter().flat_map(|l| l.loose_serial.iter())
    }

    /// Parallel batches across all levels, levels ascending
    pub fn parallel_batches(&self) -> impl Iterator<Item = &PlanBatch> {
        self.levels.iter().flat_map(|l| l.parallel_batches.iter())
    }
}

struct ItemBuild {
    group_id: String,
    role: Role,
    actor: String,
    fields: Vec<String>,
    /// First declaration index of any member field
    decl: usize,
    serial: bool,
}

/// Compute the execution plan over the document's remaining fields.
///
/// The document is expected to have passed structural validation already;
/// the planner does not re-validate.
pub fn compute_execution_plan(doc: &Document) -> ExecutionPlan {
    // Remaining work: unanswered fields, plus answered fields whose value
    // violates its constraints. Skipped and aborted fields are settled.
    struct Entry {
        field_id: String,
        depends_on: Option<String>,
        level: i64,
        item_idx: usize,
    }

    let mut levels: BTreeMap<i64, Vec<ItemBuild>> = BTreeMap::new();
    let mut entries: Vec<Entry> = Vec::new();
    let mut decl = 0usize;

    for (group_pos, group) in doc.schema.groups.iter().enumerate() {
        for field in &group.fields {
            let current_decl = decl;
            decl += 1;

            let remaining = match doc.response(&field.id) {
                FieldResponse::Unanswered => true,
                FieldResponse::Answered { value } => {
                    !semantic_violations(field, value).is_empty()
                }
                FieldResponse::Skipped { .. } | FieldResponse::Aborted { .. } => false,
            };
            if !remaining {
                continue;
            }

            let level = field
                .order
                .or(group.order)
                .unwrap_or(group_pos as i64);
            let actor = field
                .parallel_group
                .clone()
                .unwrap_or_else(|| field.role.as_str().to_string());

            let items = levels.entry(level).or_default();
            let item_idx = match items
                .iter()
                .position(|item| item.group_id == group.id && item.actor == actor)
            {
                Some(idx) => idx,
                None => {
                    items.push(ItemBuild {
                        group_id: group.id.clone(),
                        role: field.role.clone(),
                        actor,
                        fields: Vec::new(),
                        decl: current_decl,
                        serial: false,
                    });
                    items.len() - 1
                }
            };
            items[item_idx].fields.push(field.id.clone());
            items[item_idx].serial |= field.serial;

            entries.push(Entry {
                field_id: field.id.clone(),
                depends_on: field.depends_on.clone(),
                level,
                item_idx,
            });
        }
    }

    // A same-level dependency between two different items chains them onto
    // the serial track; cross-level dependencies are already sequenced by
    // the level ordering.
    let mut chained: Vec<(i64, usize)> = Vec::new();
    for entry in &entries {
        if let Some(dep) = &entry.depends_on {
            if let Some(target) = entries
                .iter()
                .find(|e| &e.field_id == dep && e.level == entry.level)
            {
                if target.item_idx != entry.item_idx {
                    chained.push((entry.level, entry.item_idx));
                    chained.push((target.level, target.item_idx));
                }
            }
        }
    }

    let mut plan = ExecutionPlan::default();
    for (order, items) in levels {
        let is_chained =
            |idx: usize| chained.iter().any(|(l, i)| *l == order && *i == idx);
        let forced_serial: Vec<usize> = (0..items.len())
            .filter(|&idx| items[idx].serial || is_chained(idx))
            .collect();
        let candidates: Vec<usize> = (0..items.len())
            .filter(|idx| !forced_serial.contains(idx))
            .collect();

        let mut distinct_keys: Vec<&str> = Vec::new();
        for &idx in &candidates {
            if !distinct_keys.contains(&items[idx].actor.as_str()) {
                distinct_keys.push(items[idx].actor.as_str());
            }
        }

        let mut loose_serial: Vec<&ItemBuild> =
            forced_serial.iter().map(|&idx| &items[idx]).collect();
        let mut parallel_batches = Vec::new();

        if distinct_keys.len() < 2 {
            // A single actor has nothing to parallelize against.
            loose_serial.extend(candidates.iter().map(|&idx| &items[idx]));
        } else {
            for key in distinct_keys {
                let members: Vec<PlanItem> = candidates
                    .iter()
                    .filter(|&&idx| items[idx].actor == key)
                    .map(|&idx| plan_item(&items[idx]))
                    .collect();
                parallel_batches.push(PlanBatch {
                    key: key.to_string(),
                    items: members,
                });
            }
        }

        loose_serial.sort_by_key(|item| item.decl);
        plan.levels.push(PlanLevel {
            order,
            loose_serial: loose_serial.into_iter().map(plan_item).collect(),
            parallel_batches,
        });
    }

    debug!(
        levels = plan.levels.len(),
        remaining = plan.remaining_field_count(),
        "computed execution plan"
    );
    plan
}

fn plan_item(build: &ItemBuild) -> PlanItem {
    PlanItem {
        group: build.group_id.clone(),
        role: build.role.clone(),
        actor: build.actor.clone(),
        remaining_fields: build.fields.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::patch::{apply_patches, Patch, PatchOperation};
    use serde_json::json;

    #[test]
    fn test_two_roles_split_into_parallel_batches() {
        let text = "::group{id=g}\n\n::field{id=a kind=text required=true role=user}\n\n::field{id=b kind=text required=true role=agent}\n";
        let doc = parse(text).unwrap();
        let plan = compute_execution_plan(&doc);

        assert_eq!(plan.levels.len(), 1);
        let level = &plan.levels[0];
        assert!(level.loose_serial.is_empty());
        assert_eq!(level.parallel_batches.len(), 2);
        assert_eq!(level.parallel_batches[0].key, "user");
        assert_eq!(level.parallel_batches[1].key, "agent");
    }

    #[test]
    fn test_shared_role_is_loose_serial() {
        let text = "::group{id=g}\n\n::field{id=a kind=text required=true}\n\n::field{id=b kind=text required=true}\n";
        let doc = parse(text).unwrap();
        let plan = compute_execution_plan(&doc);

        let level = &plan.levels[0];
        assert!(level.parallel_batches.is_empty());
        assert_eq!(level.loose_serial.len(), 1);
        assert_eq!(
            level.loose_serial[0].remaining_fields,
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_same_level_dependency_chains_to_serial() {
        let text = "::group{id=g}\n\n::field{id=a kind=text required=true role=user}\n\n::field{id=b kind=text required=true role=agent depends-on=a}\n";
        let doc = parse(text).unwrap();
        let plan = compute_execution_plan(&doc);

        let level = &plan.levels[0];
        assert!(level.parallel_batches.is_empty());
        assert_eq!(level.loose_serial.len(), 2);
        assert_eq!(level.loose_serial[0].remaining_fields, vec!["a".to_string()]);
    }

    #[test]
    fn test_levels_ascend_and_orders_are_honored() {
        let text = "::group{id=late order=5}\n\n::field{id=z kind=text required=true}\n\n::group{id=early order=1}\n\n::field{id=a kind=text required=true}\n\n::field{id=rush kind=text required=true order=0}\n";
        let doc = parse(text).unwrap();
        let plan = compute_execution_plan(&doc);

        let orders: Vec<i64> = plan.levels.iter().map(|l| l.order).collect();
        assert_eq!(orders, vec![0, 1, 5]);
        assert_eq!(plan.levels[0].loose_serial[0].remaining_fields, vec!["rush"]);
    }

    #[test]
    fn test_serial_marked_field_never_parallel() {
        let text = "::group{id=g}\n\n::field{id=a kind=text required=true role=user serial=true}\n\n::field{id=b kind=text required=true role=agent}\n";
        let doc = parse(text).unwrap();
        let plan = compute_execution_plan(&doc);

        // With `a` forced serial, `b` is the only parallel candidate left,
        // so no batch forms and both items run on the serial track.
        let level = &plan.levels[0];
        assert_eq!(level.loose_serial.len(), 2);
        assert_eq!(level.loose_serial[0].remaining_fields, vec!["a"]);
        assert_eq!(level.loose_serial[1].remaining_fields, vec!["b"]);
        assert!(level.parallel_batches.is_empty());
        assert_eq!(plan.remaining_field_count(), 2);
    }

    #[test]
    fn test_plan_shrinks_after_answers() {
        let text = "::group{id=g}\n\n::field{id=a kind=text required=true}\n\n::field{id=b kind=text required=true}\n";
        let doc = parse(text).unwrap();
        let before = compute_execution_plan(&doc);
        assert_eq!(before.remaining_field_count(), 2);

        let outcome = apply_patches(
            &doc,
            &[Patch {
                field_id: "a".to_string(),
                operation: PatchOperation::SetValue {
                    value: json!("done"),
                },
            }],
        );
        let after = compute_execution_plan(&outcome.document);
        assert_eq!(after.remaining_field_count(), 1);
        assert!(after
            .loose_serial()
            .all(|item| !item.remaining_fields.contains(&"a".to_string())));
    }

    #[test]
    fn test_empty_plan_when_nothing_remains() {
        let text = "::group{id=g}\n\n::field{id=a kind=text required=true}\n\n::response{state=answered}\ndone\n::end\n";
        let doc = parse(text).unwrap();
        let plan = compute_execution_plan(&doc);
        assert!(plan.is_empty());
        assert_eq!(plan.remaining_field_count(), 0);
    }

    #[test]
    fn test_parallel_tag_overrides_role_key() {
        let text = "::group{id=g}\n\n::field{id=a kind=text required=true role=user parallel=alpha}\n\n::field{id=b kind=text required=true role=user parallel=beta}\n";
        let doc = parse(text).unwrap();
        let plan = compute_execution_plan(&doc);

        let level = &plan.levels[0];
        assert_eq!(level.parallel_batches.len(), 2);
        assert_eq!(level.parallel_batches[0].key, "alpha");
        assert_eq!(level.parallel_batches[1].key, "beta");
    }
}
