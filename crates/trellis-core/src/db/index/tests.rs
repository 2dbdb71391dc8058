use crate::{
    config::EngineConfig,
    db::index::{
        AnyIndex, CompositeMultiValueIndex, CompositeUniqueIndex, IndexRegistry, IndexWriter,
        Lookup, MultiValueIndex, TrieLookup, UniqueIndex,
    },
    error::{ErrorClass, IndexError},
    key::{KeyComponent, UNDEFINED},
    model::index::IndexModel,
    types::Id,
};
use proptest::prelude::*;

fn id(n: u8) -> Id {
    Id::from_bytes([n; 12])
}

//
// Leaf indexes
//

#[test]
fn unique_leaf_set_get_delete() {
    let mut index = UniqueIndex::new();

    index.set("ann", id(1));
    assert_eq!(index.get("ann"), Some(id(1)));
    assert!(index.has("ann"));

    assert!(index.delete("ann"));
    assert!(!index.has("ann"));
    assert_eq!(index.get("ann"), None);
    assert!(!index.delete("ann"));
}

#[test]
fn unique_leaf_last_write_wins() {
    let mut index = UniqueIndex::new();

    assert_eq!(index.set(7u8, id(1)), None);
    assert_eq!(index.set(7i64, id(2)), Some(id(1)));
    assert_eq!(index.get(7u32), Some(id(2)));
    assert_eq!(index.len(), 1);
}

#[test]
fn unique_writer_delete_requires_current_binding() {
    let mut index = UniqueIndex::new();
    IndexWriter::set(&mut index, &key!["ann"], id(1)).unwrap();
    IndexWriter::set(&mut index, &key!["ann"], id(2)).unwrap();

    assert!(!IndexWriter::delete(&mut index, &key!["ann"], id(1)).unwrap());
    assert_eq!(index.get("ann"), Some(id(2)));
    assert!(IndexWriter::delete(&mut index, &key!["ann"], id(2)).unwrap());
    assert!(index.is_empty());
}

#[test]
fn unique_writer_ignores_unset_component() {
    let mut index = UniqueIndex::new();

    assert_eq!(index.add(&key![UNDEFINED], id(1)).unwrap(), 0);
    assert!(index.is_empty());
}

#[test]
fn multi_add_twice_keeps_one() {
    let mut index = MultiValueIndex::new();
    index.add("k", id(1));
    index.add("k", id(1));

    assert_eq!(index.get("k").len(), 1);
    assert_eq!(index.len(), 1);
}

#[test]
fn readd_moves_id_to_end() {
    let mut index = MultiValueIndex::new();
    index.add("k", id(1));
    index.add("k", id(2));
    index.add("k", id(1));

    assert_eq!(index.get("k").to_vec(), vec![id(2), id(1)]);
}

#[test]
fn multi_delete_drops_emptied_key() {
    let mut index = MultiValueIndex::new();
    index.add("k", id(1));

    assert!(index.delete("k", id(1)));
    assert!(!index.has("k"));
    assert_eq!(index.key_count(), 0);
    assert!(!index.delete("k", id(1)));
}

#[test]
fn multi_get_miss_returns_shared_empty_set() {
    let index = MultiValueIndex::new();

    let a = index.get("a");
    let b = index.get("b");
    assert!(a.is_empty());
    assert!(std::ptr::eq(a, b));
    assert!(index.is_empty());
}

#[test]
fn multi_iter_keeps_within_key_order() {
    let mut index = MultiValueIndex::new();
    index.add("a", id(3));
    index.add("a", id(1));
    index.add("b", id(2));

    assert_eq!(index.iter().collect::<Vec<_>>(), vec![id(3), id(1), id(2)]);
}

//
// CompositeUniqueIndex
//

#[test]
fn composite_unique_exact_and_prefix_lookups() {
    let mut index = CompositeUniqueIndex::new(2);
    index.set(&key!["x", "y"], id(1)).unwrap();
    index.set(&key!["x", "z"], id(2)).unwrap();

    assert_eq!(index.get_id(&key!["x", "y"]).unwrap(), Some(id(1)));
    assert_eq!(index.get_id(&key!["x", "z"]).unwrap(), Some(id(2)));

    let view = index.prefix(&key!["x"]).unwrap().expect("prefix view");
    assert_eq!(view.missing_components(), 1);
    assert_eq!(view.get(&key!["y"]).unwrap().found(), Some(&id(1)));
    assert_eq!(view.get(&key!["z"]).unwrap().found(), Some(&id(2)));
    assert!(view.get(&key!["w"]).unwrap().is_absent());
    assert_eq!(view.to_vec(), vec![id(1), id(2)]);
}

#[test]
fn composite_unique_delete_cascades_to_empty_root() {
    let mut index = CompositeUniqueIndex::new(2);
    index.set(&key!["x", "y"], id(1)).unwrap();
    index.set(&key!["x", "z"], id(2)).unwrap();
    assert_eq!(index.node_count(), 2);

    assert!(index.delete(&key!["x", "y"], id(1)).unwrap());
    assert!(!index.delete(&key!["x", "y"], id(1)).unwrap());
    assert!(index.delete(&key!["x", "z"], id(2)).unwrap());

    assert!(index.is_empty());
    assert_eq!(index.len(), 0);
    assert_eq!(index.node_count(), 1);
    assert!(!index.has(&key!["x"]).unwrap());
}

#[test]
fn composite_unique_stale_delete_is_noop() {
    let mut index = CompositeUniqueIndex::new(2);
    index.set(&key!["x", "y"], id(1)).unwrap();
    index.set(&key!["x", "y"], id(2)).unwrap();

    assert!(!index.delete(&key!["x", "y"], id(1)).unwrap());
    assert_eq!(index.get_id(&key!["x", "y"]).unwrap(), Some(id(2)));
    assert_eq!(index.len(), 1);
}

#[test]
fn undefined_first_component_is_noop() {
    let mut index = CompositeUniqueIndex::new(2);
    index.set(&key![UNDEFINED, "y"], id(1)).unwrap();

    assert!(index.is_empty());
    assert_eq!(index.len(), 0);
    assert!(!index.has(&key![UNDEFINED, "y"]).unwrap());
    assert_eq!(index.iter().count(), 0);

    let mut multi = CompositeMultiValueIndex::new(2);
    assert_eq!(multi.add(&key![UNDEFINED, "y"], id(1)).unwrap(), 0);
    assert!(multi.is_empty());
}

#[test]
fn composite_unique_trailing_undefined_uses_bucket() {
    let mut index = CompositeUniqueIndex::new(2);
    index.set(&key!["x", UNDEFINED], id(1)).unwrap();
    index.set(&key!["x", UNDEFINED], id(2)).unwrap();

    // buckets are sets, both entries survive
    let view = index.prefix(&key!["x"]).unwrap().expect("prefix view");
    assert_eq!(view.undefined().to_vec(), vec![id(1), id(2)]);
    assert_eq!(index.len(), 2);
    assert!(!index.has(&key!["x", UNDEFINED]).unwrap());
}

#[test]
fn has_and_get_agree_on_unset_components() {
    let mut unique = CompositeUniqueIndex::new(2);
    unique.set(&key!["x", UNDEFINED], id(1)).unwrap();
    let mut multi = CompositeMultiValueIndex::new(2);
    multi.add(&key!["x", UNDEFINED], id(2)).unwrap();

    let keys = key!["x", UNDEFINED];
    assert!(!unique.has(&keys).unwrap());
    assert!(unique.get(&keys).unwrap().is_absent());
    assert!(!multi.has(&keys).unwrap());
    assert!(multi.get(&keys).unwrap().is_absent());

    let view = multi.prefix(&key!["x"]).unwrap().expect("prefix view");
    assert!(!view.has(&key![UNDEFINED]).unwrap());
    assert!(view.get(&key![UNDEFINED]).unwrap().is_absent());
}

#[test]
fn prefix_miss_returns_depth_tagged_sentinel() {
    let index = CompositeUniqueIndex::new(3);

    let a = index.prefix(&key!["nope"]).unwrap().expect("prefix view");
    let b = index.prefix(&key!["other"]).unwrap().expect("prefix view");
    assert!(a.is_sentinel() && b.is_sentinel());
    assert_eq!(a.missing_components(), 2);
    assert!(a.is_empty());
    assert_eq!(a.len(), 0);

    let deeper = a.get(&key!["y"]).unwrap().prefix().expect("prefix view");
    assert_eq!(deeper.missing_components(), 1);
    assert!(deeper.get(&key!["z"]).unwrap().is_absent());
}

#[test]
fn empty_key_returns_whole_index_view() {
    let mut index = CompositeUniqueIndex::new(2);
    index.set(&key!["x", "y"], id(1)).unwrap();

    let view = index.prefix(&key![]).unwrap().expect("root view");
    assert_eq!(view.missing_components(), 2);
    assert_eq!(view.to_vec(), vec![id(1)]);
}

#[test]
fn early_unset_component_never_matches() {
    let mut index = CompositeUniqueIndex::new(3);
    index.set(&key!["a", UNDEFINED, UNDEFINED], id(1)).unwrap();

    assert!(!index.has(&key!["a", UNDEFINED, "c"]).unwrap());
    assert!(!index.has(&key!["a", UNDEFINED]).unwrap());
    assert!(index.has(&key!["a"]).unwrap());
}

#[test]
fn mutators_require_full_key() {
    let mut index = CompositeUniqueIndex::new(2);

    assert_eq!(
        index.set(&key!["x"], id(1)),
        Err(IndexError::Arity {
            expected: 2,
            found: 1
        })
    );
    assert_eq!(
        index.delete(&key!["x", "y", "z"], id(1)),
        Err(IndexError::Arity {
            expected: 2,
            found: 3
        })
    );
    assert!(matches!(
        index.get(&key!["x", "y", "z"]),
        Err(IndexError::Arity { .. })
    ));
}

#[test]
fn component_count_is_bounded() {
    assert!(matches!(
        CompositeUniqueIndex::try_new(0),
        Err(IndexError::ComponentCount { found: 0, .. })
    ));
    assert!(CompositeMultiValueIndex::try_new(crate::MAX_KEY_COMPONENTS_LIMIT + 1).is_err());
    assert_eq!(CompositeUniqueIndex::try_new(3).unwrap().component_count(), 3);
}

//
// CompositeMultiValueIndex
//

#[test]
fn composite_multi_readd_moves_id_to_end() {
    let mut index = CompositeMultiValueIndex::new(2);
    index.add(&key!["x", "y"], id(1)).unwrap();
    index.add(&key!["x", "y"], id(2)).unwrap();
    index.add(&key!["x", "y"], id(1)).unwrap();

    let ids = index.get(&key!["x", "y"]).unwrap().found().expect("leaf").to_vec();
    assert_eq!(ids, vec![id(2), id(1)]);
    assert_eq!(index.len(), 2);
}

#[test]
fn composite_multi_add_reports_consumed_components() {
    let mut index = CompositeMultiValueIndex::new(3);

    assert_eq!(index.add(&key!["a", "b", "c"], id(1)).unwrap(), 3);
    assert_eq!(index.add(&key!["a", "b", UNDEFINED], id(2)).unwrap(), 2);
    assert_eq!(index.add(&key!["a", UNDEFINED, UNDEFINED], id(3)).unwrap(), 1);
}

#[test]
fn undefined_trailing_component_only_visible_through_bucket() {
    let mut index = CompositeMultiValueIndex::new(2);
    index.add(&key!["x", UNDEFINED], id(7)).unwrap();

    assert!(index.get(&key!["x", "a"]).unwrap().is_absent());
    assert!(!index.has(&key!["x", "a"]).unwrap());

    let view = index.prefix(&key!["x"]).unwrap().expect("prefix view");
    assert_eq!(view.undefined().to_vec(), vec![id(7)]);
    assert_eq!(index.iter().collect::<Vec<_>>(), vec![id(7)]);

    assert!(index.delete(&key!["x", UNDEFINED], id(7)).unwrap());
    assert!(index.is_empty());
    assert_eq!(index.node_count(), 1);
}

#[test]
fn iteration_is_depth_first_buckets_before_children() {
    let mut index = CompositeMultiValueIndex::new(3);
    index.add(&key!["a", "b", "c"], id(3)).unwrap();
    index.add(&key!["a", "b", UNDEFINED], id(2)).unwrap();
    index.add(&key!["a", UNDEFINED, UNDEFINED], id(1)).unwrap();
    index.add(&key!["b", "a", "a"], id(4)).unwrap();

    assert_eq!(
        index.iter().collect::<Vec<_>>(),
        vec![id(1), id(2), id(3), id(4)]
    );
}

#[test]
fn composite_multi_prefix_view_reads() {
    let mut index = CompositeMultiValueIndex::new(2);
    index.add(&key!["x", "y"], id(1)).unwrap();
    index.add(&key!["x", "y"], id(2)).unwrap();
    index.add(&key!["x", "z"], id(3)).unwrap();

    let view = index.prefix(&key!["x"]).unwrap().expect("prefix view");
    let ids = view.get(&key!["y"]).unwrap().found().expect("leaf").to_vec();
    assert_eq!(ids, vec![id(1), id(2)]);
    assert!(view.has(&key!["z"]).unwrap());
    assert_eq!(view.len(), 3);
}

//
// Forbidden operations
//

#[test]
fn clear_is_unsupported_on_every_index() {
    assert_eq!(
        UniqueIndex::new().clear(),
        Err(IndexError::Unsupported {
            op: "clear",
            target: "UniqueIndex"
        })
    );
    assert!(matches!(
        MultiValueIndex::new().clear(),
        Err(IndexError::Unsupported { .. })
    ));
    assert_eq!(
        CompositeUniqueIndex::new(2).clear(),
        Err(IndexError::Unsupported {
            op: "clear",
            target: "CompositeUniqueIndex"
        })
    );
    assert!(matches!(
        CompositeMultiValueIndex::new(2).clear(),
        Err(IndexError::Unsupported { .. })
    ));
}

#[test]
fn set_on_multi_valued_index_is_read_only() {
    let mut leaf = MultiValueIndex::new();
    assert_eq!(
        IndexWriter::set(&mut leaf, &key!["k"], id(1)),
        Err(IndexError::ReadOnly {
            target: "MultiValueIndex"
        })
    );

    let mut composite = CompositeMultiValueIndex::new(2);
    let err = IndexWriter::set(&mut composite, &key!["x", "y"], id(1)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "CompositeMultiValueIndex is read-only outside add()/delete()"
    );
    assert!(composite.is_empty());
}

//
// AnyIndex
//

#[test]
fn any_index_follows_model_kind() {
    let model = IndexModel::new("name_age", &["name", "age"], true);
    let mut index = AnyIndex::from_model(&model).unwrap();
    assert!(matches!(index, AnyIndex::CompositeUnique(_)));
    assert_eq!(index.component_count(), 2);

    index.set(&key!["ann", 30], id(1)).unwrap();
    assert!(matches!(
        index.get(&key!["ann", 30]).unwrap(),
        Lookup::Id(found) if found == id(1)
    ));
    assert!(index.get(&key!["ann"]).unwrap().is_prefix());
    // a miss above the last level yields an empty prefix view
    assert!(index.get(&key!["bob", 30]).unwrap().to_vec().is_empty());
    assert!(index.get(&key!["ann", 31]).unwrap().is_absent());

    assert!(index.conflicts(&key!["ann", 30], id(2)).unwrap());
    assert!(!index.conflicts(&key!["ann", 30], id(1)).unwrap());
    assert!(!index.conflicts(&key!["bob", 30], id(2)).unwrap());
}

#[test]
fn any_index_multi_value_surface() {
    let model = IndexModel::new("tag", &["tag"], false);
    let mut index = AnyIndex::from_model(&model).unwrap();

    assert_eq!(index.add(&key!["red"], id(1)).unwrap(), 1);
    assert_eq!(index.add(&key!["red"], id(2)).unwrap(), 1);
    assert_eq!(index.get(&key!["red"]).unwrap().to_vec(), vec![id(1), id(2)]);
    assert!(index.get(&key!["blue"]).unwrap().to_vec().is_empty());
    assert!(!index.conflicts(&key!["red"], id(3)).unwrap());
    assert!(matches!(
        index.set(&key!["red"], id(3)),
        Err(IndexError::ReadOnly { .. })
    ));
    assert_eq!(
        index.get(&key!["red", "x"]).unwrap_err(),
        IndexError::Arity {
            expected: 1,
            found: 2
        }
    );
    assert_eq!(index.ids().count(), 2);
}

//
// IndexRegistry
//

const EMAIL: IndexModel = IndexModel::new("email", &["email"], true);
const NAME_AGE: IndexModel = IndexModel::new("name_age", &["name", "age"], false);

#[test]
fn registry_builds_one_index_per_model() {
    let registry = IndexRegistry::from_models(EngineConfig::default(), [EMAIL, NAME_AGE]).unwrap();

    assert_eq!(registry.len(), 2);
    assert!(matches!(registry.get("email").unwrap(), AnyIndex::Unique(_)));
    assert_eq!(
        registry.models().map(|m| m.name).collect::<Vec<_>>(),
        vec!["email", "name_age"]
    );
}

#[test]
fn registry_rejects_duplicates_and_bad_shapes() {
    let mut registry = IndexRegistry::new(EngineConfig {
        max_key_components: 2,
        ..EngineConfig::default()
    });
    registry.register(EMAIL).unwrap();

    let dup = registry.register(EMAIL).unwrap_err();
    assert_eq!(dup.class, ErrorClass::InvariantViolation);

    let empty = registry
        .register(IndexModel::new("nothing", &[], false))
        .unwrap_err();
    assert_eq!(empty.class, ErrorClass::InvariantViolation);

    let wide = registry
        .register(IndexModel::new("wide", &["a", "b", "c"], false))
        .unwrap_err();
    assert_eq!(wide.class, ErrorClass::Unsupported);

    let missing = registry.get("nope").unwrap_err();
    assert_eq!(missing.class, ErrorClass::NotFound);
}

#[test]
fn registry_insert_enforces_uniqueness() {
    let mut registry = IndexRegistry::from_models(EngineConfig::default(), [EMAIL]).unwrap();
    let email = key!["ann@example.com"];

    registry.insert("email", &email, id(1)).unwrap();
    // rewriting the same binding is fine
    registry.insert("email", &email, id(1)).unwrap();

    let err = registry.insert("email", &email, id(2)).unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(
        err.message,
        "index constraint violation: email (email)"
    );

    assert!(registry.remove("email", &email, id(1)).unwrap());
    registry.insert("email", &email, id(2)).unwrap();
}

//
// Properties
//

fn arb_component() -> impl Strategy<Value = Option<KeyComponent>> {
    prop_oneof![
        3 => (0u8..3).prop_map(|n| Some(KeyComponent::Int(i128::from(n)))),
        1 => Just(None),
    ]
}

fn arb_key() -> impl Strategy<Value = Vec<Option<KeyComponent>>> {
    (0u8..3, arb_component(), arb_component()).prop_map(|(first, second, third)| {
        vec![Some(KeyComponent::Int(i128::from(first))), second, third]
    })
}

proptest! {
    #[test]
    fn multi_leaf_never_holds_duplicates(ops in prop::collection::vec((0u8..4, 0u8..6, any::<bool>()), 0..64)) {
        let mut index = MultiValueIndex::new();

        for (key, n, add) in ops {
            if add {
                index.add(key, id(n));
            } else {
                index.delete(key, id(n));
            }
        }

        for key in index.keys() {
            let ids = index.get(key).to_vec();
            let mut deduped = ids.clone();
            deduped.sort();
            deduped.dedup();

            prop_assert!(!ids.is_empty());
            prop_assert_eq!(ids.len(), deduped.len());
        }
    }

    #[test]
    fn deleting_every_entry_empties_the_trie(entries in prop::collection::vec((arb_key(), 0u8..8), 0..48)) {
        let mut index = CompositeMultiValueIndex::new(3);

        for (keys, n) in &entries {
            index.add(keys, id(*n)).unwrap();
        }
        for (keys, n) in &entries {
            index.delete(keys, id(*n)).unwrap();
        }

        prop_assert!(index.is_empty());
        prop_assert_eq!(index.len(), 0);
        prop_assert_eq!(index.node_count(), 1);
        prop_assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn stored_ids_match_len(entries in prop::collection::vec((arb_key(), 0u8..8), 0..48)) {
        let mut index = CompositeMultiValueIndex::new(3);

        for (keys, n) in &entries {
            index.add(keys, id(*n)).unwrap();
        }

        prop_assert_eq!(index.iter().count(), index.len());
        if let TrieLookup::Prefix(view) = index.get(&[]).unwrap() {
            prop_assert_eq!(view.len(), index.len());
        }
    }
}
