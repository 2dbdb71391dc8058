use std::collections::BTreeSet;
use trellis_core::{
    config::EngineConfig,
    db::{
        index::{IndexRegistry, TrieLookup},
        relation::ChildView,
    },
    error::IndexError,
    key,
    prelude::*,
    types::IdGenerator,
};

fn ids(n: usize) -> Vec<Id> {
    let mut generator = IdGenerator::new([7; 5], 0);

    (0..n).map(|_| generator.generate_at(1_700_000_000)).collect()
}

#[test]
fn unique_leaf_round_trip() {
    let [v] = ids(1)[..] else { unreachable!() };
    let mut index = UniqueIndex::new();

    index.set("k", v);
    assert_eq!(index.get("k"), Some(v));
    assert!(index.has("k"));

    index.delete("k");
    assert!(!index.has("k"));
}

#[test]
fn multi_value_leaf_orders_by_last_add() {
    let [v1, v2] = ids(2)[..] else { unreachable!() };
    let mut index = MultiValueIndex::new();

    index.add("k", v1);
    index.add("k", v1);
    assert_eq!(index.get("k").len(), 1);

    index.add("k", v2);
    index.add("k", v1);
    assert_eq!(index.get("k").to_vec(), vec![v2, v1]);
}

#[test]
fn composite_unique_prefix_and_cascade() {
    let [one, two] = ids(2)[..] else { unreachable!() };
    let mut index = CompositeUniqueIndex::new(2);

    index.set(&key!["x", "y"], one).unwrap();
    index.set(&key!["x", "z"], two).unwrap();
    assert_eq!(index.get_id(&key!["x", "y"]).unwrap(), Some(one));
    assert_eq!(index.get_id(&key!["x", "z"]).unwrap(), Some(two));

    let Ok(TrieLookup::Prefix(view)) = index.get(&key!["x"]) else {
        panic!("expected a prefix view");
    };
    assert_eq!(view.get(&key!["y"]).unwrap().found(), Some(&one));
    assert_eq!(view.get(&key!["z"]).unwrap().found(), Some(&two));

    assert!(index.delete(&key!["x", "y"], one).unwrap());
    assert!(!index.delete(&key!["x", "y"], one).unwrap());
    assert!(index.delete(&key!["x", "z"], two).unwrap());
    assert!(index.is_empty());
    assert_eq!(index.node_count(), 1);
}

#[test]
fn undefined_components() {
    let [v] = ids(1)[..] else { unreachable!() };

    let mut unique = CompositeUniqueIndex::new(2);
    unique.set(&key![UNDEFINED, "y"], v).unwrap();
    assert!(unique.is_empty());
    assert!(!unique.has(&key![UNDEFINED, "y"]).unwrap());

    let mut multi = CompositeMultiValueIndex::new(2);
    assert_eq!(multi.add(&key!["x", Option::<&str>::None], v).unwrap(), 1);
    assert!(multi.get(&key!["x", "anything"]).unwrap().is_absent());

    let view = multi.prefix(&key!["x"]).unwrap().expect("prefix view");
    assert_eq!(view.undefined().to_vec(), vec![v]);
}

#[test]
fn forbidden_operations_fail_fast() {
    let [v] = ids(1)[..] else { unreachable!() };

    let mut unique = CompositeUniqueIndex::new(2);
    let mut multi = CompositeMultiValueIndex::new(2);
    assert!(matches!(unique.clear(), Err(IndexError::Unsupported { .. })));
    assert!(matches!(multi.clear(), Err(IndexError::Unsupported { .. })));
    assert!(matches!(
        IndexWriter::set(&mut multi, &key!["x", "y"], v),
        Err(IndexError::ReadOnly { .. })
    ));
    assert!(matches!(
        unique.set(&key!["x"], v),
        Err(IndexError::Arity { .. })
    ));
}

#[test]
fn many_to_many_mirroring() {
    let [a, b, c] = ids(3)[..] else { unreachable!() };
    let tags: BTreeSet<Id> = [b, c].into_iter().collect();
    let mut relation = ManyToMany::new("post_tags");

    let mut members = relation.member_set(Side::Left, a, &tags);
    members.add(b).unwrap();
    members.add(c).unwrap();
    assert!(members.contains(b));
    assert!(relation.members(Side::Right, b).contains(a));

    relation.member_set(Side::Left, a, &tags).delete(b);
    assert!(!relation.members(Side::Right, b).contains(a));
    assert!(!relation.members(Side::Left, a).contains(b));

    relation.member_set(Side::Left, a, &tags).add(b).unwrap();
    relation.member_set(Side::Left, a, &tags).clear();
    assert!(relation.members(Side::Right, b).is_empty());
    assert!(relation.members(Side::Right, c).is_empty());
}

#[test]
fn one_to_many_reassignment() {
    let [p1, p2, child] = ids(3)[..] else { unreachable!() };
    let children: BTreeSet<Id> = [child].into_iter().collect();
    let mut relation = OneToMany::new("posts");

    relation.child_set(p1, &children).add(child).unwrap();
    relation.child_set(p2, &children).add(child).unwrap();

    let old: ChildView<'_> = relation.children(p1);
    assert!(!old.contains(child));
    assert!(relation.children(p2).contains(child));
    assert_eq!(relation.parent_of(child), Some(p2));
}

#[test]
fn registry_from_config() {
    let [v, w] = ids(2)[..] else { unreachable!() };
    let config = EngineConfig::from_toml_str("max_key_components = 3").unwrap();
    let models = [
        IndexModel::new("email", &["email"], true),
        IndexModel::new("city_street", &["city", "street"], false),
    ];
    let mut registry = IndexRegistry::from_models(config, models).unwrap();

    registry.insert("email", &key!["a@b.c"], v).unwrap();
    assert!(registry.insert("email", &key!["a@b.c"], w).unwrap_err().is_conflict());

    registry.insert("city_street", &key!["paris", "rivoli"], v).unwrap();
    registry.insert("city_street", &key!["paris", "rivoli"], w).unwrap();
    let lookup = registry
        .get("city_street")
        .unwrap()
        .get(&key!["paris"])
        .unwrap();
    assert_eq!(lookup.to_vec(), vec![v, w]);
}
