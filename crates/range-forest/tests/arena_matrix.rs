use range_forest::{
    AllocationMode, Error, InsertMode, OrderedMap, RangeMap, Strategy, Tree, TreeOptions,
};

fn fixed_capacity_exhaustion<S: Strategy>() {
    let mut map = OrderedMap::<i32, &str, S>::with_options(TreeOptions::fixed(2)).unwrap();
    map.add(1, "one").unwrap();
    map.add(2, "two").unwrap();
    assert_eq!(map.add(3, "three"), Err(Error::OutOfMemory));
    map.assert_valid().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.try_get_value(&1), Some(&"one"));
    assert_eq!(map.try_get_value(&2), Some(&"two"));
    assert_eq!(map.try_get_value(&3), None);

    // An existing key needs no slot.
    assert_eq!(map.set(2, "TWO"), Ok(()));
    assert_eq!(map.try_get_value(&2), Some(&"TWO"));

    map.remove(&1).unwrap();
    map.add(3, "three").unwrap();
    map.assert_valid().unwrap();
    assert_eq!(map.tree().arena().capacity(), 2);
}

fn fixed_range_map_keeps_extent<S: Strategy>() {
    let mut map = RangeMap::<u8, S>::with_options(TreeOptions::fixed(1)).unwrap();
    map.insert(0, 4, 1).unwrap();
    assert_eq!(map.insert(4, 2, 2), Err(Error::OutOfMemory));
    assert_eq!(map.extent(), 4);
    assert_eq!(map.len(), 1);
    map.assert_valid().unwrap();
}

fn discard_mode_is_unsupported<S: Strategy>() {
    let options = TreeOptions {
        capacity: 8,
        allocation_mode: AllocationMode::DynamicDiscard,
    };
    assert!(matches!(
        OrderedMap::<i32, i32, S>::with_options(options),
        Err(Error::Unsupported(_))
    ));
}

fn dynamic_pool_grows_and_reuses<S: Strategy>() {
    let mut tree = Tree::<i32, (), S, 0>::with_options(TreeOptions::dynamic(4)).unwrap();
    assert_eq!(tree.arena().capacity(), 4);
    for k in 0..5 {
        let inserted = tree
            .insert_with(|new, node, _| new.cmp(node), k, (), [], InsertMode::Add)
            .unwrap();
        assert!(inserted);
    }
    assert_eq!(tree.arena().capacity(), 8);
    assert_eq!(tree.arena().free_count(), 3);

    tree.ensure_free(10).unwrap();
    assert_eq!(tree.arena().free_count(), 10);
    assert_eq!(tree.arena().capacity(), 15);
    tree.ensure_free(4).unwrap();
    assert_eq!(tree.arena().capacity(), 15);

    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.arena().free_count(), 15);
    tree.validate().unwrap();
    for k in 0..15 {
        tree.insert_with(|new, node, _| new.cmp(node), k, (), [], InsertMode::Add)
            .unwrap();
    }
    assert_eq!(tree.arena().capacity(), 15);
    tree.validate_ordered(|a: &i32, b: &i32| a.cmp(b)).unwrap();
}

fn removed_slots_are_recycled<S: Strategy>() {
    let mut map = OrderedMap::<u32, u32, S>::new();
    for k in 0..64 {
        map.add(k, k).unwrap();
    }
    let capacity = map.tree().arena().capacity();
    for round in 0..4 {
        for k in (0..64).filter(|k| k % 4 == round) {
            map.remove(&k).unwrap();
        }
        for k in (0..64).filter(|k| k % 4 == round) {
            map.add(k, k + 100).unwrap();
        }
        map.assert_valid().unwrap();
    }
    assert_eq!(map.tree().arena().capacity(), capacity);
    assert_eq!(map.try_get_value(&5), Some(&105));
}

macro_rules! strategy_matrix {
    ($($case:ident),* $(,)?) => {
        mod avl {
            $(#[test] fn $case() { super::$case::<range_forest::Avl>(); })*
        }
        mod red_black {
            $(#[test] fn $case() { super::$case::<range_forest::RedBlack>(); })*
        }
        mod splay {
            $(#[test] fn $case() { super::$case::<range_forest::Splay>(); })*
        }
    };
}

strategy_matrix!(
    fixed_capacity_exhaustion,
    fixed_range_map_keeps_extent,
    discard_mode_is_unsupported,
    dynamic_pool_grows_and_reuses,
    removed_slots_are_recycled,
);
