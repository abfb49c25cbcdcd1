use range_forest::{
    Avl, Color, HeightBalanced, OrderedMap, RangeMap, RedBlack, Splay, Strategy,
};

fn orders(n: i32) -> Vec<(&'static str, Vec<i32>)> {
    vec![
        ("ascending", (0..n).collect()),
        ("descending", (0..n).rev().collect()),
        ("strided", (0..n).map(|i| (i * 7919) % n).collect()),
        (
            "zigzag",
            (0..n)
                .map(|i| if i % 2 == 0 { i / 2 } else { n - 1 - i / 2 })
                .collect(),
        ),
    ]
}

fn assert_height_bound<S: HeightBalanced>(bound: fn(usize) -> f64) {
    let n = 2000;
    for (name, keys) in orders(n) {
        let mut map = OrderedMap::<i32, (), S>::new();
        for &k in &keys {
            map.add(k, ()).unwrap();
        }
        map.assert_valid().unwrap();
        let height = map.tree().height() as f64;
        assert!(
            height <= bound(map.len()),
            "{} {name}: height {height} over bound for {} nodes",
            S::NAME,
            map.len()
        );

        for &k in keys.iter().filter(|&&k| k % 3 != 0) {
            map.remove(&k).unwrap();
        }
        map.assert_valid().unwrap();
        let height = map.tree().height() as f64;
        assert!(
            height <= bound(map.len()),
            "{} {name}: height {height} over bound after removals",
            S::NAME
        );
    }
}

#[test]
fn avl_height_stays_logarithmic() {
    assert_height_bound::<Avl>(|n| 1.45 * ((n + 2) as f64).log2());
}

#[test]
fn red_black_height_stays_logarithmic() {
    assert_height_bound::<RedBlack>(|n| 2.0 * ((n + 1) as f64).log2());
}

#[test]
fn red_black_root_is_black() {
    let mut map = OrderedMap::<i32, (), RedBlack>::new();
    for k in 0..50 {
        map.add(k, ()).unwrap();
        let root = map.tree().root().unwrap();
        assert_eq!(map.tree().meta(root), Color::Black);
    }
    for k in 0..49 {
        map.remove(&k).unwrap();
        let root = map.tree().root().unwrap();
        assert_eq!(map.tree().meta(root), Color::Black);
    }
}

#[test]
fn avl_balance_factors_stay_in_range() {
    let mut map = RangeMap::<u16, Avl>::new();
    for i in 0..300u16 {
        let start = if i % 2 == 0 { 0 } else { map.extent() };
        map.insert(start, i32::from(i % 5 + 1), i).unwrap();
    }
    let tree = map.tree();
    let mut stack: Vec<_> = tree.root().into_iter().collect();
    while let Some(n) = stack.pop() {
        assert!((-1..=1).contains(&tree.meta(n)));
        stack.extend(tree.left(n));
        stack.extend(tree.right(n));
    }
}

fn lookups_keep_version<S: HeightBalanced>() {
    let mut map = RangeMap::<i32, S>::new();
    for i in 0..40 {
        map.insert(map.extent(), 2, i).unwrap();
    }
    let version = map.tree().version();
    for p in 0..80 {
        map.try_get_containing(p);
        map.try_get_value(p);
        map.nearest_greater(p);
    }
    assert_eq!(map.tree().version(), version);

    map.set_length(10, 3).unwrap();
    assert_ne!(map.tree().version(), version);
}

#[test]
fn avl_lookups_keep_version() {
    lookups_keep_version::<Avl>();
}

#[test]
fn red_black_lookups_keep_version() {
    lookups_keep_version::<RedBlack>();
}

#[test]
fn splay_lookup_brings_key_to_root() {
    let mut map = OrderedMap::<i32, i32, Splay>::new();
    for k in 0..100 {
        map.add(k, -k).unwrap();
    }
    for k in [0, 57, 99, 13, 13, 64] {
        let version = map.tree().version();
        assert_eq!(map.try_get_value(&k), Some(&-k));
        let root = map.tree().root().unwrap();
        assert_eq!(*map.tree().key(root), k);
        assert_ne!(map.tree().version(), version);
        map.assert_valid().unwrap();
    }

    let snapshot: Vec<(i32, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
    for p in [-5, 3, 50, 200] {
        map.nearest_greater_or_equal(&p);
        map.nearest_less(&p);
        map.assert_valid().unwrap();
    }
    let after: Vec<(i32, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(snapshot, after);
}

#[test]
fn splay_range_lookups_keep_positions() {
    let mut map = RangeMap::<u32, Splay>::new();
    for i in 0..60u32 {
        map.insert(map.extent(), (i % 4 + 1) as i32, i).unwrap();
    }
    let layout: Vec<(i32, i32, u32)> = map.iter().map(|e| (e.start, e.length, *e.value)).collect();
    for &(start, length, value) in layout.iter().rev().step_by(3) {
        let found = map.try_get_containing(start + length - 1).unwrap();
        assert_eq!((found.start, found.length, *found.value), (start, length, value));
        map.assert_valid().unwrap();
    }
    let after: Vec<(i32, i32, u32)> = map.iter().map(|e| (e.start, e.length, *e.value)).collect();
    assert_eq!(layout, after);
}

#[test]
fn strategies_agree_on_shape_free_results() {
    fn run<S: Strategy>() -> Vec<(i32, i32, i32)> {
        let mut map = RangeMap::<i32, S>::new();
        for i in 0..80 {
            let extent = map.extent();
            let start = map
                .try_get_containing(i * 13 % (extent + 1))
                .map_or(extent, |e| e.start);
            map.insert(start, i % 6 + 1, i).unwrap();
            if i % 5 == 4 {
                let victim = map.first().map(|e| e.start).unwrap();
                map.delete(victim).unwrap();
            }
        }
        map.iter().map(|e| (e.start, e.length, *e.value)).collect()
    }
    let avl = run::<Avl>();
    assert_eq!(avl, run::<RedBlack>());
    assert_eq!(avl, run::<Splay>());
}
