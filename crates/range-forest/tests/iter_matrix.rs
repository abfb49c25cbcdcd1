use range_forest::{
    Error, FastCursor, HeightBalanced, OrderedMap, RangeMap, RobustCursor, Splay, Strategy,
};

fn tree_iter_reports_lengths<S: Strategy>() {
    let mut map = RangeMap::<char, S>::new();
    for (len, v) in [(3, 'a'), (1, 'b'), (6, 'c')] {
        map.insert(map.extent(), len, v).unwrap();
    }
    let iter = map.tree().iter();
    assert_eq!(iter.len(), 3);
    let entries: Vec<([i32; 1], [i32; 1], char)> =
        iter.map(|e| (e.start, e.length, *e.value)).collect();
    assert_eq!(
        entries,
        vec![([0], [3], 'a'), ([3], [1], 'b'), ([4], [6], 'c')]
    );

    let mut n = 0;
    for entry in map.tree() {
        assert!(entry.length[0] > 0);
        n += 1;
    }
    assert_eq!(n, 3);
}

fn fast_cursor_walks_in_order<S: HeightBalanced>() {
    let mut map = OrderedMap::<i32, i32, S>::new();
    for k in [5, 3, 8, 1, 4, 9, 7] {
        map.add(k, k * k).unwrap();
    }
    let mut cursor = map.fast_cursor();
    let mut keys = Vec::new();
    while let Some((k, v)) = map.fast_next(&mut cursor).unwrap() {
        assert_eq!(*v, k * k);
        keys.push(*k);
    }
    assert_eq!(keys, vec![1, 3, 4, 5, 7, 8, 9]);
    assert_eq!(map.fast_next(&mut cursor), Ok(None));
    assert_eq!(cursor.current(map.tree()), Ok(None));
}

fn fast_cursor_rejects_mutation<S: HeightBalanced>() {
    let mut map = RangeMap::<u8, S>::new();
    for i in 0..5u8 {
        map.insert(map.extent(), 2, i).unwrap();
    }
    let mut cursor = map.fast_cursor();
    assert_eq!(map.fast_next(&mut cursor).unwrap().map(|e| e.start), Some(0));

    // Lookups leave height-balanced trees alone.
    assert_eq!(map.try_get_value(4), Some(&2));
    assert_eq!(map.fast_next(&mut cursor).unwrap().map(|e| e.start), Some(2));

    map.set_value(4, 20).unwrap();
    assert_eq!(map.fast_next(&mut cursor).unwrap().map(|e| *e.value), Some(20));

    map.set_length(0, 3).unwrap();
    assert_eq!(map.fast_next(&mut cursor), Err(Error::InvalidState));
    assert_eq!(cursor.current(map.tree()), Err(Error::InvalidState));

    cursor.reset(map.tree());
    let starts: Vec<i32> = std::iter::from_fn(|| map.fast_next(&mut cursor).unwrap())
        .map(|e| e.start)
        .collect();
    assert_eq!(starts, vec![0, 3, 5, 7, 9]);
}

fn robust_cursor_on_empty_and_reset<S: Strategy>() {
    let mut map = OrderedMap::<u8, (), S>::new();
    let mut cursor = RobustCursor::new();
    assert_eq!(map.robust_next(&mut cursor), None);
    assert!(cursor.is_finished());
    assert_eq!(cursor.last(), None);

    map.add(1, ()).unwrap();
    assert_eq!(map.robust_next(&mut cursor), None);
    cursor.reset();
    assert_eq!(map.robust_next(&mut cursor), Some((&1, &())));
    assert_eq!(cursor.last(), Some(&1));
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

macro_rules! balanced_matrix {
    ($($case:ident),* $(,)?) => {
        mod balanced_avl {
            $(#[test] fn $case() { super::$case::<range_forest::Avl>(); })*
        }
        mod balanced_red_black {
            $(#[test] fn $case() { super::$case::<range_forest::RedBlack>(); })*
        }
    };
}

strategy_matrix!(tree_iter_reports_lengths, robust_cursor_on_empty_and_reset);
balanced_matrix!(fast_cursor_walks_in_order, fast_cursor_rejects_mutation);

#[test]
fn splay_lookup_invalidates_engine_cursor() {
    let mut map = OrderedMap::<i32, (), Splay>::new();
    for k in 0..8 {
        map.add(k, ()).unwrap();
    }
    let mut cursor = FastCursor::new(map.tree());
    assert_eq!(cursor.move_next(map.tree()), Ok(true));

    let version = map.tree().version();
    assert!(map.contains_key(&0));
    assert_ne!(map.tree().version(), version);
    assert_eq!(cursor.move_next(map.tree()), Err(Error::InvalidState));

    cursor.reset(map.tree());
    let mut keys = Vec::new();
    while cursor.move_next(map.tree()).unwrap() {
        let found = cursor.current(map.tree()).unwrap().unwrap();
        keys.push(*map.tree().key(found.index));
    }
    assert_eq!(keys, (0..8).collect::<Vec<_>>());
}
