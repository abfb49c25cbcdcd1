use range_forest::{Error, MultiRankMap, RankMap, RobustCursor, Strategy, TreeOptions};

fn ranks_follow_key_order<S: Strategy>() {
    let mut map = RankMap::<i32, &str, S>::new();
    for (k, v) in [(10, "ten"), (5, "five"), (20, "twenty"), (3, "three"), (7, "seven")] {
        map.add(k, v).unwrap();
        map.assert_valid().unwrap();
    }

    assert_eq!(map.get_key_by_rank(0), Ok(&3));
    assert_eq!(map.get_key_by_rank(4), Ok(&20));
    assert_eq!(map.try_get(&10), Some((&"ten", 3)));

    map.remove(&5).unwrap();
    map.assert_valid().unwrap();
    assert_eq!(map.try_get(&3), Some((&"three", 0)));
    assert_eq!(map.try_get(&7), Some((&"seven", 1)));
    assert_eq!(map.try_get(&10), Some((&"ten", 2)));
    assert_eq!(map.try_get(&20), Some((&"twenty", 3)));
    assert_eq!(map.try_get_key_by_rank(4), None);
    assert_eq!(
        map.get_key_by_rank(-1),
        Err(Error::OutOfRange("rank is outside the map"))
    );
}

fn rank_map_basic_api<S: Strategy>() {
    let mut map = RankMap::<u32, u32, S>::new();
    assert!(map.is_empty());
    assert!(map.try_add(1, 10).unwrap());
    assert!(!map.try_add(1, 11).unwrap());
    assert_eq!(map.add(1, 12), Err(Error::AlreadyExists));
    assert!(map.try_add(2, 20).unwrap());

    assert_eq!(map.try_get_value(&1), Some(&10));
    assert!(map.try_set_value(&1, 15));
    assert!(!map.try_set_value(&9, 90));
    assert_eq!(map.try_get_value(&1), Some(&15));
    assert!(map.contains_key(&2));

    let least = map.least().unwrap();
    assert_eq!((*least.key, least.rank, least.count), (1, 0, 1));
    let greatest = map.greatest().unwrap();
    assert_eq!((*greatest.key, greatest.rank), (2, 1));
    assert_eq!(map.nearest_greater(&1).map(|e| *e.key), Some(2));
    assert_eq!(map.nearest_less(&1).map(|e| *e.key), None);
    assert_eq!(map.nearest_less_or_equal(&5).map(|e| e.rank), Some(1));
    assert_eq!(map.nearest_greater_or_equal(&0).map(|e| e.rank), Some(0));

    assert_eq!(map.try_remove(&1), Some(15));
    assert_eq!(map.remove(&1), Err(Error::NotFound));
    assert_eq!(map.try_get(&2), Some((&20, 0)));
    assert_eq!(map.len(), 1);
    map.clear();
    assert!(map.is_empty());
    map.assert_valid().unwrap();
}

fn multi_rank_blocks<S: Strategy>() {
    let mut map = MultiRankMap::<char, (), S>::new();
    map.add('c', (), 3).unwrap();
    map.add('a', (), 2).unwrap();
    map.add('b', (), 1).unwrap();
    map.assert_valid().unwrap();

    assert_eq!(map.rank_count(), 6);
    assert_eq!(map.try_get(&'a'), Some((&(), 0, 2)));
    assert_eq!(map.try_get(&'b'), Some((&(), 2, 1)));
    assert_eq!(map.try_get(&'c'), Some((&(), 3, 3)));

    let by_rank: Vec<char> = (0..6).map(|r| *map.get_key_by_rank(r).unwrap()).collect();
    assert_eq!(by_rank, vec!['a', 'a', 'b', 'c', 'c', 'c']);

    assert_eq!(map.try_add('d', (), 0), Err(Error::OutOfRange("count must be positive")));
    assert_eq!(map.try_add('d', (), -2), Err(Error::OutOfRange("count must be positive")));

    assert_eq!(map.adjust_count(&'a', 3), Ok(5));
    map.assert_valid().unwrap();
    assert_eq!(map.try_get(&'c'), Some((&(), 6, 3)));
    assert_eq!(map.rank_count(), 9);

    assert_eq!(map.adjust_count(&'b', -1), Ok(0));
    map.assert_valid().unwrap();
    assert!(!map.contains_key(&'b'));
    assert_eq!(map.try_get(&'c'), Some((&(), 5, 3)));

    assert_eq!(
        map.adjust_count(&'c', -4),
        Err(Error::OutOfRange("count would become negative"))
    );
    assert_eq!(map.adjust_count(&'z', 1), Err(Error::NotFound));
    assert_eq!(map.adjust_count(&'c', i32::MAX), Err(Error::Overflow));

    assert!(map.try_set_count(&'a', 1).unwrap());
    assert!(!map.try_set_count(&'q', 1).unwrap());
    assert_eq!(map.try_get(&'c'), Some((&(), 1, 3)));
    assert_eq!(map.rank_count(), 4);

    let blocks: Vec<(char, i32, i32)> = map.iter().map(|e| (*e.key, e.rank, e.count)).collect();
    assert_eq!(blocks, vec![('a', 0, 1), ('c', 1, 3)]);
    map.assert_valid().unwrap();
}

fn rank_ladder<S: Strategy>() {
    let mut map = RankMap::<i32, (), S>::new();
    for i in (0..200).map(|i| (i * 37) % 200) {
        map.add(i, ()).unwrap();
        map.assert_valid().unwrap();
    }
    for r in 0..200 {
        assert_eq!(map.get_key_by_rank(r), Ok(&r));
    }
    for i in (0..200).filter(|i| i % 2 == 1) {
        map.remove(&i).unwrap();
        map.assert_valid().unwrap();
    }
    for r in 0..100 {
        assert_eq!(map.get_key_by_rank(r), Ok(&(r * 2)));
        assert_eq!(map.try_get(&(r * 2)).map(|(_, rank)| rank), Some(r));
    }
}

fn robust_rank_cursor<S: Strategy>() {
    let mut map = RankMap::<i32, i32, S>::new();
    for k in [4, 1, 3, 2] {
        map.add(k, k * 100).unwrap();
    }
    let mut cursor = RobustCursor::new();
    let mut seen = Vec::new();
    while let Some(entry) = map.robust_next(&mut cursor) {
        seen.push((*entry.key, entry.rank));
        if seen.len() == 1 {
            map.add(0, 0).unwrap();
        }
    }
    assert_eq!(seen, vec![(1, 0), (2, 2), (3, 3), (4, 4)]);
}

fn fixed_rank_map_with_comparator<S: Strategy>() {
    let mut map = RankMap::<i32, &str, S, _>::with_comparator_and_options(
        |a: &i32, b: &i32| b.cmp(a),
        TreeOptions::fixed(3),
    )
    .unwrap();
    for (k, v) in [(1, "one"), (3, "three"), (2, "two")] {
        map.add(k, v).unwrap();
    }
    assert_eq!(map.add(4, "four"), Err(Error::OutOfMemory));
    map.assert_valid().unwrap();

    let ranked: Vec<(i32, i32)> = map.iter().map(|e| (*e.key, e.rank)).collect();
    assert_eq!(ranked, vec![(3, 0), (2, 1), (1, 2)]);
    assert_eq!(map.get_key_by_rank(0), Ok(&3));

    map.remove(&3).unwrap();
    map.add(4, "four").unwrap();
    assert_eq!(map.try_get(&4), Some((&"four", 0)));
    assert_eq!(map.try_get(&1), Some((&"one", 2)));
    map.assert_valid().unwrap();
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
    ranks_follow_key_order,
    rank_map_basic_api,
    multi_rank_blocks,
    rank_ladder,
    robust_rank_cursor,
    fixed_rank_map_with_comparator,
);
