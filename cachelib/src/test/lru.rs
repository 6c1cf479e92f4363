use crate::error::InvariantViolation;
use crate::lru::{CacheLine, Set};

fn clean(tag: u64) -> CacheLine {
    CacheLine { tag, dirty: false }
}

fn tags(set: &Set) -> Vec<u64> {
    set.iter().map(|line| line.tag).collect()
}

#[test]
fn inserts_at_the_front() {
    let mut set = Set::new(4);
    for tag in 1..=3 {
        set.insert(clean(tag)).unwrap();
    }
    assert_eq!(tags(&set), vec![3, 2, 1]);
    assert_eq!(set.len(), 3);
    assert!(!set.is_full());
}

#[test]
fn move_to_front_promotes_without_copying() {
    let mut set = Set::new(4);
    let slots: Vec<usize> = (1..=4).map(|tag| set.insert(clean(tag)).unwrap()).collect();
    set.move_to_front(slots[1]);
    assert_eq!(tags(&set), vec![2, 4, 3, 1]);
    // The tail can be promoted too
    set.move_to_front(slots[0]);
    assert_eq!(tags(&set), vec![1, 2, 4, 3]);
    // Promoting the head changes nothing
    set.move_to_front(slots[0]);
    assert_eq!(tags(&set), vec![1, 2, 4, 3]);
    assert_eq!(set.find(2), Some(slots[1]));
}

#[test]
fn evicts_the_least_recently_used() {
    let mut set = Set::new(2);
    set.insert(clean(10)).unwrap();
    let slot = set.insert(clean(20)).unwrap();
    set.line_mut(slot).dirty = true;
    assert!(set.is_full());
    assert_eq!(set.evict(), Some(clean(10)));
    assert_eq!(set.evict(), Some(CacheLine { tag: 20, dirty: true }));
    assert_eq!(set.evict(), None);
    assert!(set.is_empty());
}

#[test]
fn reuses_evicted_slots() {
    let mut set = Set::new(2);
    let first = set.insert(clean(1)).unwrap();
    set.insert(clean(2)).unwrap();
    set.evict();
    assert_eq!(set.insert(clean(3)).unwrap(), first);
    assert_eq!(tags(&set), vec![3, 2]);
}

#[test]
fn rejects_overflow() {
    let mut set = Set::new(1);
    set.insert(clean(1)).unwrap();
    assert_eq!(set.insert(clean(2)), Err(InvariantViolation::SetOverflow { capacity: 1, tag: 2 }));
    assert_eq!(tags(&set), vec![1]);
}

#[test]
#[cfg(debug_assertions)]
fn rejects_duplicate_tags() {
    let mut set = Set::new(4);
    set.insert(clean(7)).unwrap();
    assert_eq!(set.insert(clean(7)), Err(InvariantViolation::DuplicateTag { tag: 7 }));
}

#[test]
fn direct_mapped_find() {
    let mut set = Set::new(1);
    assert_eq!(set.find(0), None);
    let slot = set.insert(clean(0)).unwrap();
    assert_eq!(set.find(0), Some(slot));
    assert_eq!(set.find(1), None);
}

#[test]
fn drain_empties_the_set() {
    let mut set = Set::new(4);
    for tag in 1..=4 {
        set.insert(CacheLine { tag, dirty: tag % 2 == 0 }).unwrap();
    }
    let lines = set.drain();
    assert_eq!(lines.iter().map(|line| line.tag).collect::<Vec<_>>(), vec![4, 3, 2, 1]);
    assert_eq!(lines.iter().filter(|line| line.dirty).count(), 2);
    assert!(set.is_empty());
    assert_eq!(set.find(4), None);
    assert_eq!(set.capacity(), 4);
    set.insert(clean(9)).unwrap();
    assert_eq!(tags(&set), vec![9]);
}
