use crate::error::InvariantViolation;

/// A resident cache block
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CacheLine {
    pub tag: u64,
    pub dirty: bool,
}

#[derive(Debug, Clone)]
struct Node {
    line: CacheLine,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A single cache set, holding its lines in most recently used to least recently used order
///
/// Lines live in a slot vector that never grows past the associativity, and the recency order is a
/// doubly linked list threaded through the slots by index. Unlinking a slot, pushing a slot to the
/// front, and popping the tail are all O(1), and a hit only rewires indices, the line itself is
/// never moved or reallocated
///
/// Slots released by an eviction are reused by the next fill, so a set reaches its steady state
/// after `capacity` fills and allocates nothing afterwards
#[derive(Debug, Clone)]
pub struct Set {
    nodes: Vec<Node>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    capacity: usize,
}

impl Set {
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Finds the slot holding `tag`, scanning from the most recently used line
    pub fn find(&self, tag: u64) -> Option<usize> {
        // Direct mapped, there is only ever one candidate
        if self.capacity == 1 {
            return self.head.filter(|&slot| self.nodes[slot].line.tag == tag);
        }
        let mut current = self.head;
        while let Some(slot) = current {
            let node = &self.nodes[slot];
            if node.line.tag == tag {
                return Some(slot);
            }
            current = node.next;
        }
        None
    }

    pub fn line(&self, slot: usize) -> &CacheLine {
        &self.nodes[slot].line
    }

    pub fn line_mut(&mut self, slot: usize) -> &mut CacheLine {
        &mut self.nodes[slot].line
    }

    /// Promotes a resident line to the most recently used position
    pub fn move_to_front(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.push_front(slot);
    }

    /// Inserts a new line as the most recently used. The set must have room for it, and must not
    /// already hold its tag
    pub fn insert(&mut self, line: CacheLine) -> Result<usize, InvariantViolation> {
        if self.is_full() {
            return Err(InvariantViolation::SetOverflow { capacity: self.capacity, tag: line.tag });
        }
        // A full scan on every fill is too slow for release builds
        if cfg!(debug_assertions) && self.find(line.tag).is_some() {
            return Err(InvariantViolation::DuplicateTag { tag: line.tag });
        }
        let node = Node { line, prev: None, next: None };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.push_front(slot);
        self.len += 1;
        Ok(slot)
    }

    /// Removes and returns the least recently used line
    pub fn evict(&mut self) -> Option<CacheLine> {
        let slot = self.tail?;
        self.unlink(slot);
        self.free.push(slot);
        self.len -= 1;
        Some(self.nodes[slot].line)
    }

    /// Empties the set, returning every line that was resident, most recently used first
    pub fn drain(&mut self) -> Vec<CacheLine> {
        let lines = self.iter().copied().collect();
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        lines
    }

    /// Iterates the resident lines from most to least recently used
    pub fn iter(&self) -> Iter<'_> {
        Iter { set: self, current: self.head }
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = &self.nodes[slot];
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
        let node = &mut self.nodes[slot];
        node.prev = None;
        node.next = None;
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = &mut self.nodes[slot];
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(old_head) => self.nodes[old_head].prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }
}

pub struct Iter<'a> {
    set: &'a Set,
    current: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a CacheLine;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.set.nodes[self.current?];
        self.current = node.next;
        Some(&node.line)
    }
}
