/// Disjoint-set forest over pixel indices.
///
/// Index-based arena (parent and size arrays) with path compression and
/// union by size. Shared by the graph-merging engine, the Quick shift forest
/// flattening and the connected-component relabeling pass.
pub struct DisjointSet {
    parent: Vec<u32>,
    size: Vec<u32>,
    num_sets: u32,
}

impl DisjointSet {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "Size must be larger than zero.");
        assert!(
            size < u32::MAX as usize,
            "Size must be smaller than {}",
            u32::MAX
        );
        DisjointSet {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
            num_sets: size as u32,
        }
    }

    /// Representative of the set containing `node`, compressing the path on
    /// the way up.
    #[inline]
    pub fn find(&mut self, node: u32) -> u32 {
        let mut root = node;
        while self.parent[root as usize] != root {
            // path halving
            let grandparent = self.parent[self.parent[root as usize] as usize];
            self.parent[root as usize] = grandparent;
            root = grandparent;
        }
        root
    }

    /// Unions the sets containing `a` and `b` and returns the surviving root.
    /// Larger set wins; equal sizes keep the root of `a`.
    #[inline]
    pub fn union(&mut self, a: u32, b: u32) -> u32 {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return root_a;
        }
        let (winner, loser) = if self.size[root_a as usize] >= self.size[root_b as usize] {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[loser as usize] = winner;
        self.size[winner as usize] += self.size[loser as usize];
        self.num_sets -= 1;
        winner
    }

    /// Number of elements in the set whose root is `root`. Only meaningful
    /// for roots returned by [`DisjointSet::find`].
    #[inline]
    pub fn size_of(&self, root: u32) -> u32 {
        self.size[root as usize]
    }

    #[inline]
    pub fn num_sets(&self) -> u32 {
        self.num_sets
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}
