use std::ops::Deref;

/// Strictly ascending row indices into one batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectionSet(Vec<u32>);

impl SelectionSet {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Every row of a batch with `rows` rows.
    pub fn all(rows: usize) -> Self {
        Self((0..rows as u32).collect())
    }

    /// Build from arbitrary indices, sorting and dropping duplicates.
    pub fn from_unsorted(mut rows: Vec<u32>) -> Self {
        rows.sort_unstable();
        rows.dedup();
        Self(rows)
    }

    /// Wrap indices a kernel produced in ascending order.
    pub(crate) fn from_ascending(rows: Vec<u32>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0] < w[1]));
        Self(rows)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }

    pub fn intersect(&self, other: &SelectionSet) -> SelectionSet {
        SelectionSet(intersect(&self.0, &other.0))
    }
}

impl Deref for SelectionSet {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        &self.0
    }
}

impl From<SelectionSet> for Vec<u32> {
    fn from(set: SelectionSet) -> Self {
        set.0
    }
}

/// Two-pointer intersection of two ascending slices.
pub fn intersect(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
